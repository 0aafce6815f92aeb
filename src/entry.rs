//! Domain list entries.

use std::fmt;

use crate::error::ProbeError;

/// One line of the domain list: either `name` or `name:port`.
///
/// An entry with a port is probed with a TCP connect instead of a DNS query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainEntry {
    raw: String,
    host: String,
    port: Option<u16>,
}

impl DomainEntry {
    /// Parse an entry.
    ///
    /// The port is whatever follows the last `:`, as long as that colon is not
    /// the first character. A port that is not in `1..=65535` is rejected.
    ///
    /// # Examples
    /// ```
    /// use domsieve::DomainEntry;
    ///
    /// let entry = DomainEntry::parse("example.com:443").unwrap();
    /// assert_eq!(entry.host(), "example.com");
    /// assert_eq!(entry.port(), Some(443));
    ///
    /// let entry = DomainEntry::parse("example.com").unwrap();
    /// assert_eq!(entry.port(), None);
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ProbeError> {
        match raw.rfind(':') {
            Some(pos) if pos > 0 => {
                let port = raw[pos + 1..]
                    .parse::<u16>()
                    .ok()
                    .filter(|p| *p != 0)
                    .ok_or_else(|| ProbeError::InvalidEntry(raw.to_string()))?;
                Ok(Self {
                    raw: raw.to_string(),
                    host: raw[..pos].to_string(),
                    port: Some(port),
                })
            }
            _ => Ok(Self {
                raw: raw.to_string(),
                host: raw.to_string(),
                port: None,
            }),
        }
    }

    /// The entry exactly as it appeared in the list.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Host part, without the port.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port, when the entry selects TCP-probe mode.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Whether this entry is probed with a TCP connect.
    pub fn is_port_probe(&self) -> bool {
        self.port.is_some()
    }
}

impl fmt::Display for DomainEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Strip a trailing `:port` from an entry, leaving the host.
///
/// Unlike [`DomainEntry::parse`] this never fails; an unparsable port is left
/// in place.
pub fn host_of(raw: &str) -> &str {
    match raw.rfind(':') {
        Some(pos) if pos > 0 && raw[pos + 1..].parse::<u16>().is_ok() => &raw[..pos],
        _ => raw,
    }
}
