//! IPv4 CIDR table and prefix arithmetic.

use ahash::AHashMap;
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;
use std::sync::Arc;

use super::Rule;
use crate::error::{ClassifyError, Error};
use crate::RuleType;

/// Longest valid IPv4 prefix length.
pub const MAX_PREFIX_LEN: u8 = 32;

/// Mask an address down to its network under `prefix_len`.
///
/// `prefix_len` must be at most 32.
#[inline]
pub fn mask(ip: u32, prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        len => ip & (u32::MAX << (32 - u32::from(len))),
    }
}

/// Test whether `ip` lies in `network/prefix_len`.
///
/// Equivalent to `(ip ^ network) >> (32 - prefix_len) == 0`, with a zero
/// prefix matching every address.
#[inline]
pub fn prefix_match(ip: u32, network: u32, prefix_len: u8) -> bool {
    match prefix_len {
        0 => true,
        len => (ip ^ network) >> (32 - u32::from(len)) == 0,
    }
}

/// CidrTable maps a masked network address to its prefix length.
///
/// A network appears at most once; inserting it again replaces its prefix
/// length.
///
/// # Examples
/// ```
/// use domsieve::rule::CidrTable;
///
/// let mut table = CidrTable::new();
/// table.add_pattern("1.2.3.0/24").unwrap();
/// assert!(table.contains("1.2.3.77".parse().unwrap()));
/// assert!(!table.contains("1.2.4.1".parse().unwrap()));
/// ```
#[derive(Debug, Clone)]
pub struct CidrTable {
    networks: AHashMap<u32, u8>,
    /// Number of entries per prefix length
    prefix_counts: [u32; MAX_PREFIX_LEN as usize + 1],
}

impl Default for CidrTable {
    fn default() -> Self {
        Self {
            networks: AHashMap::new(),
            prefix_counts: [0; MAX_PREFIX_LEN as usize + 1],
        }
    }
}

impl CidrTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of networks in the table.
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    /// Whether the table has no networks.
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Insert a network. The address is masked to `prefix_len` first.
    pub fn insert(&mut self, network: u32, prefix_len: u8) -> Result<(), Error> {
        if prefix_len > MAX_PREFIX_LEN {
            return Err(Error::InvalidCidr(format!(
                "{}/{}",
                Ipv4Addr::from(network),
                prefix_len
            )));
        }

        let network = mask(network, prefix_len);
        if let Some(old) = self.networks.insert(network, prefix_len) {
            self.prefix_counts[usize::from(old)] -= 1;
        }
        self.prefix_counts[usize::from(prefix_len)] += 1;
        Ok(())
    }

    /// Parse and insert an IPv4 CIDR pattern such as `10.0.0.0/8`.
    pub fn add_pattern(&mut self, pattern: &str) -> Result<(), Error> {
        let pattern = pattern.trim();
        let net = pattern
            .parse::<Ipv4Net>()
            .map_err(|_| Error::InvalidCidr(pattern.to_string()))?;
        self.insert(u32::from(net.network()), net.prefix_len())
    }

    /// Iterate over `(network, prefix_len)` entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        self.networks.iter().map(|(n, p)| (*n, *p))
    }

    /// Check whether an address lies in any network.
    ///
    /// Costs one hash lookup per distinct prefix length in the table.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        let ip = u32::from(ip);
        (0..=MAX_PREFIX_LEN)
            .filter(|len| self.prefix_counts[usize::from(*len)] > 0)
            .any(|len| self.networks.get(&mask(ip, len)) == Some(&len))
    }

    /// Check whether an address lies in any network by scanning every entry.
    pub fn contains_linear(&self, ip: Ipv4Addr) -> bool {
        let ip = u32::from(ip);
        self.iter()
            .any(|(network, prefix_len)| prefix_match(ip, network, prefix_len))
    }
}

impl FromIterator<(u32, u8)> for CidrTable {
    /// Entries with a prefix longer than 32 are dropped.
    fn from_iter<I: IntoIterator<Item = (u32, u8)>>(iter: I) -> Self {
        let mut table = CidrTable::new();
        for (network, prefix_len) in iter {
            let _ = table.insert(network, prefix_len);
        }
        table
    }
}

/// CidrRule marks a domain domestic when any resolved address lies in the table.
pub struct CidrRule {
    table: Arc<CidrTable>,
}

impl CidrRule {
    /// Create a rule over a shared table.
    pub fn new(table: Arc<CidrTable>) -> Self {
        Self { table }
    }
}

impl Rule for CidrRule {
    fn matches(&self, _domain: &str, ips: &[String]) -> Result<bool, ClassifyError> {
        for ip in ips {
            let addr: Ipv4Addr = ip
                .parse()
                .map_err(|_| ClassifyError::InvalidAddress(ip.clone()))?;
            if self.table.contains(addr) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn rule_type(&self) -> RuleType {
        RuleType::IpCidr
    }
}
