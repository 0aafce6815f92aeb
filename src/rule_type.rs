//! Rule type definitions.

use std::fmt;

/// RuleType names a step of the classification chain.
///
/// The declaration order is the evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleType {
    /// Literal country-code suffix on the host (`.cn`)
    CountrySuffix,
    /// Registrable domain (eTLD+1) membership in the domestic domain set
    RegistrableDomain,
    /// Resolved address containment in the domestic CIDR table
    IpCidr,
}

impl RuleType {
    /// Get the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::CountrySuffix => "COUNTRY-SUFFIX",
            RuleType::RegistrableDomain => "REGISTRABLE-DOMAIN",
            RuleType::IpCidr => "IP-CIDR",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
