//! Classification rules and the reference tables they read.

mod cidr;
mod domain;
mod suffix;

pub use cidr::{mask, prefix_match, CidrRule, CidrTable, MAX_PREFIX_LEN};
pub use domain::{registrable_domain, RegistrableDomainRule, SuffixSet};
pub use suffix::{CountrySuffixRule, DOMESTIC_SUFFIX};

use crate::error::ClassifyError;
use crate::RuleType;

/// Rule trait defines one step of the classification chain.
///
/// Rules only read shared reference data, so a chain can be evaluated from
/// many threads at once.
pub trait Rule: Send + Sync {
    /// Decide whether a domain is domestic.
    ///
    /// # Arguments
    /// * `domain` - Entry as it appears in the list, `:port` suffix included
    /// * `ips` - Addresses the domain resolved to
    ///
    /// # Returns
    /// `Ok(true)` if the rule matches. An error stops the whole chain.
    fn matches(&self, domain: &str, ips: &[String]) -> Result<bool, ClassifyError>;

    /// Get the type of this rule.
    fn rule_type(&self) -> RuleType;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_trait_object() {
        let suffix_rule = CountrySuffixRule::default();
        let rule: &dyn Rule = &suffix_rule;
        assert_eq!(rule.rule_type(), RuleType::CountrySuffix);
        assert!(rule.matches("example.cn", &[]).unwrap());
    }
}
