//! Literal country-code suffix rule.

use super::Rule;
use crate::error::ClassifyError;
use crate::RuleType;

/// Country-code suffix checked by the default chain.
pub const DOMESTIC_SUFFIX: &str = ".cn";

/// CountrySuffixRule marks a domain domestic when the entry ends with a
/// fixed suffix such as `.cn`.
///
/// The entry is checked as written, so `example.cn:443` does not match.
pub struct CountrySuffixRule {
    suffix: String,
}

impl CountrySuffixRule {
    /// Create a rule for the given suffix (leading dot included).
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl Default for CountrySuffixRule {
    fn default() -> Self {
        Self::new(DOMESTIC_SUFFIX)
    }
}

impl Rule for CountrySuffixRule {
    fn matches(&self, domain: &str, _ips: &[String]) -> Result<bool, ClassifyError> {
        Ok(domain.ends_with(&self.suffix))
    }

    fn rule_type(&self) -> RuleType {
        RuleType::CountrySuffix
    }
}
