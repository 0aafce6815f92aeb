//! Registrable-domain rule backed by the public suffix list.

use ahash::AHashSet;
use std::sync::Arc;

use super::Rule;
use crate::entry::host_of;
use crate::error::ClassifyError;
use crate::RuleType;

/// Get the registrable domain (eTLD+1) of a host.
///
/// For `sub.example.co.uk` this is `example.co.uk`. Returns `None` when the
/// host is itself a public suffix, is empty, or has a single label.
pub fn registrable_domain(host: &str) -> Option<String> {
    let host = host.trim_end_matches('.').to_lowercase();
    psl::domain(host.as_bytes())
        .and_then(|d| std::str::from_utf8(d.as_bytes()).ok())
        .map(|s| s.to_string())
}

/// SuffixSet is the set of domestic registrable domains.
///
/// Entries are stored lower-case.
#[derive(Debug, Clone, Default)]
pub struct SuffixSet {
    domains: AHashSet<String>,
}

impl SuffixSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of domains in the set.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Add a domain. Returns `false` if it was already present or empty.
    pub fn insert(&mut self, domain: &str) -> bool {
        let domain = domain.trim().to_lowercase();
        if domain.is_empty() {
            return false;
        }
        self.domains.insert(domain)
    }

    /// Exact membership test (case-insensitive).
    pub fn contains(&self, domain: &str) -> bool {
        if self.domains.contains(domain) {
            return true;
        }
        self.domains.contains(&domain.to_lowercase())
    }
}

impl<S: AsRef<str>> FromIterator<S> for SuffixSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SuffixSet::new();
        for domain in iter {
            set.insert(domain.as_ref());
        }
        set
    }
}

/// RegistrableDomainRule marks a domain domestic when its eTLD+1 is in the set.
pub struct RegistrableDomainRule {
    set: Arc<SuffixSet>,
}

impl RegistrableDomainRule {
    /// Create a rule over a shared set.
    pub fn new(set: Arc<SuffixSet>) -> Self {
        Self { set }
    }
}

impl Rule for RegistrableDomainRule {
    fn matches(&self, domain: &str, _ips: &[String]) -> Result<bool, ClassifyError> {
        let host = host_of(domain);
        let domain = registrable_domain(host)
            .ok_or_else(|| ClassifyError::NoRegistrableDomain(host.to_string()))?;
        Ok(self.set.contains(&domain))
    }

    fn rule_type(&self) -> RuleType {
        RuleType::RegistrableDomain
    }
}
