//! Domestic classification of resolved domains.
//!
//! A [`Classifier`] evaluates an ordered chain of rules; the first rule that
//! matches decides. The default chain is:
//!
//! 1. the entry ends with `.cn` (a `name:port` entry never does)
//! 2. registrable domain is in the domestic domain set
//! 3. any resolved address lies in the domestic CIDR table
//!
//! If none matches the domain is not domestic. A rule error (a host with no
//! registrable domain, an address that is not IPv4) stops the chain and the
//! domain is not domestic either.

use rayon::prelude::*;
use std::sync::Arc;

use crate::error::Result;
use crate::rule::{CidrRule, CidrTable, CountrySuffixRule, RegistrableDomainRule, Rule, SuffixSet};
use crate::Verdict;

/// Minimum number of classification workers.
pub const MIN_WORKERS: usize = 4;

/// Number of workers used when none is configured: available CPU
/// parallelism, but never fewer than [`MIN_WORKERS`].
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .max(MIN_WORKERS)
}

/// Classifier decides whether domains are domestic.
///
/// All rules are read-only, so one classifier can be shared across threads.
pub struct Classifier {
    rules: Vec<Box<dyn Rule>>,
}

impl Classifier {
    /// Build the default chain over shared reference snapshots.
    pub fn new(suffixes: Arc<SuffixSet>, cidrs: Arc<CidrTable>) -> Self {
        Self::with_rules(vec![
            Box::new(CountrySuffixRule::default()),
            Box::new(RegistrableDomainRule::new(suffixes)),
            Box::new(CidrRule::new(cidrs)),
        ])
    }

    /// Build a classifier from an explicit chain, evaluated in order.
    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Number of rules in the chain.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Classify one domain.
    ///
    /// `domain` is the list entry and may carry a `:port` suffix. Each rule
    /// decides what part of it to look at.
    pub fn verdict(&self, domain: &str, ips: &[String]) -> Verdict {
        Verdict::from_bool(self.first_match(domain, ips))
    }

    fn first_match(&self, domain: &str, ips: &[String]) -> bool {
        for rule in &self.rules {
            match rule.matches(domain, ips) {
                Ok(true) => {
                    log::debug!("{}: domestic by {}", domain, rule.rule_type());
                    return true;
                }
                Ok(false) => {}
                Err(e) => {
                    log::error!("\"{}\": {}", domain, e);
                    return false;
                }
            }
        }
        false
    }

    /// Classify one domain, returning it alongside the decision.
    pub fn classify<'a>(&self, domain: &'a str, ips: &[String]) -> (&'a str, bool) {
        (domain, self.verdict(domain, ips).is_domestic())
    }

    /// Classify many domains on a dedicated pool of `workers` threads.
    ///
    /// Returns one verdict per input, in input order, after every task has
    /// finished.
    pub fn classify_all<S>(&self, items: &[(S, &[String])], workers: usize) -> Result<Vec<Verdict>>
    where
        S: AsRef<str> + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("classify-{i}"))
            .build()?;

        Ok(pool.install(|| {
            items
                .par_iter()
                .map(|(domain, ips)| self.verdict(domain.as_ref(), ips))
                .collect()
        }))
    }
}
