//! Batch orchestration: resolve, check trust, partition, emit.

use ahash::AHashMap;
use std::path::Path;
use std::sync::Arc;

use crate::classifier::{default_workers, Classifier};
use crate::config::DEFAULT_TRUST_THRESHOLD;
use crate::listfile::stage_list;
use crate::resolver::{probe_all, Connect, Lookup, Prober};
use crate::rule::{CidrTable, SuffixSet};
use crate::Result;

/// Outcome of one run. Every input entry lands in exactly one list, and
/// each list keeps input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Entries that resolved to nothing
    pub blocked: Vec<String>,
    /// Entries classified as domestic
    pub domestic: Vec<String>,
    /// Everything else
    pub unclassified: Vec<String>,
}

impl Partition {
    /// Total number of entries across all lists.
    pub fn len(&self) -> usize {
        self.blocked.len() + self.domestic.len() + self.unclassified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the blocked and domestic lists. Empty lists are not written.
    ///
    /// Both lists are staged before either replaces its file, so a failure
    /// while writing leaves both outputs as they were.
    pub fn write(&self, blocked_path: &Path, domestic_path: &Path) -> Result<()> {
        log::info!("generate domestic list...");
        let domestic = stage_list(domestic_path, &self.domestic)?;
        log::info!("generate blocked list...");
        let blocked = stage_list(blocked_path, &self.blocked)?;

        if let Some(staged) = domestic {
            staged.commit()?;
            log::info!("domestic domain: {}", self.domestic.len());
        }
        if let Some(staged) = blocked {
            staged.commit()?;
            log::info!("blocked domain: {}", self.blocked.len());
        }
        Ok(())
    }
}

/// Pipeline runs one classification pass over a domain list.
pub struct Pipeline<L, C> {
    prober: Arc<Prober<L, C>>,
    suffixes: Arc<SuffixSet>,
    cidrs: Arc<CidrTable>,
    trust_threshold: usize,
    workers: usize,
}

impl<L, C> Pipeline<L, C>
where
    L: Lookup + 'static,
    C: Connect + 'static,
{
    /// Create a pipeline over a prober and reference snapshots.
    pub fn new(prober: Prober<L, C>, suffixes: SuffixSet, cidrs: CidrTable) -> Self {
        Self {
            prober: Arc::new(prober),
            suffixes: Arc::new(suffixes),
            cidrs: Arc::new(cidrs),
            trust_threshold: DEFAULT_TRUST_THRESHOLD,
            workers: default_workers(),
        }
    }

    /// Set the size each reference table must exceed to be trusted.
    pub fn with_trust_threshold(mut self, threshold: usize) -> Self {
        self.trust_threshold = threshold;
        self
    }

    /// Set the number of classification workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Whether both reference tables are large enough to classify with.
    pub fn is_trusted(&self) -> bool {
        self.suffixes.len() > self.trust_threshold && self.cidrs.len() > self.trust_threshold
    }

    /// Probe every entry, waiting for all of them.
    pub async fn resolve(&self, entries: &[String]) -> Result<AHashMap<String, Vec<String>>> {
        log::info!("resolve domain...");
        probe_all(&self.prober, entries).await
    }

    /// Split entries using their resolution results.
    ///
    /// Entries missing from `resolved` count as unreachable.
    pub fn partition(
        &self,
        entries: &[String],
        resolved: &AHashMap<String, Vec<String>>,
    ) -> Result<Partition> {
        let mut partition = Partition::default();
        let mut reachable: Vec<(&str, &[String])> = Vec::new();

        for entry in entries {
            match resolved.get(entry).filter(|ips| !ips.is_empty()) {
                Some(ips) => reachable.push((entry.as_str(), ips.as_slice())),
                None => partition.blocked.push(entry.clone()),
            }
        }

        if !self.is_trusted() {
            log::warn!(
                "reference data untrusted (domains: {}, networks: {}), skipping classification",
                self.suffixes.len(),
                self.cidrs.len()
            );
            partition.unclassified = reachable.iter().map(|(d, _)| d.to_string()).collect();
            return Ok(partition);
        }

        let classifier = Classifier::new(Arc::clone(&self.suffixes), Arc::clone(&self.cidrs));
        let verdicts = classifier.classify_all(&reachable, self.workers)?;

        for ((entry, _), verdict) in reachable.iter().zip(verdicts) {
            if verdict.is_domestic() {
                partition.domestic.push(entry.to_string());
            } else {
                partition.unclassified.push(entry.to_string());
            }
        }

        Ok(partition)
    }

    /// Resolve and partition on an async runtime already in use.
    pub async fn run_async(&self, entries: &[String]) -> Result<Partition> {
        if entries.is_empty() {
            return Ok(Partition::default());
        }
        let resolved = self.resolve(entries).await?;
        self.partition(entries, &resolved)
    }

    /// Run the whole pass.
    ///
    /// Resolution runs on a single-threaded runtime created for the call;
    /// classification then runs on its own worker pool. An empty list
    /// returns at once without probing.
    pub fn run(&self, entries: &[String]) -> Result<Partition> {
        if entries.is_empty() {
            return Ok(Partition::default());
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let resolved = runtime.block_on(self.resolve(entries))?;
        drop(runtime);

        self.partition(entries, &resolved)
    }
}
