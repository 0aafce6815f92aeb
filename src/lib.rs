//! domsieve - Split a domain list into blocked, domestic and unclassified sets.
//!
//! This crate probes every entry of a domain list and classifies the
//! reachable ones against domestic reference data.
//!
//! # Features
//!
//! - **Concurrent probing**: DNS A queries or TCP connects, bounded by a limiter
//! - **Retries**: up to three DNS attempts per entry, stopping on first success
//! - **Classification chain**: `.cn` suffix, registrable domain, IPv4 CIDR
//! - **Parallel classification**: worker pool sized to the available CPUs
//! - **Reference lists**: download, gzip decompression, and local caching
//!
//! # Quick Start
//!
//! ```ignore
//! use domsieve::{Config, NetworkProber, Pipeline};
//! use domsieve::source::{load_cidr_table, load_suffix_set, RemoteList};
//!
//! let config = Config::default();
//! let suffixes = load_suffix_set(&RemoteList::from_source(&config.suffix_list, config.download_timeout()));
//! let cidrs = load_cidr_table(&RemoteList::from_source(&config.cidr_list, config.download_timeout()));
//!
//! let pipeline = Pipeline::new(NetworkProber::from_config(&config), suffixes, cidrs);
//! let partition = pipeline.run(&["example.com".to_string(), "example.com:443".to_string()])?;
//! partition.write(&config.blocked_output, &config.domestic_output)?;
//! ```
//!
//! # Partitioning
//!
//! 1. Entries that resolve to nothing are **blocked**
//! 2. If either reference table has 100 entries or fewer, nothing is classified
//! 3. Otherwise reachable entries are **domestic** when a rule matches, and
//!    **unclassified** when none does
//!
//! Each output list keeps the input order.

mod error;
mod rule_type;
mod verdict;

pub mod classifier;
pub mod config;
pub mod entry;
pub mod listfile;
pub mod pipeline;
pub mod resolver;
pub mod rule;
pub mod source;

// Re-export core types
pub use error::{ClassifyError, Error, ProbeError, Result};
pub use rule_type::RuleType;
pub use verdict::Verdict;

pub use classifier::Classifier;
pub use config::Config;
pub use entry::DomainEntry;
pub use pipeline::{Partition, Pipeline};
pub use resolver::{probe_all, Limiter, NetworkProber, Prober};
pub use rule::{CidrTable, SuffixSet};
