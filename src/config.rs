//! Run configuration.

use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::classifier::default_workers;
use crate::error::{Error, Result};
use crate::resolver::{DEFAULT_ATTEMPTS, DEFAULT_CONCURRENCY, DEFAULT_DNS_PORT};

/// Reference data is only trusted when it holds more entries than this.
pub const DEFAULT_TRUST_THRESHOLD: usize = 100;

/// Default source of the domestic domain list.
pub const DEFAULT_SUFFIX_LIST_URL: &str =
    "https://raw.githubusercontent.com/Loyalsoldier/v2ray-rules-dat/refs/heads/release/direct-list.txt";

/// Default source of the domestic CIDR list.
pub const DEFAULT_CIDR_LIST_URL: &str =
    "https://raw.githubusercontent.com/Hackl0us/GeoIP2-CN/refs/heads/release/CN-ip-cidr.txt";

/// Where a reference list is downloaded from and cached to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListSource {
    /// Remote URL
    pub url: String,
    /// Local cache file
    pub cache: PathBuf,
}

/// Configuration for one batch run.
///
/// Every field has a default, so an empty YAML document is a valid config.
///
/// # Example
///
/// ```yaml
/// nameservers: [127.0.0.1]
/// dns_port: 5053
/// concurrency: 500
/// domain_list: rules/adblockdns.backup
/// cidr_list:
///   url: https://example.com/cn-cidr.txt
///   cache: rules/CN-ip-cidr.txt
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Nameservers queried in DNS mode
    pub nameservers: Vec<IpAddr>,
    /// Port every nameserver listens on
    pub dns_port: u16,
    /// Maximum number of probes in flight
    pub concurrency: usize,
    /// DNS attempts per entry
    pub attempts: usize,
    /// Per-query DNS timeout in seconds
    pub dns_timeout_secs: u64,
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Minimum size (exclusive) of each reference table
    pub trust_threshold: usize,
    /// Classification worker count; `None` picks one per CPU, at least four
    pub workers: Option<usize>,
    /// Input domain list
    pub domain_list: PathBuf,
    /// Output file for unreachable entries
    pub blocked_output: PathBuf,
    /// Output file for domestic entries
    pub domestic_output: PathBuf,
    /// Domestic domain list source
    pub suffix_list: ListSource,
    /// Domestic CIDR list source
    pub cidr_list: ListSource,
    /// Reference list download timeout in seconds
    pub download_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nameservers: vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
            dns_port: DEFAULT_DNS_PORT,
            concurrency: DEFAULT_CONCURRENCY,
            attempts: DEFAULT_ATTEMPTS,
            dns_timeout_secs: 5,
            connect_timeout_secs: 10,
            trust_threshold: DEFAULT_TRUST_THRESHOLD,
            workers: None,
            domain_list: PathBuf::from("rules/adblockdns.backup"),
            blocked_output: PathBuf::from("rules/black.txt"),
            domestic_output: PathBuf::from("rules/china.txt"),
            suffix_list: ListSource {
                url: DEFAULT_SUFFIX_LIST_URL.to_string(),
                cache: PathBuf::from("rules/direct-list.txt"),
            },
            cidr_list: ListSource {
                url: DEFAULT_CIDR_LIST_URL.to_string(),
                cache: PathBuf::from("rules/CN-ip-cidr.txt"),
            },
            download_timeout_secs: 60,
        }
    }
}

impl Config {
    /// Parse a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Check values that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.nameservers.is_empty() {
            return Err(Error::Config("at least one nameserver is required".to_string()));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }
        if self.attempts == 0 {
            return Err(Error::Config("attempts must be at least 1".to_string()));
        }
        if self.workers == Some(0) {
            return Err(Error::Config("workers must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Classification worker count, resolving the CPU-based default.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }
}
