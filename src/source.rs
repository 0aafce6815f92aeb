//! Reference list providers: download, cache, and parse.
//!
//! This module provides `RemoteList` which handles:
//! - Downloading a text list from a remote URL
//! - Gzip decompression
//! - Local caching with atomic updates
//!
//! and the parsers that turn the domestic domain list into a [`SuffixSet`]
//! and the domestic CIDR list into a [`CidrTable`].
//!
//! A failed download leaves no cache behind and produces an empty table,
//! which the pipeline treats as untrustworthy.

use flate2::read::GzDecoder;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::ListSource;
use crate::listfile::temp_path_for;
use crate::rule::{CidrTable, SuffixSet};
use crate::{Error, Result};

/// Domain list prefixes whose entries cannot be matched by membership.
const SKIPPED_PREFIXES: &[&str] = &["regexp:", "keyword:", "include:"];

/// Domain list prefixes that are stripped before insertion.
const STRIPPED_PREFIXES: &[&str] = &["full:", "domain:"];

/// A remote text list cached to a local file.
#[derive(Debug, Clone)]
pub struct RemoteList {
    /// Remote URL of the list
    url: String,
    /// Local cache file
    cache_path: PathBuf,
    /// Request timeout
    timeout: Duration,
}

impl RemoteList {
    /// Create a list source.
    ///
    /// # Arguments
    ///
    /// * `url` - URL to download the list from (plain or gzip compressed)
    /// * `cache_path` - File to store the downloaded list in
    pub fn new(url: &str, cache_path: &Path) -> Self {
        Self {
            url: url.to_string(),
            cache_path: cache_path.to_path_buf(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Create a list source from configuration.
    pub fn from_source(source: &ListSource, timeout: Duration) -> Self {
        Self::new(&source.url, &source.cache).with_timeout(timeout)
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the URL being used.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the cache file path.
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Download the list, refresh the cache, and return its text.
    ///
    /// The previous cache file is removed first, so a failed download leaves
    /// no stale copy behind.
    pub fn fetch(&self) -> Result<String> {
        if let Some(parent) = self
            .cache_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)?;
        }
        if self.cache_path.exists() {
            fs::remove_file(&self.cache_path)?;
        }

        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        let response = agent
            .get(&self.url)
            .call()
            .map_err(|e| Error::Download(format!("{}: {}", self.url, e)))?;

        let mut raw_data = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut raw_data)
            .map_err(|e| Error::Download(format!("failed to read response: {}", e)))?;

        let data = if is_gzip(&raw_data) {
            let mut decoder = GzDecoder::new(&raw_data[..]);
            let mut data = Vec::new();
            decoder
                .read_to_end(&mut data)
                .map_err(|e| Error::Download(format!("gzip decompression failed: {}", e)))?;
            log::debug!(
                "decompressed {}: {} -> {} bytes",
                self.url,
                raw_data.len(),
                data.len()
            );
            data
        } else {
            raw_data
        };

        self.store(&data)?;
        log::info!("downloaded {} ({} bytes)", self.url, data.len());

        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Write to a temp file and rename it over the cache path.
    fn store(&self, data: &[u8]) -> Result<()> {
        let temp_path = temp_path_for(&self.cache_path);
        let mut temp_file = fs::File::create(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        drop(temp_file);

        fs::rename(&temp_path, &self.cache_path)?;
        Ok(())
    }
}

/// Check if data is gzip compressed.
fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

/// Parse a domestic domain list.
///
/// Accepts plain domains and the `full:` / `domain:` prefixed forms; regex,
/// keyword and include lines are skipped, as are `:@attr` tags.
pub fn parse_suffix_list(content: &str) -> SuffixSet {
    let mut set = SuffixSet::new();

    for line in content.lines() {
        let line = match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        };
        let line = line.trim();
        if line.is_empty() || SKIPPED_PREFIXES.iter().any(|p| line.starts_with(p)) {
            continue;
        }

        let line = STRIPPED_PREFIXES
            .iter()
            .find_map(|p| line.strip_prefix(p))
            .unwrap_or(line);
        let domain = match line.find(":@") {
            Some(idx) => &line[..idx],
            None => line,
        };
        set.insert(domain);
    }

    set
}

/// Parse a domestic CIDR list of `a.b.c.d/len` lines.
///
/// IPv6 and malformed lines are skipped.
pub fn parse_cidr_list(content: &str) -> CidrTable {
    let mut table = CidrTable::new();
    let mut skipped = 0usize;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if table.add_pattern(line).is_err() {
            skipped += 1;
            log::debug!("skipping CIDR line {:?}", line);
        }
    }

    if skipped > 0 {
        log::warn!("skipped {} unusable CIDR lines", skipped);
    }
    table
}

/// Download and parse the domestic domain list; empty on any failure.
pub fn load_suffix_set(list: &RemoteList) -> SuffixSet {
    log::info!("resolve domestic domain list...");
    let set = match list.fetch() {
        Ok(content) => parse_suffix_list(&content),
        Err(e) => {
            log::error!("{}", e);
            SuffixSet::new()
        }
    };
    log::info!("domestic domain list: {}", set.len());
    set
}

/// Download and parse the domestic CIDR list; empty on any failure.
pub fn load_cidr_table(list: &RemoteList) -> CidrTable {
    log::info!("resolve domestic IP list...");
    let table = match list.fetch() {
        Ok(content) => parse_cidr_list(&content),
        Err(e) => {
            log::error!("{}", e);
            CidrTable::new()
        }
    };
    log::info!("domestic IP list: {}", table.len());
    table
}
