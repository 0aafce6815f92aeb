//! Error types for domsieve.

use thiserror::Error;

/// Error type for domsieve operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Reference list download failed
    #[error("download error: {0}")]
    Download(String),

    /// Invalid CIDR pattern
    #[error("invalid CIDR pattern: {0}")]
    InvalidCidr(String),

    /// Invalid domain entry
    #[error("invalid domain entry: {0}")]
    InvalidEntry(String),

    /// Classification worker pool could not be built
    #[error("worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A probe task panicked or was cancelled
    #[error("probe task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for domsieve operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for a single probe.
///
/// None of these leave the resolver: they are logged and the entry
/// resolves to an empty address list.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The entry could not be split into host and port
    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    /// The attempt did not finish within its timeout
    #[error("timed out")]
    Timeout,

    /// The query succeeded but carried no usable A record
    #[error("no A records")]
    NoRecords,

    /// The DNS query failed
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// The TCP connection could not be established
    #[error("connect failed: {0}")]
    Connect(#[from] std::io::Error),

    /// The concurrency limiter was closed
    #[error("limiter closed")]
    LimiterClosed,
}

/// Error type for classification of a single domain.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClassifyError {
    /// The host has no registrable domain under the public suffix list
    #[error("no registrable domain: {0}")]
    NoRegistrableDomain(String),

    /// A resolved address is not an IPv4 address
    #[error("invalid IPv4 address: {0}")]
    InvalidAddress(String),
}
