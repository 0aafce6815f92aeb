//! Concurrent reachability probing of domain list entries.
//!
//! A [`Prober`] turns one entry into the list of addresses it resolves to:
//!
//! - `name` is resolved with an A query, retried up to `attempts` times until
//!   at least one usable address comes back. `0.0.0.0` is a blackhole answer
//!   and is dropped.
//! - `name:port` is probed with a TCP connect; success yields `[name]`.
//!
//! Any failure resolves to an empty list. [`probe_all`] fans out over a whole
//! list with every probe gated by a shared [`Limiter`].

mod dns;
mod limiter;
mod tcp;

pub use dns::{HickoryLookup, DEFAULT_DNS_PORT, DEFAULT_DNS_TIMEOUT};
pub use limiter::{Limiter, DEFAULT_CONCURRENCY};
pub use tcp::{TcpConnector, DEFAULT_CONNECT_TIMEOUT};

use ahash::{AHashMap, AHashSet};
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::Arc;

use crate::entry::DomainEntry;
use crate::error::{ProbeError, Result};
use crate::Config;

/// Default number of DNS attempts per entry.
pub const DEFAULT_ATTEMPTS: usize = 3;

/// Issues a single A query.
#[async_trait]
pub trait Lookup: Send + Sync {
    /// Query A records for `host`, returning every address in answer order.
    async fn lookup_a(&self, host: &str) -> std::result::Result<Vec<Ipv4Addr>, ProbeError>;
}

/// Opens (and immediately closes) a TCP connection.
#[async_trait]
pub trait Connect: Send + Sync {
    /// Connect to `host:port`.
    async fn connect(&self, host: &str, port: u16) -> std::result::Result<(), ProbeError>;
}

/// Prober resolves entries with a DNS lookup or a TCP connect.
pub struct Prober<L, C> {
    lookup: L,
    connector: C,
    limiter: Limiter,
    attempts: usize,
}

/// Prober backed by hickory-dns and real TCP sockets.
pub type NetworkProber = Prober<HickoryLookup, TcpConnector>;

impl NetworkProber {
    /// Build a prober from the nameserver, timeout and concurrency settings.
    pub fn from_config(config: &Config) -> Self {
        Prober::new(
            HickoryLookup::new(&config.nameservers, config.dns_port, config.dns_timeout()),
            TcpConnector::new(config.connect_timeout()),
            Limiter::new(config.concurrency),
        )
        .with_attempts(config.attempts)
    }
}

impl<L: Lookup, C: Connect> Prober<L, C> {
    /// Create a prober with the default of three DNS attempts.
    pub fn new(lookup: L, connector: C, limiter: Limiter) -> Self {
        Self {
            lookup,
            connector,
            limiter,
            attempts: DEFAULT_ATTEMPTS,
        }
    }

    /// Set the total number of DNS attempts per entry (at least one).
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// The limiter gating this prober.
    pub fn limiter(&self) -> &Limiter {
        &self.limiter
    }

    /// Total number of DNS attempts per entry.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Probe one entry and report why it failed, if it did.
    ///
    /// Holds a limiter slot for the whole probe, retries included.
    pub async fn try_probe(&self, entry: &str) -> std::result::Result<Vec<String>, ProbeError> {
        let _permit = self.limiter.acquire().await?;
        let entry = DomainEntry::parse(entry)?;

        match entry.port() {
            Some(port) => {
                self.connector.connect(entry.host(), port).await?;
                Ok(vec![entry.host().to_string()])
            }
            None => self.resolve(entry.host()).await,
        }
    }

    /// Probe one entry. Failures are logged and yield an empty list.
    pub async fn probe(&self, entry: &str) -> (String, Vec<String>) {
        let ips = match self.try_probe(entry).await {
            Ok(ips) => ips,
            Err(e) => {
                log::warn!("\"{}\": {}", entry, e);
                Vec::new()
            }
        };
        log::info!("{}: {:?}", entry, ips);
        (entry.to_string(), ips)
    }

    async fn resolve(&self, host: &str) -> std::result::Result<Vec<String>, ProbeError> {
        let mut last_error = ProbeError::NoRecords;

        for attempt in 1..=self.attempts {
            match self.lookup.lookup_a(host).await {
                Ok(addrs) => {
                    let ips = usable_addresses(addrs);
                    if !ips.is_empty() {
                        return Ok(ips);
                    }
                    last_error = ProbeError::NoRecords;
                }
                Err(e) => last_error = e,
            }
            log::debug!(
                "\"{}\": attempt {}/{} failed: {}",
                host,
                attempt,
                self.attempts,
                last_error
            );
        }

        Err(last_error)
    }
}

/// Drop blackhole answers and format the rest.
fn usable_addresses(addrs: Vec<Ipv4Addr>) -> Vec<String> {
    addrs
        .into_iter()
        .filter(|ip| !ip.is_unspecified())
        .map(|ip| ip.to_string())
        .collect()
}

/// Probe every entry concurrently and wait for all of them.
///
/// Each distinct entry is probed once. The returned map has one key per
/// distinct entry; unreachable entries map to an empty list. Fails only if
/// a probe task panicked.
pub async fn probe_all<L, C>(
    prober: &Arc<Prober<L, C>>,
    entries: &[String],
) -> Result<AHashMap<String, Vec<String>>>
where
    L: Lookup + 'static,
    C: Connect + 'static,
{
    let mut seen = AHashSet::with_capacity(entries.len());
    let mut handles = Vec::with_capacity(entries.len());

    for entry in entries {
        if !seen.insert(entry.as_str()) {
            continue;
        }
        let prober = Arc::clone(prober);
        let entry = entry.clone();
        handles.push(tokio::spawn(async move { prober.probe(&entry).await }));
    }

    let mut results = AHashMap::with_capacity(handles.len());
    for handle in handles {
        let (entry, ips) = handle.await?;
        results.insert(entry, ips);
    }

    log::info!("resolve domain: {}", results.len());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays scripted answers, then keeps failing.
    #[derive(Default)]
    struct ScriptedLookup {
        answers: Mutex<VecDeque<std::result::Result<Vec<Ipv4Addr>, ProbeError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedLookup {
        fn new(answers: Vec<std::result::Result<Vec<Ipv4Addr>, ProbeError>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Lookup for ScriptedLookup {
        async fn lookup_a(&self, _host: &str) -> std::result::Result<Vec<Ipv4Addr>, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProbeError::Timeout))
        }
    }

    /// Counts how many lookups run at the same time.
    #[derive(Default)]
    struct GaugedLookup {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Lookup for GaugedLookup {
        async fn lookup_a(&self, _host: &str) -> std::result::Result<Vec<Ipv4Addr>, ProbeError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![Ipv4Addr::new(1, 2, 3, 4)])
        }
    }

    #[derive(Default)]
    struct RecordingConnector {
        calls: Mutex<Vec<(String, u16)>>,
        refuse: bool,
    }

    #[async_trait]
    impl Connect for RecordingConnector {
        async fn connect(&self, host: &str, port: u16) -> std::result::Result<(), ProbeError> {
            self.calls.lock().unwrap().push((host.to_string(), port));
            if self.refuse {
                Err(ProbeError::Connect(std::io::ErrorKind::ConnectionRefused.into()))
            } else {
                Ok(())
            }
        }
    }

    fn ip(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
        Ipv4Addr::new(a, b, c, d)
    }

    #[tokio::test]
    async fn test_dns_probe_returns_addresses_in_order() {
        let lookup = ScriptedLookup::new(vec![Ok(vec![ip(1, 1, 1, 1), ip(2, 2, 2, 2)])]);
        let prober = Prober::new(lookup, RecordingConnector::default(), Limiter::new(4));

        let (entry, ips) = prober.probe("example.com").await;
        assert_eq!(entry, "example.com");
        assert_eq!(ips, vec!["1.1.1.1", "2.2.2.2"]);
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_third_attempt() {
        let lookup = ScriptedLookup::new(vec![
            Err(ProbeError::Timeout),
            Err(ProbeError::Lookup("SERVFAIL".to_string())),
            Ok(vec![ip(9, 9, 9, 9)]),
        ]);
        let prober = Prober::new(lookup, RecordingConnector::default(), Limiter::new(1));

        let ips = prober.try_probe("example.com").await.unwrap();
        assert_eq!(ips, vec!["9.9.9.9"]);
        assert_eq!(prober.lookup.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_three_attempts() {
        let lookup = ScriptedLookup::new(vec![
            Err(ProbeError::Timeout),
            Err(ProbeError::Timeout),
            Err(ProbeError::Timeout),
            Ok(vec![ip(9, 9, 9, 9)]),
        ]);
        let prober = Prober::new(lookup, RecordingConnector::default(), Limiter::new(1));

        let (_, ips) = prober.probe("example.com").await;
        assert!(ips.is_empty());
        assert_eq!(prober.lookup.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_after_first_success() {
        let lookup = ScriptedLookup::new(vec![Ok(vec![ip(1, 2, 3, 4)]), Ok(vec![ip(5, 6, 7, 8)])]);
        let prober = Prober::new(lookup, RecordingConnector::default(), Limiter::new(1));

        assert_eq!(prober.try_probe("example.com").await.unwrap(), vec!["1.2.3.4"]);
        assert_eq!(prober.lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blackhole_answer_is_retried() {
        let lookup = ScriptedLookup::new(vec![
            Ok(vec![Ipv4Addr::UNSPECIFIED]),
            Ok(vec![Ipv4Addr::UNSPECIFIED, ip(1, 2, 3, 4)]),
        ]);
        let prober = Prober::new(lookup, RecordingConnector::default(), Limiter::new(1));

        assert_eq!(prober.try_probe("example.com").await.unwrap(), vec!["1.2.3.4"]);
        assert_eq!(prober.lookup.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_blackhole_only_is_unreachable() {
        let lookup = ScriptedLookup::new(vec![
            Ok(vec![Ipv4Addr::UNSPECIFIED]),
            Ok(vec![Ipv4Addr::UNSPECIFIED]),
            Ok(vec![Ipv4Addr::UNSPECIFIED]),
        ]);
        let prober = Prober::new(lookup, RecordingConnector::default(), Limiter::new(1));

        assert!(matches!(
            prober.try_probe("ads.example.com").await,
            Err(ProbeError::NoRecords)
        ));
    }

    #[tokio::test]
    async fn test_port_entry_connects_instead_of_querying() {
        let prober = Prober::new(
            ScriptedLookup::default(),
            RecordingConnector::default(),
            Limiter::new(1),
        );

        let (entry, ips) = prober.probe("example.com:443").await;
        assert_eq!(entry, "example.com:443");
        assert_eq!(ips, vec!["example.com"]);
        assert_eq!(prober.lookup.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            *prober.connector.calls.lock().unwrap(),
            vec![("example.com".to_string(), 443)]
        );
    }

    #[tokio::test]
    async fn test_refused_port_entry_is_unreachable() {
        let connector = RecordingConnector {
            refuse: true,
            ..Default::default()
        };
        let prober = Prober::new(ScriptedLookup::default(), connector, Limiter::new(1));

        let (_, ips) = prober.probe("example.com:8443").await;
        assert!(ips.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_port_is_unreachable() {
        let prober = Prober::new(
            ScriptedLookup::default(),
            RecordingConnector::default(),
            Limiter::new(1),
        );

        assert!(matches!(
            prober.try_probe("example.com:http").await,
            Err(ProbeError::InvalidEntry(_))
        ));
        assert!(prober.connector.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_real_tcp_probe() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let prober = Prober::new(
            ScriptedLookup::default(),
            TcpConnector::new(Duration::from_secs(2)),
            Limiter::new(1),
        );

        let (_, ips) = prober.probe(&format!("127.0.0.1:{port}")).await;
        assert_eq!(ips, vec!["127.0.0.1"]);
    }

    #[tokio::test]
    async fn test_probe_all_respects_limiter() {
        let prober = Arc::new(Prober::new(
            GaugedLookup::default(),
            RecordingConnector::default(),
            Limiter::new(2),
        ));
        let entries: Vec<String> = (0..10).map(|i| format!("host{i}.example.com")).collect();

        let results = probe_all(&prober, &entries).await.unwrap();

        assert_eq!(results.len(), 10);
        assert!(results.values().all(|ips| ips == &vec!["1.2.3.4".to_string()]));
        let peak = prober.lookup.peak.load(Ordering::SeqCst);
        assert!(peak <= 2, "peak in-flight was {peak}");
        assert!(peak >= 1);
        assert_eq!(prober.limiter().available(), 2);
    }

    #[tokio::test]
    async fn test_probe_all_probes_duplicates_once() {
        let lookup = ScriptedLookup::new(vec![Ok(vec![ip(1, 2, 3, 4)])]);
        let prober = Arc::new(Prober::new(
            lookup,
            RecordingConnector::default(),
            Limiter::new(4),
        ));
        let entries = vec!["dup.example.com".to_string(), "dup.example.com".to_string()];

        let results = probe_all(&prober, &entries).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results["dup.example.com"], vec!["1.2.3.4"]);
        assert_eq!(prober.lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_probe_all_covers_every_entry() {
        let prober = Arc::new(Prober::new(
            ScriptedLookup::default(),
            RecordingConnector::default(),
            Limiter::new(3),
        ));
        let entries = vec![
            "a.example.com".to_string(),
            "b.example.com:80".to_string(),
            "c.example.com:bad".to_string(),
        ];

        let results = probe_all(&prober, &entries).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results["a.example.com"].is_empty());
        assert_eq!(results["b.example.com:80"], vec!["b.example.com"]);
        assert!(results["c.example.com:bad"].is_empty());
    }

    #[test]
    fn test_attempts_at_least_one() {
        let prober = Prober::new(
            ScriptedLookup::default(),
            RecordingConnector::default(),
            Limiter::new(1),
        )
        .with_attempts(0);
        assert_eq!(prober.attempts(), 1);
    }
}
