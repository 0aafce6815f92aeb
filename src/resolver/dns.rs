//! A-record lookups through hickory-dns.

use async_trait::async_trait;
use hickory_resolver::{
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
    TokioResolver,
};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use super::Lookup;
use crate::error::ProbeError;

/// Default nameserver port: a local forwarding resolver rather than port 53.
pub const DEFAULT_DNS_PORT: u16 = 5053;

/// Default per-query timeout.
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(5);

/// Plain UDP/TCP resolver pointed at an explicit nameserver list.
///
/// Retries and caching are left to the caller: every call issues exactly one
/// query.
pub struct HickoryLookup {
    resolver: TokioResolver,
    timeout: Duration,
}

impl HickoryLookup {
    /// Build a resolver for `nameservers`, all listening on `port`.
    pub fn new(nameservers: &[IpAddr], port: u16, timeout: Duration) -> Self {
        let config = ResolverConfig::from_parts(
            None,
            vec![],
            NameServerConfigGroup::from_ips_clear(nameservers, port, true),
        );
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.cache_size = 0;

        let resolver =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
                .with_options(opts)
                .build();

        Self { resolver, timeout }
    }

    /// Per-query timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Lookup for HickoryLookup {
    async fn lookup_a(&self, host: &str) -> Result<Vec<Ipv4Addr>, ProbeError> {
        log::debug!("querying A for {}", host);
        let lookup = tokio::time::timeout(self.timeout, self.resolver.ipv4_lookup(host))
            .await
            .map_err(|_| ProbeError::Timeout)?
            .map_err(|e| ProbeError::Lookup(e.to_string()))?;

        Ok(lookup.iter().map(|a| a.0).collect())
    }
}
