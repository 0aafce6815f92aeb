//! Reachability checks by TCP handshake.

use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::Connect;
use crate::error::ProbeError;

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Checks reachability with a plain TCP handshake.
#[derive(Debug, Clone, Copy)]
pub struct TcpConnector {
    timeout: Duration,
}

impl TcpConnector {
    /// Create a connector that gives up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Connect for TcpConnector {
    async fn connect(&self, host: &str, port: u16) -> Result<(), ProbeError> {
        match timeout(self.timeout, TcpStream::connect((host, port))).await {
            // Dropping the stream closes it right away.
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(ProbeError::Connect(e)),
            Err(_elapsed) => Err(ProbeError::Timeout),
        }
    }
}
