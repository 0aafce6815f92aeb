//! Counting limiter over in-flight probes.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::ProbeError;

/// Default number of probes allowed in flight at once.
///
/// Keeps the process well under common file-descriptor limits.
pub const DEFAULT_CONCURRENCY: usize = 500;

/// Limiter caps how many probes may run at the same time.
///
/// Cloning a limiter shares the same slots. A slot is held by the returned
/// permit and released when the permit is dropped.
#[derive(Debug, Clone)]
pub struct Limiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl Limiter {
    /// Create a limiter with `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Slots currently held.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.available()
    }

    /// Wait for a free slot.
    ///
    /// Waiters are served in FIFO order.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, ProbeError> {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| ProbeError::LimiterClosed)
    }
}

impl Default for Limiter {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}
