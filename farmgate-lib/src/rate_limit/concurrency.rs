//! Cap on simultaneous requests per client.

use std::sync::Arc;

use tokio::sync::OwnedSemaphorePermit;
use tokio::sync::Semaphore;

use crate::error::Error;

/// Dashboards fire several list calls at once (orders, stats, notifications);
/// this keeps a client from sending more than `limit` of them together.
/// Further calls wait for a free slot.
///
/// ```
/// use farmgate_lib::rate_limit::ConcurrencyLimiter;
///
/// let limiter = ConcurrencyLimiter::new(4);
/// assert_eq!(limiter.available(), 4);
/// assert_eq!(limiter.in_use(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct ConcurrencyLimiter {
    slots: Arc<Semaphore>,
    limit: usize,
}

impl ConcurrencyLimiter {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            slots: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Waits for a slot. The slot frees when the permit drops, even if the
    /// permit was moved into another task.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, Error> {
        Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| Error::Cancelled)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Requests currently holding a slot.
    pub fn in_use(&self) -> usize {
        self.limit - self.available()
    }
}

impl Default for ConcurrencyLimiter {
    fn default() -> Self {
        Self::new(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_slots_free_on_drop() {
        let limiter = ConcurrencyLimiter::new(2);
        let first = limiter.acquire().await.unwrap();
        let _second = limiter.acquire().await.unwrap();
        assert_eq!(limiter.in_use(), 2);
        assert_eq!(limiter.available(), 0);

        drop(first);
        assert_eq!(limiter.available(), 1);
    }

    #[test]
    fn test_zero_limit_becomes_one() {
        assert_eq!(ConcurrencyLimiter::new(0).limit(), 1);
    }
}
