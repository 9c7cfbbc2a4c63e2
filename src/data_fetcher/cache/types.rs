//! Cache data structures with TTL support

use futures::future::{BoxFuture, Shared};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::AppError;

/// Result of a cached computation. Errors are shared between every caller
/// that attached to the same computation.
pub type SharedResult<V> = Result<V, Arc<AppError>>;

/// Handle to a pending or finished computation that any number of callers
/// can await.
pub type SharedComputation<V> = Shared<BoxFuture<'static, SharedResult<V>>>;

/// One cache slot: the computation for a key and when it was started.
pub struct CacheEntry<V> {
    /// Distinguishes this entry from a later one stored under the same key.
    pub id: u64,
    pub value: SharedComputation<V>,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    pub fn new(id: u64, value: SharedComputation<V>, ttl: Duration) -> Self {
        Self {
            id,
            value,
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// Checks if the entry outlived its TTL
    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }

    /// Gets the remaining time until expiration
    pub fn time_until_expiry(&self) -> Duration {
        self.ttl.saturating_sub(self.cached_at.elapsed())
    }
}

/// Point-in-time statistics for one cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub name: &'static str,
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
