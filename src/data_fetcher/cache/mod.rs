//! Two-tier cache: a short-TTL status cache of upstream roster fetches and
//! a long-TTL snapshot cache of rendered images addressed by a timestamp
//! token.

pub mod types;
mod core;

use bytes::Bytes;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;
use crate::data_fetcher::models::Roster;
use crate::scoreboard::Padding;

pub use self::core::CoalescingCache;
pub use types::*;

/// Status cache key: the server-name filter, `None` meaning the default.
pub type StatusKey = Option<String>;

/// Snapshot cache key. The timestamp token is opaque; a new token is a new
/// key, which lets a client mint a fresh immutable URL whenever it likes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    pub server_name: Option<String>,
    pub padding: Padding,
    pub timestamp: String,
}

/// A rendered scoreboard and the roster it was drawn from.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub image: Bytes,
    pub roster: Arc<Roster>,
}

pub type StatusCache = CoalescingCache<StatusKey, Arc<Roster>>;
pub type SnapshotCache = CoalescingCache<SnapshotKey, Snapshot>;

/// Creates the status cache from configuration
pub fn create_status_cache(config: &CacheConfig) -> StatusCache {
    CoalescingCache::new(
        "status_cache",
        NonZeroUsize::new(config.status_capacity).unwrap_or(NonZeroUsize::MIN),
        Duration::from_secs(config.status_ttl_seconds),
    )
}

/// Creates the snapshot cache from configuration
pub fn create_snapshot_cache(config: &CacheConfig) -> SnapshotCache {
    CoalescingCache::new(
        "snapshot_cache",
        NonZeroUsize::new(config.snapshot_capacity).unwrap_or(NonZeroUsize::MIN),
        Duration::from_secs(config.snapshot_ttl_seconds),
    )
}
