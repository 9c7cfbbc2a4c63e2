use futures::FutureExt;
use lru::LruCache;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::types::{CacheEntry, CacheStats, SharedComputation, SharedResult};
use crate::error::AppError;

/// Bounded, TTL-expiring LRU cache that stores the *computation* for a key
/// rather than its result.
///
/// Concurrent callers for the same key attach to one computation. The
/// computation runs on its own task, so a caller going away never cancels
/// it. A failed computation removes its own entry, so the next caller
/// retries instead of receiving the cached failure.
pub struct CoalescingCache<K, V> {
    name: &'static str,
    ttl: Duration,
    entries: Arc<Mutex<LruCache<K, CacheEntry<V>>>>,
    next_id: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> CoalescingCache<K, V>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
            next_id: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the value for `key`, starting `compute` only if no live entry
    /// exists. Callers arriving while a computation is in flight await that
    /// same computation.
    #[instrument(skip(self, compute), fields(cache = self.name))]
    pub async fn get_or_compute<F, Fut>(&self, key: K, compute: F) -> SharedResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SharedResult<V>> + Send + 'static,
    {
        let computation = {
            let mut entries = self.entries.lock().await;
            let live = entries
                .get(&key)
                .filter(|entry| !entry.is_expired())
                .map(|entry| (entry.value.clone(), entry.time_until_expiry()));

            if let Some((computation, expires_in)) = live {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit: key={:?}, expires_in={:?}", key, expires_in);
                computation
            } else {
                debug!("Cache miss: key={:?}", key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let computation = self.spawn(key.clone(), id, compute());
                // `put` replaces an expired entry or evicts the least recently
                // used one. Readers already holding its computation are unaffected.
                entries.put(key, CacheEntry::new(id, computation.clone(), self.ttl));
                computation
            }
        };

        computation.await
    }

    /// Runs `future` on its own task and wraps the task in a shareable
    /// handle. The task evicts its own entry on failure.
    fn spawn<Fut>(&self, key: K, id: u64, future: Fut) -> SharedComputation<V>
    where
        Fut: Future<Output = SharedResult<V>> + Send + 'static,
    {
        let entries = Arc::clone(&self.entries);
        let name = self.name;
        let task = tokio::spawn(async move {
            let result = future.await;
            if let Err(e) = &result {
                warn!("{name} computation failed for key={key:?}: {e}");
                let mut entries = entries.lock().await;
                // Only evict our own entry; a newer one may have replaced it.
                if entries.peek(&key).is_some_and(|entry| entry.id == id) {
                    entries.pop(&key);
                }
            }
            result
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(Arc::new(AppError::task_failed(e.to_string()))),
            }
        }
        .boxed()
        .shared()
    }

    /// Whether a live entry exists for `key`, without touching LRU order.
    pub async fn contains(&self, key: &K) -> bool {
        self.entries
            .lock()
            .await
            .peek(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Removes the entry for `key`, if any.
    pub async fn invalidate(&self, key: &K) {
        self.entries.lock().await.pop(key);
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Gets current size, capacity and hit counters for monitoring
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().await;
        CacheStats {
            name: self.name,
            size: entries.len(),
            capacity: entries.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn cache(capacity: usize, ttl_secs: u64) -> CoalescingCache<String, u32> {
        CoalescingCache::new(
            "test",
            NonZeroUsize::new(capacity).unwrap(),
            Duration::from_secs(ttl_secs),
        )
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let cache = cache(10, 30);
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let value = cache
                .get_or_compute("k".to_string(), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
            assert_eq!(value, 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses), (2, 1));
    }

    #[tokio::test]
    async fn test_failure_does_not_poison_entry() {
        let cache = cache(10, 30);
        let calls = Arc::new(AtomicUsize::new(0));

        let first_calls = Arc::clone(&calls);
        let first = cache
            .get_or_compute("k".to_string(), move || async move {
                first_calls.fetch_add(1, Ordering::SeqCst);
                Err(Arc::new(AppError::malformed("boom")))
            })
            .await;
        assert!(first.is_err());
        assert!(!cache.contains(&"k".to_string()).await);

        let second_calls = Arc::clone(&calls);
        let second = cache
            .get_or_compute("k".to_string(), move || async move {
                second_calls.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            })
            .await;
        assert_eq!(second.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = cache(10, 30);
        let calls = Arc::new(AtomicUsize::new(0));
        let compute = |calls: Arc<AtomicUsize>| {
            move || async move { Ok(calls.fetch_add(1, Ordering::SeqCst) as u32) }
        };

        assert_eq!(cache.get_or_compute("k".into(), compute(calls.clone())).await.unwrap(), 0);
        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(cache.get_or_compute("k".into(), compute(calls.clone())).await.unwrap(), 0);
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get_or_compute("k".into(), compute(calls.clone())).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_least_recently_used_entry_is_evicted() {
        let cache = cache(2, 30);
        for key in ["a", "b", "c"] {
            cache
                .get_or_compute(key.to_string(), || async { Ok(0) })
                .await
                .unwrap();
        }
        assert_eq!(cache.len().await, 2);
        assert!(!cache.contains(&"a".to_string()).await);
        assert!(cache.contains(&"c".to_string()).await);
    }

    #[tokio::test]
    async fn test_dropped_caller_does_not_cancel_computation() {
        let cache = Arc::new(cache(10, 30));
        let calls = Arc::new(AtomicUsize::new(0));

        let task_cache = Arc::clone(&cache);
        let task_calls = Arc::clone(&calls);
        let caller = tokio::spawn(async move {
            task_cache
                .get_or_compute("k".to_string(), move || async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    task_calls.fetch_add(1, Ordering::SeqCst);
                    Ok(5)
                })
                .await
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        caller.abort();

        let value = cache
            .get_or_compute("k".to_string(), || async { Ok(99) })
            .await
            .unwrap();
        assert_eq!(value, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
