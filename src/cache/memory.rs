//! In-memory cache backend for single-process operation.
//!
//! Lock-based store with lazy expiry. Expired entries are swept every
//! `sweep_every` writes. State is not persisted across restarts and is not
//! shared between instances; use Redis for that.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::backend::{CacheBackend, CacheError, CacheResult};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Writes between sweeps of expired entries.
const DEFAULT_SWEEP_EVERY: u64 = 1024;

fn sweep(entries: &mut HashMap<String, Entry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, e| e.is_live(now));
    before - entries.len()
}

/// In-memory cache backend.
#[derive(Clone)]
pub struct InMemoryCacheBackend {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    writes: Arc<AtomicU64>,
    sweep_every: u64,
}

impl Default for InMemoryCacheBackend {
    fn default() -> Self {
        Self::with_sweep_every(DEFAULT_SWEEP_EVERY)
    }
}

impl InMemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sweep_every(sweep_every: u64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            writes: Arc::new(AtomicU64::new(0)),
            sweep_every: sweep_every.max(1),
        }
    }

    /// Drop expired entries (housekeeping). Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        sweep(&mut entries, Instant::now())
    }

    /// Number of resident entries, expired or not.
    pub async fn resident(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Count a write and sweep when due. Called with the write lock held.
    fn after_write(&self, entries: &mut HashMap<String, Entry>, now: Instant) {
        let n = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if n % self.sweep_every == 0 {
            let removed = sweep(entries, now);
            if removed > 0 {
                tracing::trace!(removed, "Swept expired cache entries");
            }
        }
    }

    async fn live_entry(&self, key: &str) -> Option<Entry> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.is_live(Instant::now()))
            .cloned()
    }
}

#[async_trait]
impl CacheBackend for InMemoryCacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.live_entry(key).await.map(|e| e.value))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(now + ttl),
            },
        );
        self.after_write(&mut entries, now);
        Ok(())
    }

    async fn set_nx_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.is_live(now)) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(now + ttl),
            },
        );
        self.after_write(&mut entries, now);
        Ok(true)
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>> {
        let now = Instant::now();
        Ok(self
            .live_entry(key)
            .await
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(now)))
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.live_entry(key).await.is_some())
    }

    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> CacheResult<i64> {
        // Read, increment and expire under one write lock.
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let current = match entries.get(key) {
            Some(e) if e.is_live(now) => e.value.parse::<i64>().map_err(|_| CacheError::Corrupt {
                key: key.to_string(),
                value: e.value.clone(),
            })?,
            _ => 0,
        };

        let next = current + 1;
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at: Some(now + ttl),
            },
        );
        self.after_write(&mut entries, now);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCacheBackend::new();
        cache
            .set_ex("token:k1", "abc", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get("token:k1").await.unwrap().as_deref(), Some("abc"));
        assert!(cache.exists("token:k1").await.unwrap());
        assert!(!cache.exists("token:k2").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_nx_keeps_existing_value() {
        let cache = InMemoryCacheBackend::new();
        let ttl = Duration::from_secs(60);

        assert!(cache.set_nx_ex("token:k1", "first", ttl).await.unwrap());
        assert!(!cache.set_nx_ex("token:k1", "second", ttl).await.unwrap());
        assert_eq!(cache.get("token:k1").await.unwrap().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_set_nx_replaces_expired_value() {
        let cache = InMemoryCacheBackend::new();
        cache
            .set_ex("token:k1", "old", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(cache
            .set_nx_ex("token:k1", "new", Duration::from_secs(60))
            .await
            .unwrap());
        assert_eq!(cache.get("token:k1").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_expired_entries_are_invisible() {
        let cache = InMemoryCacheBackend::new();
        cache
            .set_ex("short", "v", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.get("short").await.unwrap(), None);
        assert_eq!(cache.ttl("short").await.unwrap(), None);
        assert!(!cache.exists("short").await.unwrap());
        assert_eq!(cache.purge_expired().await, 1);
    }

    #[tokio::test]
    async fn test_writes_sweep_expired_entries() {
        let cache = InMemoryCacheBackend::with_sweep_every(100);
        for i in 0..99 {
            cache
                .incr_with_expiry(&format!("10.0.0.{}:202405171000", i), Duration::from_millis(1))
                .await
                .unwrap();
        }
        assert_eq!(cache.resident().await, 99);
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The hundredth write triggers a sweep; only the new key survives.
        cache
            .set_ex("token:k1", "abc", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.resident().await, 1);
        assert_eq!(cache.get("token:k1").await.unwrap().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_default_sweep_bounds_growth() {
        let cache = InMemoryCacheBackend::new();
        for i in 0..(DEFAULT_SWEEP_EVERY - 1) {
            cache
                .set_ex(&format!("k{}", i), "v", Duration::from_millis(1))
                .await
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        cache
            .set_ex("live", "v", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.resident().await, 1);
    }

    #[tokio::test]
    async fn test_ttl_counts_down() {
        let cache = InMemoryCacheBackend::new();
        cache
            .set_ex("k", "v", Duration::from_secs(1800))
            .await
            .unwrap();

        let first = cache.ttl("k").await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = cache.ttl("k").await.unwrap().unwrap();

        assert!(first <= Duration::from_secs(1800));
        assert!(second < first);
    }

    #[tokio::test]
    async fn test_incr_with_expiry() {
        let cache = InMemoryCacheBackend::new();
        assert_eq!(
            cache
                .incr_with_expiry("c", Duration::from_secs(60))
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            cache
                .incr_with_expiry("c", Duration::from_secs(60))
                .await
                .unwrap(),
            2
        );
        assert_eq!(cache.get("c").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_incr_restarts_after_expiry() {
        let cache = InMemoryCacheBackend::new();
        cache
            .incr_with_expiry("c", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let value = cache
            .incr_with_expiry("c", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_incr_rejects_non_numeric_value() {
        let cache = InMemoryCacheBackend::new();
        cache
            .set_ex("c", "blocked", Duration::from_secs(60))
            .await
            .unwrap();

        let err = cache
            .incr_with_expiry("c", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let cache = InMemoryCacheBackend::new();
        let mut handles = Vec::new();
        for _ in 0..50 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .incr_with_expiry("hits", Duration::from_secs(60))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.get("hits").await.unwrap().as_deref(), Some("50"));
    }
}
