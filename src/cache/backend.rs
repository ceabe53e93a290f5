//! Pluggable backend trait for the ephemeral key-value store.
//!
//! Session tokens, rate counters and block flags all live here. Swap between
//! in-memory (single process) and Redis (shared across instances).

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors from cache backend operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Command failed: {0}")]
    Command(String),
    #[error("Unexpected value for {key}: {value}")]
    Corrupt { key: String, value: String },
}

/// Trait for ephemeral storage backends.
///
/// Implementations must be thread-safe and handle concurrent access.
/// `incr_with_expiry` must be atomic: concurrent callers never lose an increment.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch a live value.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store a value that expires after `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Store a value only when no live value exists. Returns whether it was stored.
    async fn set_nx_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool>;

    /// Remaining lifetime of a key. `None` when the key is missing or has no expiry.
    async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>>;

    /// Check whether a live key exists.
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Atomically increment a counter and (re)set its expiry. Returns the new value.
    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> CacheResult<i64>;
}

/// Shared handle to a cache backend.
pub type BoxedCacheBackend = Arc<dyn CacheBackend>;
