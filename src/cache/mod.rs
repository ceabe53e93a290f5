//! Ephemeral key-value store for session tokens, rate counters and block flags.
//!
//! Backends:
//! - In-memory (default, single process)
//! - Redis (shared across gateway instances, requires `redis-backend` feature)

mod backend;
mod memory;

#[cfg(feature = "redis-backend")]
mod redis;

use std::sync::Arc;
use std::time::Duration;

pub use backend::{BoxedCacheBackend, CacheBackend, CacheError, CacheResult};
pub use memory::InMemoryCacheBackend;

#[cfg(feature = "redis-backend")]
pub use self::redis::RedisCacheBackend;

/// Build a cache backend from a backend spec.
///
/// `None` or `"memory"` selects the in-memory backend; `redis://` and
/// `rediss://` URLs select Redis.
pub async fn connect(spec: Option<&str>, timeout: Duration) -> CacheResult<BoxedCacheBackend> {
    match spec {
        None | Some("memory") => {
            tracing::debug!("Using in-memory cache backend");
            Ok(Arc::new(InMemoryCacheBackend::new()))
        }
        Some(url) if url.starts_with("redis://") || url.starts_with("rediss://") => {
            connect_redis(url, timeout).await
        }
        Some(other) => Err(CacheError::Unavailable(format!(
            "Unknown cache backend '{}'. Use 'memory' or a redis:// URL",
            other
        ))),
    }
}

#[cfg(feature = "redis-backend")]
async fn connect_redis(url: &str, timeout: Duration) -> CacheResult<BoxedCacheBackend> {
    tracing::debug!("Connecting to Redis cache backend");
    Ok(Arc::new(RedisCacheBackend::new(url, timeout).await?))
}

#[cfg(not(feature = "redis-backend"))]
async fn connect_redis(_url: &str, _timeout: Duration) -> CacheResult<BoxedCacheBackend> {
    Err(CacheError::Unavailable(
        "Redis support not compiled. Use --features redis-backend".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_memory() {
        let cache = connect(None, Duration::from_secs(1)).await.unwrap();
        cache
            .set_ex("k", "v", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(cache.exists("k").await.unwrap());

        assert!(connect(Some("memory"), Duration::from_secs(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_rejects_unknown_backend() {
        let result = connect(Some("memcached://localhost"), Duration::from_secs(1)).await;
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }
}
