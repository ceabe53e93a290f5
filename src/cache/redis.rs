//! Redis-backed cache for sharing tokens and rate counters across instances.
//!
//! Relies on Redis' own key expiry and on `MULTI`/`EXEC` for the counter
//! increment, so concurrent gateway instances never lose an increment.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::backend::{CacheBackend, CacheError, CacheResult};

/// Key prefix for everything this service stores in Redis.
const KEY_PREFIX: &str = "sitesearch:";

/// Redis-backed cache storage.
#[derive(Clone)]
pub struct RedisCacheBackend {
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisCacheBackend {
    /// Connect to Redis.
    ///
    /// # Arguments
    /// * `redis_url` - Redis connection URL (e.g., "redis://localhost:6379/0")
    /// * `timeout` - Upper bound for any single command round trip
    pub async fn new(redis_url: &str, timeout: Duration) -> CacheResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::Unavailable(format!("Redis connection error: {}", e)))?;

        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Unavailable("Redis connection timed out".to_string()))?
            .map_err(|e| {
                CacheError::Unavailable(format!("Redis connection manager error: {}", e))
            })?;

        Ok(Self { conn, timeout })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }

    async fn bounded<T, F>(&self, fut: F) -> CacheResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| CacheError::Unavailable("Redis command timed out".to_string()))?
            .map_err(|e| CacheError::Command(e.to_string()))
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();
        let key = self.key(key);
        self.bounded(conn.get::<_, Option<String>>(&key)).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let key = self.key(key);
        let cmd = redis::cmd("SET")
            .arg(&key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .to_owned();
        self.bounded(cmd.query_async::<()>(&mut conn)).await
    }

    async fn set_nx_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        let mut conn = self.conn.clone();
        let key = self.key(key);
        let cmd = redis::cmd("SET")
            .arg(&key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .to_owned();
        // Nil reply when the key already exists
        let reply: Option<String> = self.bounded(cmd.query_async(&mut conn)).await?;
        Ok(reply.is_some())
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>> {
        let mut conn = self.conn.clone();
        let key = self.key(key);
        let cmd = redis::cmd("PTTL").arg(&key).to_owned();
        // -2: missing, -1: no expiry
        let millis: i64 = self.bounded(cmd.query_async(&mut conn)).await?;
        if millis < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_millis(millis as u64)))
        }
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.conn.clone();
        let key = self.key(key);
        self.bounded(conn.exists::<_, bool>(&key)).await
    }

    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> CacheResult<i64> {
        let mut conn = self.conn.clone();
        let key = self.key(key);
        let pipe = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .expire(&key, ttl.as_secs().max(1) as i64)
            .ignore()
            .to_owned();
        let (count,): (i64,) = self.bounded(pipe.query_async(&mut conn)).await?;
        Ok(count)
    }
}
