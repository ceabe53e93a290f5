//! Fixed-window per-IP rate limiter.
//!
//! Counts requests per IP in wall-clock minute buckets (`{ip}:{YYYYMMDDHHmm}`).
//! The decision is taken on the value returned by the store's atomic
//! increment. Once a bucket passes the limit the IP is flagged blocked for the block
//! duration, independent of later bucket resets. Bursts straddling a minute
//! boundary can reach twice the limit; that is a property of fixed windows.

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use super::config::RateLimitConfig;
use crate::cache::{BoxedCacheBackend, CacheResult};

/// Value stored under a block flag.
const BLOCKED_MARKER: &str = "blocked";

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Request accepted; `count` is the bucket value after this request.
    Allowed { count: i64 },
    /// IP is (now) blocked.
    Blocked,
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Per-IP fixed-window rate limiter backed by the ephemeral store.
#[derive(Clone)]
pub struct RateLimiter {
    backend: BoxedCacheBackend,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a rate limiter with default limits (40/min, 300 s block).
    pub fn new(backend: BoxedCacheBackend) -> Self {
        Self::with_config(backend, RateLimitConfig::default())
    }

    pub fn with_config(backend: BoxedCacheBackend, config: RateLimitConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Minute-bucket counter key.
    pub fn bucket_key(ip: &str, now: DateTime<Local>) -> String {
        format!("{}:{}", ip, now.format("%Y%m%d%H%M"))
    }

    fn block_key(ip: &str) -> String {
        format!("blocked:{}", ip)
    }

    /// Check and count a request from `ip`.
    ///
    /// Store failures let the request through.
    pub async fn check(&self, ip: &str) -> RateDecision {
        match self.check_at(ip, Local::now()).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!("Rate limit check failed for {}: {}", ip, e);
                RateDecision::Allowed { count: 0 }
            }
        }
    }

    /// Check and count a request from `ip` at a given wall-clock time.
    pub async fn check_at(&self, ip: &str, now: DateTime<Local>) -> CacheResult<RateDecision> {
        let block_key = Self::block_key(ip);
        if self.backend.exists(&block_key).await? {
            debug!(ip, "Rejecting request from blocked IP");
            return Ok(RateDecision::Blocked);
        }

        let bucket = Self::bucket_key(ip, now);
        let count = self
            .backend
            .incr_with_expiry(&bucket, self.config.window)
            .await?;

        if count > i64::from(self.config.max_requests) {
            warn!(
                ip,
                count,
                block_secs = self.config.block_duration.as_secs(),
                "Rate limit exceeded, blocking IP"
            );
            self.backend
                .set_ex(&block_key, BLOCKED_MARKER, self.config.block_duration)
                .await?;
            return Ok(RateDecision::Blocked);
        }

        Ok(RateDecision::Allowed { count })
    }
}
