//! Rate limiter configuration.

use std::time::Duration;

/// Configuration for per-IP request throttling.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests accepted per IP within one wall-clock minute.
    pub max_requests: u32,
    /// Lifetime of a minute-bucket counter.
    pub window: Duration,
    /// How long an IP stays blocked once it exceeds the limit.
    pub block_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 40,
            window: Duration::from_secs(60),
            block_duration: Duration::from_secs(300),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, block_secs: u64) -> Self {
        Self {
            max_requests,
            block_duration: Duration::from_secs(block_secs),
            ..Default::default()
        }
    }
}
