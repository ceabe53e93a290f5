//! Per-client request throttling for the public API.
//!
//! Fixed-window counters keyed by client IP, stored in the ephemeral cache
//! so every gateway instance sharing a Redis backend sees the same counts.

mod config;
mod limiter;

pub use config::RateLimitConfig;
pub use limiter::{RateDecision, RateLimiter};
