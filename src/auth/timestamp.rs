//! Request timestamp freshness policies.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;

use super::AuthError;

/// How strictly the `_` request timestamp (epoch milliseconds) is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampPolicy {
    /// 30 minute tolerance; any integer is accepted.
    #[default]
    Standard,
    /// 10 second tolerance; must be a string of ASCII digits.
    Strict,
}

impl TimestampPolicy {
    /// Maximum allowed clock difference in milliseconds.
    pub fn tolerance_ms(&self) -> i64 {
        match self {
            TimestampPolicy::Standard => 1_800_000,
            TimestampPolicy::Strict => 10_000,
        }
    }

    /// Parse and check a raw timestamp against the current time.
    pub fn check(&self, raw: &str) -> Result<i64, AuthError> {
        self.check_at(raw, Utc::now().timestamp_millis())
    }

    /// Parse and check a raw timestamp against `now_ms`.
    pub fn check_at(&self, raw: &str, now_ms: i64) -> Result<i64, AuthError> {
        let raw = raw.trim();
        if *self == TimestampPolicy::Strict
            && (raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(AuthError::MalformedTimestamp);
        }

        let ts: i64 = raw.parse().map_err(|_| AuthError::MalformedTimestamp)?;
        if now_ms.abs_diff(ts) > self.tolerance_ms() as u64 {
            return Err(AuthError::StaleTimestamp);
        }
        Ok(ts)
    }
}

impl FromStr for TimestampPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(TimestampPolicy::Standard),
            "strict" => Ok(TimestampPolicy::Strict),
            other => Err(format!(
                "Unknown timestamp policy '{}'. Use 'standard' or 'strict'",
                other
            )),
        }
    }
}

impl fmt::Display for TimestampPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampPolicy::Standard => write!(f, "standard"),
            TimestampPolicy::Strict => write!(f, "strict"),
        }
    }
}
