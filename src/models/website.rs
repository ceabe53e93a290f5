//! Website model.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A tenant site. Its domain scopes every search made with its credentials.
#[derive(Debug, Clone, Serialize)]
pub struct Website {
    pub id: i32,
    pub name: String,
    pub domain: String,
    pub created_at: DateTime<Utc>,
}

impl Website {
    /// Normalize a domain for storage: trimmed, lowercase, no scheme or trailing slash.
    pub fn normalize_domain(domain: &str) -> String {
        let trimmed = domain.trim().to_lowercase();
        let without_scheme = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(&trimmed);
        without_scheme.trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_domain() {
        assert_eq!(Website::normalize_domain("example.com"), "example.com");
        assert_eq!(Website::normalize_domain(" Example.COM "), "example.com");
        assert_eq!(Website::normalize_domain("https://example.com/"), "example.com");
        assert_eq!(Website::normalize_domain("http://news.example.cn"), "news.example.cn");
    }
}
