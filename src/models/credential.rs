//! API credential model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::signing::sha256_hex;

/// Requests per minute recorded on new credentials.
pub const DEFAULT_FREQUENCY_LIMIT: i32 = 40;

/// An appkey/appsecret pair owned by a website.
#[derive(Debug, Clone, Serialize)]
pub struct Credential {
    pub id: i32,
    pub appkey: String,
    #[serde(skip_serializing)]
    pub appsecret: String,
    pub description: String,
    pub website_id: i32,
    /// Recorded for operators; the rate limiter works per IP.
    pub frequency_limit: i32,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    /// Generate a fresh appkey (32 hex chars) and appsecret (64 hex chars).
    pub fn generate_keys() -> (String, String) {
        let appkey = Uuid::new_v4().simple().to_string();
        let appsecret = sha256_hex(&format!(
            "{}-{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        ));
        (appkey, appsecret)
    }

    /// First characters of the secret, for listings.
    pub fn masked_secret(&self) -> String {
        let visible: String = self.appsecret.chars().take(6).collect();
        format!("{}…", visible)
    }
}
