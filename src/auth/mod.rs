//! Request authentication for the public API.
//!
//! Clients exchange an appkey/appsecret pair for a short-lived session token,
//! then sign each request with `SHA256("{timestamp},{token},{appkey}")`.

mod gate;
pub mod signing;
mod timestamp;

pub use gate::{
    AuthGate, CredentialStore, IssuedToken, SharedCredentialStore, SignedRequest, Tenant,
    DEFAULT_TOKEN_TTL,
};
pub use timestamp::TimestampPolicy;

use crate::cache::CacheError;

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("timestamp outside the accepted window")]
    StaleTimestamp,
    #[error("timestamp is not an integer")]
    MalformedTimestamp,
    #[error("unknown appkey/appsecret pair")]
    InvalidCredentials,
    #[error("session token missing or mismatched")]
    InvalidToken,
    #[error("request signature mismatch")]
    InvalidSignature,
    #[error("token cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("credential store error: {0}")]
    Store(String),
}
