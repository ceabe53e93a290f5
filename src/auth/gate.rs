//! Token issuance and per-request verification.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::signing::{derive_token, verify_signature};
use super::timestamp::TimestampPolicy;
use super::{AuthError, AuthResult};
use crate::cache::BoxedCacheBackend;

/// Default session token lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(1800);

/// Durable lookup of API credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Whether an exact appkey/appsecret pair exists.
    async fn authenticate(&self, appkey: &str, appsecret: &str) -> AuthResult<bool>;

    /// Domain of the website owning `appkey`, if the credential exists.
    async fn domain_for(&self, appkey: &str) -> AuthResult<Option<String>>;
}

/// Shared handle to a credential store.
pub type SharedCredentialStore = Arc<dyn CredentialStore>;

/// Token handed back by `/api/v1/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    /// Remaining lifetime in seconds.
    pub expires: u64,
}

/// Identity established by a verified request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub appkey: String,
    /// Tenancy discriminator applied to every search.
    pub domain: String,
}

/// Signed request fields, as received.
#[derive(Debug, Clone, Copy)]
pub struct SignedRequest<'a> {
    pub timestamp: &'a str,
    pub appkey: &'a str,
    pub token: &'a str,
    pub sign: &'a str,
}

/// Validates timestamps, issues session tokens and verifies signatures.
#[derive(Clone)]
pub struct AuthGate {
    credentials: SharedCredentialStore,
    cache: BoxedCacheBackend,
    /// Tolerance for token requests.
    issue_policy: TimestampPolicy,
    /// Tolerance for signed API requests.
    verify_policy: TimestampPolicy,
    token_ttl: Duration,
}

impl AuthGate {
    pub fn new(credentials: SharedCredentialStore, cache: BoxedCacheBackend) -> Self {
        Self {
            credentials,
            cache,
            issue_policy: TimestampPolicy::default(),
            verify_policy: TimestampPolicy::default(),
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Use one tolerance for token requests and signed requests alike.
    pub fn with_policy(mut self, policy: TimestampPolicy) -> Self {
        self.issue_policy = policy;
        self.verify_policy = policy;
        self
    }

    pub fn with_issue_policy(mut self, policy: TimestampPolicy) -> Self {
        self.issue_policy = policy;
        self
    }

    pub fn with_verify_policy(mut self, policy: TimestampPolicy) -> Self {
        self.verify_policy = policy;
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn issue_policy(&self) -> TimestampPolicy {
        self.issue_policy
    }

    pub fn verify_policy(&self) -> TimestampPolicy {
        self.verify_policy
    }

    fn token_key(appkey: &str) -> String {
        format!("token:{}", appkey)
    }

    /// Issue a session token, reusing the live one if present.
    pub async fn issue_token(
        &self,
        timestamp: &str,
        appkey: &str,
        appsecret: &str,
    ) -> AuthResult<IssuedToken> {
        let ts = self.issue_policy.check(timestamp)?;

        if !self.credentials.authenticate(appkey, appsecret).await? {
            debug!(appkey, "Token request with unknown credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let key = Self::token_key(appkey);
        let token = match self.cache.get(&key).await? {
            Some(existing) => existing,
            None => {
                let fresh = derive_token(appkey, ts);
                if self.cache.set_nx_ex(&key, &fresh, self.token_ttl).await? {
                    info!(appkey, "Issued new session token");
                    fresh
                } else {
                    // A concurrent request stored its token first; hand out that one.
                    match self.cache.get(&key).await? {
                        Some(winner) => winner,
                        None => {
                            // The winner's token already expired.
                            self.cache.set_ex(&key, &fresh, self.token_ttl).await?;
                            info!(appkey, "Issued new session token");
                            fresh
                        }
                    }
                }
            }
        };

        let remaining = self.cache.ttl(&key).await?.unwrap_or(self.token_ttl);
        Ok(IssuedToken {
            token,
            expires: ceil_secs(remaining),
        })
    }

    /// Verify a signed request and resolve its tenant.
    pub async fn verify(&self, request: SignedRequest<'_>) -> AuthResult<Tenant> {
        let ts = self.verify_policy.check(request.timestamp)?;

        let stored = self.cache.get(&Self::token_key(request.appkey)).await?;
        match stored {
            Some(ref token) if token == request.token => {}
            _ => {
                debug!(appkey = request.appkey, "Missing or mismatched session token");
                return Err(AuthError::InvalidToken);
            }
        }

        if !verify_signature(ts, request.token, request.appkey, request.sign) {
            debug!(appkey = request.appkey, "Signature mismatch");
            return Err(AuthError::InvalidSignature);
        }

        match self.credentials.domain_for(request.appkey).await? {
            Some(domain) => Ok(Tenant {
                appkey: request.appkey.to_string(),
                domain,
            }),
            None => {
                warn!(
                    appkey = request.appkey,
                    "Live token for a credential that no longer exists"
                );
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_millis().div_ceil(1000) as u64
}
