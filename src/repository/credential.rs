//! API credential repository.
//!
//! Also serves as the durable [`CredentialStore`] behind the auth gate.

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{CredentialRecord, NewCredentialRecord, WebsiteRecord};
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::{format_datetime, last_insert_id};
use crate::auth::{AuthError, AuthResult, CredentialStore};
use crate::models::{Credential, Website};
use crate::schema::{credentials, websites};

/// Repository for API credentials.
#[derive(Clone)]
pub struct CredentialRepository {
    pool: AsyncSqlitePool,
}

impl CredentialRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Issue a new credential with freshly generated keys.
    pub async fn issue(
        &self,
        website_id: i32,
        description: &str,
        frequency_limit: i32,
    ) -> Result<Credential, DieselError> {
        let (appkey, appsecret) = Credential::generate_keys();
        let mut conn = self.pool.get().await?;
        let now = format_datetime(Utc::now());

        diesel::insert_into(credentials::table)
            .values(NewCredentialRecord {
                appkey: &appkey,
                appsecret: &appsecret,
                description,
                website_id,
                frequency_limit,
                created_at: &now,
            })
            .execute(&mut conn)
            .await?;
        let id = last_insert_id(&mut conn).await?;

        credentials::table
            .find(id)
            .first::<CredentialRecord>(&mut conn)
            .await
            .map(Credential::from)
    }

    pub async fn find_by_appkey(&self, appkey: &str) -> Result<Option<Credential>, DieselError> {
        let mut conn = self.pool.get().await?;
        credentials::table
            .filter(credentials::appkey.eq(appkey))
            .first::<CredentialRecord>(&mut conn)
            .await
            .optional()
            .map(|r| r.map(Credential::from))
    }

    /// All credentials with their owning website.
    pub async fn list(&self) -> Result<Vec<(Credential, Website)>, DieselError> {
        let mut conn = self.pool.get().await?;
        credentials::table
            .inner_join(websites::table)
            .order(credentials::id.asc())
            .select((CredentialRecord::as_select(), WebsiteRecord::as_select()))
            .load::<(CredentialRecord, WebsiteRecord)>(&mut conn)
            .await
            .map(|rows| {
                rows.into_iter()
                    .map(|(c, w)| (Credential::from(c), Website::from(w)))
                    .collect()
            })
    }

    /// Delete a credential. Returns whether it existed.
    ///
    /// A live session token keeps passing the token check until it expires,
    /// but requests fail because the domain lookup no longer resolves.
    pub async fn revoke(&self, appkey: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(credentials::table.filter(credentials::appkey.eq(appkey)))
            .execute(&mut conn)
            .await?;
        Ok(deleted > 0)
    }

    pub async fn matches(&self, appkey: &str, appsecret: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let count: i64 = credentials::table
            .filter(credentials::appkey.eq(appkey))
            .filter(credentials::appsecret.eq(appsecret))
            .select(count_star())
            .first(&mut conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn website_domain(&self, appkey: &str) -> Result<Option<String>, DieselError> {
        let mut conn = self.pool.get().await?;
        credentials::table
            .inner_join(websites::table)
            .filter(credentials::appkey.eq(appkey))
            .select(websites::domain)
            .first::<String>(&mut conn)
            .await
            .optional()
    }
}

#[async_trait]
impl CredentialStore for CredentialRepository {
    async fn authenticate(&self, appkey: &str, appsecret: &str) -> AuthResult<bool> {
        self.matches(appkey, appsecret)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))
    }

    async fn domain_for(&self, appkey: &str) -> AuthResult<Option<String>> {
        self.website_domain(appkey)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_FREQUENCY_LIMIT;
    use crate::repository::util::is_unique_violation;
    use crate::repository::DbContext;
    use tempfile::{tempdir, TempDir};

    async fn setup() -> (DbContext, i32, TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        let site = ctx.websites().add("Example", "example.com").await.unwrap();
        (ctx, site.id, dir)
    }

    #[tokio::test]
    async fn test_issue_and_authenticate() {
        let (ctx, site_id, _dir) = setup().await;
        let repo = ctx.credentials();

        let cred = repo
            .issue(site_id, "mobile app", DEFAULT_FREQUENCY_LIMIT)
            .await
            .unwrap();
        assert_eq!(cred.appkey.len(), 32);
        assert_eq!(cred.frequency_limit, 40);

        assert!(repo.authenticate(&cred.appkey, &cred.appsecret).await.unwrap());
        assert!(!repo.authenticate(&cred.appkey, "wrong").await.unwrap());
        assert!(!repo.authenticate("missing", &cred.appsecret).await.unwrap());

        assert_eq!(
            repo.domain_for(&cred.appkey).await.unwrap().as_deref(),
            Some("example.com")
        );
        assert_eq!(repo.domain_for("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_description_is_unique() {
        let (ctx, site_id, _dir) = setup().await;
        let repo = ctx.credentials();

        repo.issue(site_id, "web", 40).await.unwrap();
        let err = repo.issue(site_id, "web", 40).await.unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_unknown_website_is_rejected() {
        let (ctx, site_id, _dir) = setup().await;
        assert!(ctx.credentials().issue(site_id + 42, "x", 40).await.is_err());
    }

    #[tokio::test]
    async fn test_list_and_revoke() {
        let (ctx, site_id, _dir) = setup().await;
        let repo = ctx.credentials();
        let a = repo.issue(site_id, "a", 40).await.unwrap();
        repo.issue(site_id, "b", 10).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].1.domain, "example.com");
        assert_eq!(listed[1].0.frequency_limit, 10);

        assert!(repo.revoke(&a.appkey).await.unwrap());
        assert!(!repo.revoke(&a.appkey).await.unwrap());
        assert!(repo.find_by_appkey(&a.appkey).await.unwrap().is_none());
        assert_eq!(repo.domain_for(&a.appkey).await.unwrap(), None);
    }
}
