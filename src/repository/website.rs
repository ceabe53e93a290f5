//! Website repository.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewWebsiteRecord, WebsiteRecord};
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::{format_datetime, last_insert_id};
use crate::models::Website;
use crate::schema::websites;

/// Repository for tenant websites.
#[derive(Clone)]
pub struct WebsiteRepository {
    pool: AsyncSqlitePool,
}

impl WebsiteRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Register a website. The domain is normalized before storage.
    pub async fn add(&self, name: &str, domain: &str) -> Result<Website, DieselError> {
        let mut conn = self.pool.get().await?;
        let domain = Website::normalize_domain(domain);
        let now = format_datetime(Utc::now());

        diesel::insert_into(websites::table)
            .values(NewWebsiteRecord {
                name,
                domain: &domain,
                created_at: &now,
            })
            .execute(&mut conn)
            .await?;
        let id = last_insert_id(&mut conn).await?;

        websites::table
            .find(id)
            .first::<WebsiteRecord>(&mut conn)
            .await
            .map(Website::from)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Website>, DieselError> {
        let mut conn = self.pool.get().await?;
        websites::table
            .find(id)
            .first::<WebsiteRecord>(&mut conn)
            .await
            .optional()
            .map(|r| r.map(Website::from))
    }

    pub async fn get_by_domain(&self, domain: &str) -> Result<Option<Website>, DieselError> {
        let mut conn = self.pool.get().await?;
        let domain = Website::normalize_domain(domain);
        websites::table
            .filter(websites::domain.eq(&domain))
            .first::<WebsiteRecord>(&mut conn)
            .await
            .optional()
            .map(|r| r.map(Website::from))
    }

    pub async fn list(&self) -> Result<Vec<Website>, DieselError> {
        let mut conn = self.pool.get().await?;
        websites::table
            .order(websites::id.asc())
            .load::<WebsiteRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(Website::from).collect())
    }
}
