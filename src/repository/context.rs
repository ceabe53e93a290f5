//! Database context for managing connections and repository access.

use std::path::Path;

use diesel_async::SimpleAsyncConnection;

use super::credential::CredentialRepository;
use super::pool::{AsyncSqlitePool, DieselError};
use super::submission::SubmissionRepository;
use super::website::WebsiteRepository;

/// Entry point for database operations.
///
/// Create one context per command or server, then use it to access the
/// repositories.
#[derive(Clone, Debug)]
pub struct DbContext {
    pool: AsyncSqlitePool,
}

impl DbContext {
    /// Create a context from a database URL (`sqlite:path` or a file path).
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: AsyncSqlitePool::new(database_url),
        }
    }

    pub fn from_path(db_path: &Path) -> Self {
        Self {
            pool: AsyncSqlitePool::from_path(db_path),
        }
    }

    pub fn pool(&self) -> &AsyncSqlitePool {
        &self.pool
    }

    pub fn websites(&self) -> WebsiteRepository {
        WebsiteRepository::new(self.pool.clone())
    }

    pub fn credentials(&self) -> CredentialRepository {
        CredentialRepository::new(self.pool.clone())
    }

    pub fn submissions(&self) -> SubmissionRepository {
        SubmissionRepository::new(self.pool.clone())
    }

    /// Create all tables if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(
            r#"
            CREATE TABLE IF NOT EXISTS websites (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                domain TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS credentials (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                appkey TEXT NOT NULL UNIQUE,
                appsecret TEXT NOT NULL,
                description TEXT NOT NULL UNIQUE,
                website_id INTEGER NOT NULL,
                frequency_limit INTEGER NOT NULL DEFAULT 40,
                created_at TEXT NOT NULL,
                FOREIGN KEY (website_id) REFERENCES websites(id)
            );

            CREATE TABLE IF NOT EXISTS feedback (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL,
                content TEXT NOT NULL,
                ip TEXT,
                checked BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS bad_urls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL UNIQUE,
                reason TEXT NOT NULL,
                ip TEXT,
                checked BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_credentials_website ON credentials(website_id);
            CREATE INDEX IF NOT EXISTS idx_feedback_ip_created ON feedback(ip, created_at);
            CREATE INDEX IF NOT EXISTS idx_bad_urls_ip_created ON bad_urls(ip, created_at);
            "#,
        )
        .await
    }
}
