//! Feedback and bad-URL report repository.
//!
//! Each table enforces a per-IP cooldown: an IP with a record newer than the
//! cooldown window cannot submit again until it passes.

use std::time::Duration;

use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, info};

use super::models::{BadUrlRecord, FeedbackRecord, NewBadUrlRecord, NewFeedbackRecord};
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::{format_datetime, is_unique_violation, last_insert_id};
use crate::models::{BadUrl, Feedback, NewBadUrl, NewFeedback, SubmissionError};
use crate::schema::{bad_urls, feedback};

fn cutoff(cooldown: Duration) -> String {
    let window = chrono::Duration::from_std(cooldown).unwrap_or(chrono::Duration::zero());
    format_datetime(Utc::now() - window)
}

/// Repository for user submissions.
#[derive(Clone)]
pub struct SubmissionRepository {
    pool: AsyncSqlitePool,
}

impl SubmissionRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Store feedback unless `ip` submitted within `cooldown`.
    pub async fn submit_feedback(
        &self,
        entry: &NewFeedback,
        ip: Option<&str>,
        cooldown: Duration,
    ) -> Result<Feedback, SubmissionError> {
        let mut conn = self.pool.get().await?;

        if let Some(ip) = ip {
            let recent: i64 = feedback::table
                .filter(feedback::ip.eq(ip))
                .filter(feedback::created_at.gt(cutoff(cooldown)))
                .select(count_star())
                .first(&mut conn)
                .await?;
            if recent > 0 {
                debug!(ip, "Feedback refused, cooldown active");
                return Err(SubmissionError::TooFrequent);
            }
        }

        let now = format_datetime(Utc::now());
        diesel::insert_into(feedback::table)
            .values(NewFeedbackRecord {
                email: &entry.email,
                content: &entry.content,
                ip,
                checked: false,
                created_at: &now,
            })
            .execute(&mut conn)
            .await?;
        let id = last_insert_id(&mut conn).await?;
        info!(id, "Stored feedback");

        Ok(feedback::table
            .find(id)
            .first::<FeedbackRecord>(&mut conn)
            .await
            .map(Feedback::from)?)
    }

    /// Store a bad-URL report unless `ip` submitted within `cooldown` or
    /// the URL was already reported.
    pub async fn submit_bad_url(
        &self,
        entry: &NewBadUrl,
        ip: Option<&str>,
        cooldown: Duration,
    ) -> Result<BadUrl, SubmissionError> {
        let mut conn = self.pool.get().await?;

        if let Some(ip) = ip {
            let recent: i64 = bad_urls::table
                .filter(bad_urls::ip.eq(ip))
                .filter(bad_urls::created_at.gt(cutoff(cooldown)))
                .select(count_star())
                .first(&mut conn)
                .await?;
            if recent > 0 {
                debug!(ip, "Bad URL report refused, cooldown active");
                return Err(SubmissionError::TooFrequent);
            }
        }

        let now = format_datetime(Utc::now());
        let inserted = diesel::insert_into(bad_urls::table)
            .values(NewBadUrlRecord {
                url: &entry.url,
                reason: &entry.reason,
                ip,
                checked: false,
                created_at: &now,
            })
            .execute(&mut conn)
            .await;
        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(SubmissionError::DuplicateUrl),
            Err(e) => return Err(e.into()),
        }
        let id = last_insert_id(&mut conn).await?;
        info!(id, url = %entry.url, "Stored bad URL report");

        Ok(bad_urls::table
            .find(id)
            .first::<BadUrlRecord>(&mut conn)
            .await
            .map(BadUrl::from)?)
    }

    pub async fn list_feedback(&self, unchecked_only: bool) -> Result<Vec<Feedback>, DieselError> {
        let mut conn = self.pool.get().await?;
        let mut query = feedback::table.order(feedback::id.desc()).into_boxed();
        if unchecked_only {
            query = query.filter(feedback::checked.eq(false));
        }
        query
            .load::<FeedbackRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(Feedback::from).collect())
    }

    pub async fn list_bad_urls(&self, unchecked_only: bool) -> Result<Vec<BadUrl>, DieselError> {
        let mut conn = self.pool.get().await?;
        let mut query = bad_urls::table.order(bad_urls::id.desc()).into_boxed();
        if unchecked_only {
            query = query.filter(bad_urls::checked.eq(false));
        }
        query
            .load::<BadUrlRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(BadUrl::from).collect())
    }

    /// Mark feedback as processed. Returns whether the record exists.
    pub async fn check_feedback(&self, id: i32) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let updated = diesel::update(feedback::table.find(id))
            .set(feedback::checked.eq(true))
            .execute(&mut conn)
            .await?;
        Ok(updated > 0)
    }

    /// Mark a bad-URL report as processed. Returns whether the record exists.
    pub async fn check_bad_url(&self, id: i32) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let updated = diesel::update(bad_urls::table.find(id))
            .set(bad_urls::checked.eq(true))
            .execute(&mut conn)
            .await?;
        Ok(updated > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::DbContext;
    use tempfile::{tempdir, TempDir};

    const THIRTY_MIN: Duration = Duration::from_secs(30 * 60);

    async fn setup() -> (SubmissionRepository, TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        (ctx.submissions(), dir)
    }

    fn feedback_entry() -> NewFeedback {
        NewFeedback::parse("user@example.com", "results are out of date").unwrap()
    }

    #[tokio::test]
    async fn test_feedback_cooldown_is_per_ip() {
        let (repo, _dir) = setup().await;

        let stored = repo
            .submit_feedback(&feedback_entry(), Some("1.1.1.1"), THIRTY_MIN)
            .await
            .unwrap();
        assert!(!stored.checked);
        assert_eq!(stored.ip.as_deref(), Some("1.1.1.1"));

        let err = repo
            .submit_feedback(&feedback_entry(), Some("1.1.1.1"), THIRTY_MIN)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::TooFrequent));

        // A different IP is unaffected by the first IP's record.
        repo.submit_feedback(&feedback_entry(), Some("2.2.2.2"), THIRTY_MIN)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_feedback_cooldown_expires() {
        let (repo, _dir) = setup().await;
        let short = Duration::from_millis(50);

        repo.submit_feedback(&feedback_entry(), Some("1.1.1.1"), short)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        repo.submit_feedback(&feedback_entry(), Some("1.1.1.1"), short)
            .await
            .unwrap();

        assert_eq!(repo.list_feedback(false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_bad_url_duplicate_and_cooldown() {
        let (repo, _dir) = setup().await;
        let report = NewBadUrl::parse("http://example.com/gone", "page is gone").unwrap();
        let five_min = Duration::from_secs(300);

        repo.submit_bad_url(&report, Some("1.1.1.1"), five_min)
            .await
            .unwrap();

        let err = repo
            .submit_bad_url(&report, Some("1.1.1.1"), five_min)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::TooFrequent));

        let err = repo
            .submit_bad_url(&report, Some("3.3.3.3"), five_min)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::DuplicateUrl));
    }

    #[tokio::test]
    async fn test_check_and_filter_unchecked() {
        let (repo, _dir) = setup().await;
        let a = repo
            .submit_feedback(&feedback_entry(), Some("1.1.1.1"), THIRTY_MIN)
            .await
            .unwrap();
        repo.submit_feedback(&feedback_entry(), Some("2.2.2.2"), THIRTY_MIN)
            .await
            .unwrap();

        assert!(repo.check_feedback(a.id).await.unwrap());
        assert!(!repo.check_feedback(a.id + 100).await.unwrap());

        let unchecked = repo.list_feedback(true).await.unwrap();
        assert_eq!(unchecked.len(), 1);
        assert_ne!(unchecked[0].id, a.id);

        let report = NewBadUrl::parse("http://example.com/x1", "broken link").unwrap();
        let stored = repo.submit_bad_url(&report, None, THIRTY_MIN).await.unwrap();
        assert!(repo.check_bad_url(stored.id).await.unwrap());
        assert!(repo.list_bad_urls(true).await.unwrap().is_empty());
        assert_eq!(repo.list_bad_urls(false).await.unwrap().len(), 1);
    }
}
