//! Public feedback and bad-URL reports.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s.][^@\s]*\.[^@\s]+$").unwrap());

/// Rejected or refused submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("{field} 长度必须在{min}到{max}个字符之间")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },
    #[error("{0} 不是有效的邮箱地址")]
    InvalidEmail(&'static str),
    #[error("提交太频繁了, 请稍候重试")]
    TooFrequent,
    #[error("该链接已经提交过了, 请耐心等待后台审核")]
    DuplicateUrl,
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), SubmissionError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(SubmissionError::Length { field, min, max });
    }
    Ok(())
}

/// Stored feedback message.
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub id: i32,
    pub email: String,
    pub content: String,
    pub ip: Option<String>,
    pub checked: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated feedback awaiting storage.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub email: String,
    pub content: String,
}

impl NewFeedback {
    /// Validate user input. Both fields are trimmed first.
    pub fn parse(email: &str, content: &str) -> Result<Self, SubmissionError> {
        let email = email.trim();
        let content = content.trim();
        check_length("email", email, 5, 64)?;
        if !EMAIL_SHAPE.is_match(email) {
            return Err(SubmissionError::InvalidEmail("email"));
        }
        check_length("content", content, 10, 500)?;
        Ok(Self {
            email: email.to_string(),
            content: content.to_string(),
        })
    }
}

/// Stored bad-URL report.
#[derive(Debug, Clone, Serialize)]
pub struct BadUrl {
    pub id: i32,
    pub url: String,
    pub reason: String,
    pub ip: Option<String>,
    pub checked: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated bad-URL report awaiting storage.
#[derive(Debug, Clone)]
pub struct NewBadUrl {
    pub url: String,
    pub reason: String,
}

impl NewBadUrl {
    pub fn parse(url: &str, reason: &str) -> Result<Self, SubmissionError> {
        let url = url.trim();
        let reason = reason.trim();
        check_length("reason", reason, 5, 100)?;
        check_length("url", url, 10, 500)?;
        Ok(Self {
            url: url.to_string(),
            reason: reason.to_string(),
        })
    }
}
