//! API error taxonomy and the JSON envelope every endpoint returns.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::auth::AuthError;
use crate::models::SubmissionError;
use crate::search::{SearchEngineError, ValidationError};

/// Response body shared by all endpoints.
///
/// `success` is `1` or `0`; clients branch on it rather than the HTTP status,
/// which is always 200.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<Value>,
}

impl Envelope {
    pub fn data(data: Value) -> Self {
        Self {
            success: 1,
            message: None,
            data: Some(data),
            related: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: 1,
            message: Some(message.into()),
            data: None,
            related: None,
        }
    }

    pub fn with_related(mut self, related: Value) -> Self {
        self.related = Some(related);
        self
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: 0,
            message: Some(message.into()),
            data: None,
            related: None,
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Everything an endpoint can reject a request with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request headers failed the sanity check")]
    BlockedHeader,
    #[error("client is rate limited")]
    RateLimited,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Search(#[from] SearchEngineError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

const SERVICE_UNAVAILABLE: &str = "服务暂不可用, 请稍后重试";

impl ApiError {
    /// Message shown to the client. Internal detail never leaks.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::BlockedHeader => ":D".to_string(),
            ApiError::RateLimited => "请求太频繁, 请5分钟后尝试".to_string(),
            ApiError::Auth(e) => match e {
                AuthError::StaleTimestamp => "时间戳无效".to_string(),
                AuthError::MalformedTimestamp => "时间戳必须是整数".to_string(),
                AuthError::InvalidCredentials => "授权未通过".to_string(),
                AuthError::InvalidToken => "token 无效".to_string(),
                AuthError::InvalidSignature => "sign 无效".to_string(),
                AuthError::Cache(_) | AuthError::Store(_) => SERVICE_UNAVAILABLE.to_string(),
            },
            ApiError::Validation(e) => e.to_string(),
            ApiError::Search(e) => e.public_message().to_string(),
            ApiError::Submission(SubmissionError::Database(_)) => SERVICE_UNAVAILABLE.to_string(),
            ApiError::Submission(e) => e.to_string(),
        }
    }

    fn log(&self) {
        match self {
            ApiError::Auth(AuthError::Cache(e)) => error!("Token cache failure: {}", e),
            ApiError::Auth(AuthError::Store(e)) => error!("Credential store failure: {}", e),
            ApiError::Search(e) => warn!("Search engine failure: {}", e),
            ApiError::Submission(SubmissionError::Database(e)) => {
                error!("Submission storage failure: {}", e)
            }
            other => debug!("Request rejected: {}", other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        Envelope::failure(self.public_message()).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
