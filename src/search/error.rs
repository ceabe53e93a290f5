//! Search engine failures.

/// Errors from executing a query against the search engine.
///
/// Details are for logs; clients only ever see [`SearchEngineError::public_message`].
#[derive(Debug, thiserror::Error)]
pub enum SearchEngineError {
    #[error("search engine request timed out")]
    Timeout,
    #[error("search engine unreachable: {0}")]
    Connection(String),
    #[error("search engine rejected query with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("invalid search engine response: {0}")]
    InvalidResponse(String),
}

impl SearchEngineError {
    /// Generic client-facing message for this failure class.
    pub fn public_message(&self) -> &'static str {
        match self {
            SearchEngineError::Timeout => "搜索超时, 请稍后重试",
            SearchEngineError::Connection(_) => "搜索服务暂不可用",
            SearchEngineError::Rejected { .. } => "搜索请求无法处理",
            SearchEngineError::InvalidResponse(_) => "搜索服务返回异常",
        }
    }
}

impl From<reqwest::Error> for SearchEngineError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchEngineError::Timeout
        } else if e.is_decode() {
            SearchEngineError::InvalidResponse(e.to_string())
        } else {
            SearchEngineError::Connection(e.to_string())
        }
    }
}
