//! Search engine client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::error::SearchEngineError;

/// Executes query bodies against a named index.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Run a `_search` request and return the raw response document.
    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchEngineError>;
}

/// Shared handle to a search engine.
pub type SharedSearchEngine = Arc<dyn SearchEngine>;

/// Elasticsearch over its HTTP API.
#[derive(Clone)]
pub struct ElasticsearchEngine {
    client: Client,
    base_url: String,
}

impl ElasticsearchEngine {
    /// Create a client for the cluster at `base_url` (e.g. `http://127.0.0.1:9200`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SearchEngineError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| SearchEngineError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, index: &str) -> String {
        format!("{}/{}/_search", self.base_url, urlencoding::encode(index))
    }
}

#[async_trait]
impl SearchEngine for ElasticsearchEngine {
    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchEngineError> {
        let url = self.search_url(index);
        debug!("Querying Elasticsearch: {}", url);

        let resp = self.client.post(&url).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchEngineError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| SearchEngineError::InvalidResponse(e.to_string()))?;
        if !value.is_object() {
            return Err(SearchEngineError::InvalidResponse(
                "expected a JSON object".to_string(),
            ));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let engine =
            ElasticsearchEngine::new("http://127.0.0.1:9200/", Duration::from_secs(5)).unwrap();
        assert_eq!(engine.base_url(), "http://127.0.0.1:9200");
        assert_eq!(engine.search_url("common"), "http://127.0.0.1:9200/common/_search");
    }

    #[tokio::test]
    async fn test_unreachable_cluster_is_connection_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let engine =
            ElasticsearchEngine::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = engine
            .search("common", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SearchEngineError::Connection(_) | SearchEngineError::Timeout
        ));
    }
}
