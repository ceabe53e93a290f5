//! Query translation and execution against Elasticsearch.
//!
//! Three logical indices are served: general content, the culture archive,
//! and title suggestions. A fourth, `related`, feeds keyword completions.

mod engine;
mod error;
pub mod params;
mod query;
mod translate;

pub use engine::{ElasticsearchEngine, SearchEngine, SharedSearchEngine};
pub use error::SearchEngineError;
pub use params::{QueryParams, ValidationError};
pub use query::SearchQuery;
pub use translate::{
    related_query, ArchiveSearch, ContentSearch, Exclusion, SuggestSearch, ARCHIVE_SCOPE,
    CONTENT_SCOPE,
};

/// Index names used by the search endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNames {
    pub content: String,
    pub archive: String,
    pub suggest: String,
    pub related: String,
}

impl Default for IndexNames {
    fn default() -> Self {
        Self {
            content: "common".to_string(),
            archive: "gdszx".to_string(),
            suggest: "suggest".to_string(),
            related: "related".to_string(),
        }
    }
}
