//! Signed search endpoints.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, RawQuery, State},
    http::HeaderMap,
};
use serde_json::{json, Value};

use super::super::error::{ApiResult, Envelope};
use super::super::AppState;
use super::{authorize, parse_query, peer_addr, screen};
use crate::search::{related_query, ArchiveSearch, ContentSearch, SuggestSearch};

/// Completion field and result count for related keywords.
const RELATED_FIELD: &str = "suggest";
const RELATED_SIZE: u32 = 6;

/// General content search with related keyword completions.
pub async fn search(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> ApiResult<Envelope> {
    screen(&state, &headers, peer_addr(connect)).await?;
    let params = parse_query(raw.as_deref());
    let tenant = authorize(&state, &params, &["keyword"]).await?;

    let request = ContentSearch::from_params(&params)?;
    let body = request.to_query(&tenant.domain);
    let data = state.engine.search(&state.indices.content, &body).await?;
    let related = related_keywords(&state, &request.keyword).await;

    Ok(Envelope::data(data).with_related(related))
}

/// Title suggestions, top ten.
pub async fn suggest(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> ApiResult<Envelope> {
    screen(&state, &headers, peer_addr(connect)).await?;
    let params = parse_query(raw.as_deref());
    let tenant = authorize(&state, &params, &["keyword"]).await?;

    let request = SuggestSearch::from_params(&params)?;
    let data = state
        .engine
        .search(&state.indices.suggest, &request.to_query(&tenant.domain))
        .await?;

    Ok(Envelope::data(data))
}

/// Culture archive search with facet counts.
pub async fn archive_search(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> ApiResult<Envelope> {
    screen(&state, &headers, peer_addr(connect)).await?;
    let params = parse_query(raw.as_deref());
    let tenant = authorize(&state, &params, &["keyword"]).await?;

    let request = ArchiveSearch::from_params(&params)?;
    let data = state
        .engine
        .search(&state.indices.archive, &request.to_query(&tenant.domain))
        .await?;

    Ok(Envelope::data(data))
}

/// Best-effort keyword completions. Failures yield an empty object.
async fn related_keywords(state: &AppState, keyword: &str) -> Value {
    let body = related_query(keyword, RELATED_FIELD, RELATED_SIZE);
    match state.engine.search(&state.indices.related, &body).await {
        Ok(mut response) => response
            .get_mut("suggest")
            .map(Value::take)
            .unwrap_or_else(|| json!({})),
        Err(e) => {
            tracing::warn!("Related keyword lookup failed: {}", e);
            json!({})
        }
    }
}
