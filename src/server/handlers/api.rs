//! Health and token endpoints.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, RawQuery, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};

use super::super::error::{ApiResult, Envelope};
use super::super::AppState;
use super::{parse_query, peer_addr, screen};
use crate::search::params::required;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Exchange an appkey/appsecret pair for a session token.
pub async fn issue_token(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> ApiResult<Envelope> {
    screen(&state, &headers, peer_addr(connect)).await?;

    let params = parse_query(raw.as_deref());
    let timestamp = required(&params, "_")?;
    let appkey = required(&params, "appkey")?;
    let appsecret = required(&params, "appsecret")?;

    let issued = state.gate.issue_token(timestamp, appkey, appsecret).await?;
    Ok(Envelope::data(serde_json::json!({
        "token": issued.token,
        "expires": issued.expires,
    })))
}
