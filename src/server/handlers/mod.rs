//! HTTP request handlers for the web server.

mod api;
mod search;
mod submissions;

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::HeaderMap;

use super::error::{ApiError, ApiResult};
use super::guard;
use super::AppState;
use crate::auth::{SignedRequest, Tenant};
use crate::search::params::required;
use crate::search::QueryParams;

pub use api::{health, issue_token};
pub use search::{archive_search, search, suggest};
pub use submissions::{submit_bad_url, submit_feedback};

/// Decode the query string. Undecodable bytes are replaced, never rejected.
fn parse_query(raw: Option<&str>) -> QueryParams {
    raw.map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn peer_addr(connect: Option<ConnectInfo<SocketAddr>>) -> Option<SocketAddr> {
    connect.map(|ConnectInfo(addr)| addr)
}

/// Header check and rate limit shared by every `/api/v1` endpoint.
async fn screen(state: &AppState, headers: &HeaderMap, peer: Option<SocketAddr>) -> ApiResult<()> {
    if state.options.check_headers && !guard::headers_look_legitimate(headers) {
        return Err(ApiError::BlockedHeader);
    }

    match guard::client_ip(headers, peer) {
        Some(ip) => {
            if !state.limiter.check(&ip).await.is_allowed() {
                return Err(ApiError::RateLimited);
            }
        }
        None => tracing::debug!("No client address available, skipping rate limit"),
    }
    Ok(())
}

/// Check presence of the signed fields plus `extra`, then verify the signature.
async fn authorize(state: &AppState, params: &QueryParams, extra: &[&str]) -> ApiResult<Tenant> {
    let request = SignedRequest {
        timestamp: required(params, "_")?,
        appkey: required(params, "appkey")?,
        token: required(params, "token")?,
        sign: required(params, "sign")?,
    };
    for field in extra {
        required(params, field)?;
    }
    Ok(state.gate.verify(request).await?)
}
