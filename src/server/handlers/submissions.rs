//! Feedback and bad-URL report endpoints.
//!
//! Not part of the signed API: no header check or rate limit, only the
//! per-IP cooldown enforced by the repository.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, RawQuery, State},
    http::HeaderMap,
};

use super::super::error::{ApiResult, Envelope};
use super::super::guard::client_ip;
use super::super::AppState;
use super::{parse_query, peer_addr};
use crate::models::{NewBadUrl, NewFeedback};
use crate::search::params::required;

pub async fn submit_feedback(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> ApiResult<Envelope> {
    let params = parse_query(raw.as_deref());
    let entry = NewFeedback::parse(required(&params, "email")?, required(&params, "content")?)?;
    let ip = client_ip(&headers, peer_addr(connect));

    state
        .submissions
        .submit_feedback(&entry, ip.as_deref(), state.options.feedback_cooldown)
        .await?;
    Ok(Envelope::message("谢谢您的反馈，我们将在处理后回复您! "))
}

pub async fn submit_bad_url(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> ApiResult<Envelope> {
    let params = parse_query(raw.as_deref());
    let report = NewBadUrl::parse(required(&params, "url")?, required(&params, "reason")?)?;
    let ip = client_ip(&headers, peer_addr(connect));

    state
        .submissions
        .submit_bad_url(&report, ip.as_deref(), state.options.bad_url_cooldown)
        .await?;
    Ok(Envelope::message("提交成功, 请耐心等待后台审核"))
}
