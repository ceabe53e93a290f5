//! Request screening applied before any authentication work.

use std::net::SocketAddr;
use std::sync::LazyLock;

use axum::http::{header, HeaderMap};
use regex::Regex;

static BROWSER_AGENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Windows NT|Mac OS X|Linux|iPhone|Android)").unwrap());

static SITE_REFERER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.(com|cn)").unwrap());

/// Whether the request looks like it came from a browser on a partner site.
///
/// Missing headers count as empty strings and fail the check.
pub fn headers_look_legitimate(headers: &HeaderMap) -> bool {
    let user_agent = header_str(headers, header::USER_AGENT.as_str()).unwrap_or("");
    let referer = header_str(headers, header::REFERER.as_str()).unwrap_or("");
    BROWSER_AGENT.is_match(user_agent) && SITE_REFERER.is_match(referer)
}

/// Client address used for rate limiting and submission cooldowns.
///
/// Prefers `X-Real-Ip` set by the fronting proxy, then the first
/// `X-Forwarded-For` hop, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    if let Some(ip) = header_str(headers, "x-real-ip").map(str::trim) {
        if !ip.is_empty() {
            return Some(ip.to_string());
        }
    }
    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty()) {
            return Some(first.to_string());
        }
    }
    peer.map(|addr| addr.ip().to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
