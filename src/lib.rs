//! sitesearch - multi-tenant site search gateway.
//!
//! Exposes a signed-token JSON API in front of Elasticsearch. Each tenant
//! website holds appkey/appsecret credentials, trades them for short-lived
//! session tokens, and signs every search request. All queries are scoped to
//! the calling website's domain.

pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod models;
pub mod rate_limit;
pub mod repository;
pub mod schema;
pub mod search;
pub mod server;
