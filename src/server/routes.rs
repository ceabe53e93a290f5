//! Router configuration for the web server.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Signed search API
        .route("/api/v1/token", post(handlers::issue_token))
        .route("/api/v1/search", post(handlers::search))
        .route("/api/v1/suggest", post(handlers::suggest))
        .route("/api/v1/gdszxsearch", post(handlers::archive_search))
        // Public submissions
        .route("/feedback", post(handlers::submit_feedback))
        .route("/badurl", post(handlers::submit_bad_url))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
