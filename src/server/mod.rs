//! HTTP gateway for the search API.
//!
//! Every `/api/v1` request passes through the same gate:
//! header sanity check, per-IP rate limit, required parameters,
//! timestamp window, session token, signature, then parameter validation.

mod error;
mod guard;
mod handlers;
mod routes;

pub use error::{ApiError, ApiResult, Envelope};
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthGate, SharedCredentialStore};
use crate::cache;
use crate::config::Settings;
use crate::rate_limit::RateLimiter;
use crate::repository::SubmissionRepository;
use crate::search::{ElasticsearchEngine, IndexNames, SharedSearchEngine};

/// Per-deployment switches read by the handlers.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub check_headers: bool,
    pub feedback_cooldown: Duration,
    pub bad_url_cooldown: Duration,
}

impl ServerOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            check_headers: settings.check_headers,
            feedback_cooldown: settings.feedback_cooldown(),
            bad_url_cooldown: settings.bad_url_cooldown(),
        }
    }
}

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub gate: AuthGate,
    pub limiter: RateLimiter,
    pub engine: SharedSearchEngine,
    pub submissions: SubmissionRepository,
    pub indices: Arc<IndexNames>,
    pub options: ServerOptions,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let ctx = settings.create_db_context();
        let cache =
            cache::connect(settings.cache_backend.as_deref(), settings.cache_timeout()).await?;
        let credentials: SharedCredentialStore = Arc::new(ctx.credentials());

        let gate = AuthGate::new(credentials, cache.clone())
            .with_issue_policy(settings.token_timestamp_policy)
            .with_verify_policy(settings.search_timestamp_policy)
            .with_token_ttl(settings.token_ttl());
        let limiter = RateLimiter::with_config(cache, settings.rate_limit_config());
        let engine: SharedSearchEngine = Arc::new(ElasticsearchEngine::new(
            &settings.elasticsearch_url,
            settings.search_timeout(),
        )?);

        Ok(Self {
            gate,
            limiter,
            engine,
            submissions: ctx.submissions(),
            indices: Arc::new(settings.indices.clone()),
            options: ServerOptions::from_settings(settings),
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;
    let app = create_router(state);

    let addr: SocketAddr = bind.parse()?;
    tracing::info!(
        "Starting server at http://{} (search backend {})",
        addr,
        settings.elasticsearch_url
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
