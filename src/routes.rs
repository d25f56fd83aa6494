//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │     Pipeline     │ ← access log, panic → 500, security/CORS headers,
//! └────────┬─────────┘   CSRF → 403, OPTIONS short-circuit
//!          │
//!          ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← request spans
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │     Cookies      │ ← credential cookies in and out
//! └────────┬─────────┘
//!          │
//!          ▼
//!      Handler
//! ```
//!
//! # Routes
//!
//! - `GET /` - homepage document
//! - `GET /health` - health probe
//! - `GET /login/twitter` - start OAuth1 login
//! - `GET /oauth/twitter/callback` - OAuth1 callback
//! - `DELETE /logout` - clear credential cookies
//! - `GET /tweeters-stats` - per-author timeline stats

use axum::Router;
use axum::routing::{delete, get};
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;
use crate::middleware::{PipelineConfig, PipelineLayer};
use crate::state::AppState;

/// Path of the statistics endpoint.
pub const STATS_PATH: &str = "/tweeters-stats";

/// Build the router with the pipeline writing access logs through `tracing`.
pub fn build_router(state: AppState) -> Router {
    let pipeline = PipelineConfig::from_config(&state.config);
    build_router_with(state, pipeline)
}

/// Build the router with an explicit pipeline configuration.
pub fn build_router_with(state: AppState, pipeline: PipelineConfig) -> Router {
    info!(
        origin = %state.config.canonical_origin(),
        cors_domain = state.config.cors_domain.as_deref().unwrap_or("-"),
        "Request pipeline configured"
    );

    Router::new()
        .route("/", get(handlers::homepage))
        .route("/health", get(handlers::health_check))
        .route("/login/twitter", get(handlers::login))
        .route("/oauth/twitter/callback", get(handlers::oauth_callback))
        .route("/logout", delete(handlers::logout))
        .route(STATS_PATH, get(handlers::tweeters_stats))
        // Applied bottom to top: the pipeline is outermost
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PipelineLayer::new(pipeline))
        .with_state(state)
}
