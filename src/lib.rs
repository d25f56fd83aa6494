//! # Tweeters Stats
//!
//! A small web backend that signs users in with Twitter (OAuth 1.0a), reads
//! their home timeline and ranks the authors in it by tweet count.
//!
//! - **OAuth1 login**: request token → user authorization → access token,
//!   with all credentials held client-side in cookies
//! - **Stats**: per-author counts over the home timeline, most active first
//! - **Pipeline**: access log, panic recovery, security/CORS headers and
//!   CSRF enforcement around every request
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Pipeline (log → recover → headers → CORS → CSRF)           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (home, login, callback, logout, stats, health)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Services (AuthService, StatsService)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Providers (OAuth1Provider, TimelineSource)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Twitter API (signed OAuth 1.0a requests)                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tweeters_stats::{AppState, Config, TwitterClient, build_router};
//!
//! # fn main() -> Result<(), tweeters_stats::AppError> {
//! let config = Config::from_env()?;
//! let twitter = Arc::new(TwitterClient::new(&config)?);
//!
//! let state = AppState::new(config, twitter.clone(), twitter);
//! let app = build_router(state);
//! // Serve `app` with axum::serve...
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod provider;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
pub mod validation;

// Re-exports for convenience
pub use config::Config;
pub use error::{AppError, AppResult};
pub use provider::TwitterClient;
pub use routes::build_router;
pub use state::AppState;
