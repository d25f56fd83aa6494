//! Shared application state for Axum handlers.
//!
//! Everything here is immutable after startup. The provider collaborators
//! are injected as trait objects so tests can swap in stubs.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::provider::{OAuth1Provider, TimelineSource};
use crate::services::{AuthService, StatsService};

/// Shared application state, cloned into each handler.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// OAuth1 login flow
    pub auth: AuthService,
    /// Timeline aggregation
    pub stats: StatsService,
    /// Timestamp when the application started
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: Config,
        provider: Arc<dyn OAuth1Provider>,
        timeline: Arc<dyn TimelineSource>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            auth: AuthService::new(provider),
            stats: StatsService::new(timeline),
            started_at: Instant::now(),
        }
    }

    /// Get the application uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
