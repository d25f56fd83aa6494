use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AuthorStats;

/// Body of a successful `GET /tweeters-stats` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Per-author statistics, most active author first
    pub data: Vec<AuthorStats>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process is serving requests
    pub status: String,
    /// Crate version
    pub version: String,
    /// Response timestamp
    pub timestamp: DateTime<Utc>,
    /// Seconds since the application state was created
    pub uptime_seconds: u64,
}
