mod api;
mod entities;

pub use api::{HealthResponse, StatsResponse};
pub use entities::{AuthorStats, LoginResult, SessionCredentials, TimelineEntry, TokenPair};
