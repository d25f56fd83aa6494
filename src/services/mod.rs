//! Use cases: the OAuth1 login flow and timeline aggregation.
//!
//! Services hold their collaborators behind capability traits and are cheap
//! to clone into every handler. They return explicit `AppResult`s; turning
//! a failure into a redirect or status code is the handler's job.

mod auth;
mod stats;

pub use auth::{AuthService, LoginStage};
pub use stats::{StatsService, aggregate};
