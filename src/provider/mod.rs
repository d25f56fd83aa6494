//! Identity provider and timeline capabilities.
//!
//! The use cases never talk HTTP themselves. They are written against two
//! small capability traits, injected at construction:
//!
//! - [`OAuth1Provider`]: the three legs of the OAuth1 handshake plus
//!   callback parsing
//! - [`TimelineSource`]: fetch the signed-in user's recent timeline
//!
//! [`twitter::TwitterClient`] implements both against the real API;
//! `mock` provides in-memory doubles for tests (enabled by the `testing`
//! feature outside this crate's own unit tests).
//!
//! ```text
//! AuthService ──► OAuth1Provider ──┐
//!                                  ├─► TwitterClient ─► reqwest (signed, timeout)
//! StatsService ─► TimelineSource ──┘
//! ```

use async_trait::async_trait;
use axum::http::Uri;
use url::Url;

use crate::error::AppResult;
use crate::models::{TimelineEntry, TokenPair};

#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod oauth1;
pub mod twitter;

pub use oauth1::ConsumerCredentials;
pub use twitter::{TwitterClient, TwitterEndpoints};

/// Values the provider appends to the callback URL after the user approves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    /// The request token the user just authorized
    pub request_token: String,
    /// One-time verifier proving the authorization
    pub verifier: String,
}

/// The OAuth1 capabilities the login flow depends on.
///
/// All failures are reported as `AppError::Upstream`, except argument
/// checks which may report `AppError::Validation`.
#[async_trait]
pub trait OAuth1Provider: Send + Sync {
    /// Obtain a temporary request token (leg one).
    async fn request_token(&self) -> AppResult<TokenPair>;

    /// Build the URL the user visits to approve the request token (leg two).
    fn authorization_url(&self, request_token: &str) -> AppResult<Url>;

    /// Exchange an authorized request token for access credentials (leg three).
    async fn access_token(
        &self,
        request_token: &str,
        request_secret: &str,
        verifier: &str,
    ) -> AppResult<TokenPair>;

    /// Recover the request token and verifier from the callback request.
    fn parse_callback(&self, uri: &Uri) -> AppResult<CallbackParams>;
}

/// Source of the signed-in user's timeline.
#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// Fetch a bounded list of recent timeline entries, newest first.
    async fn fetch_timeline(
        &self,
        access_token: &str,
        access_secret: &str,
    ) -> AppResult<Vec<TimelineEntry>>;
}
