//! Domain values exchanged between use cases, providers and handlers.
//!
//! Token strings are opaque: they are produced by the identity provider,
//! handed to the client in cookies and forwarded back unchanged.

use serde::{Deserialize, Serialize};
use url::Url;

/// One unit of timeline activity attributed to an author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    /// Display name of the author at the time the entry was fetched
    pub author_name: String,
    /// Unique handle of the author (grouping key)
    pub author_handle: String,
}

impl TimelineEntry {
    pub fn new(author_name: impl Into<String>, author_handle: impl Into<String>) -> Self {
        Self {
            author_name: author_name.into(),
            author_handle: author_handle.into(),
        }
    }
}

/// Number of timeline entries observed for one author.
///
/// Serialized with the field names the frontend expects
/// (`fullName`, `username`, `tweetsCount`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStats {
    /// Name attached to the first entry seen for this handle
    #[serde(rename = "fullName")]
    pub display_name: String,
    /// Author handle, unique within one aggregation result
    #[serde(rename = "username")]
    pub handle: String,
    /// Entries observed for this handle
    #[serde(rename = "tweetsCount")]
    pub count: u32,
}

/// An OAuth1 token and its secret, as returned by the provider.
///
/// Used for both the short-lived request token (pending authorization) and
/// the long-lived access token (session credentials).
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub secret: String,
}

impl TokenPair {
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }
}

// Secrets never end up in logs via `{:?}`
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &self.token)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Outcome of starting a login: where to send the user, and the request
/// secret the client must hold until the callback.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub authorization_url: Url,
    pub request_secret: String,
}

/// Long-lived credentials issued after a successful callback.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    pub access_token: String,
    pub access_secret: String,
}

impl From<TokenPair> for SessionCredentials {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.token,
            access_secret: pair.secret,
        }
    }
}

impl std::fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("access_token", &self.access_token)
            .field("access_secret", &"<redacted>")
            .finish()
    }
}
