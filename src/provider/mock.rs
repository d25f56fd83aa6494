//! In-memory provider doubles for unit and integration tests.
//!
//! Each stub returns canned results and counts calls, so tests can assert
//! both what a use case returned and which collaborators it touched.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::http::Uri;
use url::Url;

use super::twitter::parse_callback_query;
use super::{CallbackParams, OAuth1Provider, TimelineSource};
use crate::error::{AppError, AppResult};
use crate::models::{TimelineEntry, TokenPair};

/// Canned OAuth1 provider. `None` fields fail with `AppError::Upstream`.
#[derive(Debug)]
pub struct StubProvider {
    pub request_token: Option<TokenPair>,
    pub authorization_url: Option<Url>,
    pub access_token: Option<TokenPair>,
    /// Parse the real callback query when `true`; fail when `false`
    pub callback_parses: bool,
    request_token_calls: AtomicUsize,
    authorization_url_calls: AtomicUsize,
    access_token_calls: AtomicUsize,
    last_exchange: Mutex<Option<(String, String, String)>>,
}

impl StubProvider {
    /// A provider where every leg succeeds.
    pub fn succeeding() -> Self {
        Self {
            request_token: Some(TokenPair::new("request-token", "request-secret")),
            authorization_url: Url::parse(
                "https://provider.example/oauth/authorize?oauth_token=request-token",
            )
            .ok(),
            access_token: Some(TokenPair::new("access-token", "access-secret")),
            callback_parses: true,
            request_token_calls: AtomicUsize::new(0),
            authorization_url_calls: AtomicUsize::new(0),
            access_token_calls: AtomicUsize::new(0),
            last_exchange: Mutex::new(None),
        }
    }

    pub fn without_request_token(mut self) -> Self {
        self.request_token = None;
        self
    }

    pub fn without_authorization_url(mut self) -> Self {
        self.authorization_url = None;
        self
    }

    pub fn without_access_token(mut self) -> Self {
        self.access_token = None;
        self
    }

    pub fn with_unparseable_callback(mut self) -> Self {
        self.callback_parses = false;
        self
    }

    pub fn request_token_calls(&self) -> usize {
        self.request_token_calls.load(Ordering::SeqCst)
    }

    pub fn authorization_url_calls(&self) -> usize {
        self.authorization_url_calls.load(Ordering::SeqCst)
    }

    pub fn access_token_calls(&self) -> usize {
        self.access_token_calls.load(Ordering::SeqCst)
    }

    /// Arguments of the most recent `access_token` call.
    pub fn last_exchange(&self) -> Option<(String, String, String)> {
        self.last_exchange.lock().ok().and_then(|guard| guard.clone())
    }
}

impl Default for StubProvider {
    fn default() -> Self {
        Self::succeeding()
    }
}

#[async_trait]
impl OAuth1Provider for StubProvider {
    async fn request_token(&self) -> AppResult<TokenPair> {
        self.request_token_calls.fetch_add(1, Ordering::SeqCst);
        self.request_token
            .clone()
            .ok_or_else(|| AppError::Upstream("stub: request token rejected".to_string()))
    }

    fn authorization_url(&self, _request_token: &str) -> AppResult<Url> {
        self.authorization_url_calls.fetch_add(1, Ordering::SeqCst);
        self.authorization_url
            .clone()
            .ok_or_else(|| AppError::Upstream("stub: authorization URL unavailable".to_string()))
    }

    async fn access_token(
        &self,
        request_token: &str,
        request_secret: &str,
        verifier: &str,
    ) -> AppResult<TokenPair> {
        self.access_token_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_exchange.lock() {
            *last = Some((
                request_token.to_string(),
                request_secret.to_string(),
                verifier.to_string(),
            ));
        }
        self.access_token
            .clone()
            .ok_or_else(|| AppError::Upstream("stub: verifier rejected".to_string()))
    }

    fn parse_callback(&self, uri: &Uri) -> AppResult<CallbackParams> {
        if !self.callback_parses {
            return Err(AppError::Upstream("stub: callback unparseable".to_string()));
        }
        parse_callback_query(uri.query().unwrap_or_default())
    }
}

/// Canned timeline. `None` fails with `AppError::Upstream`.
#[derive(Debug)]
pub struct StubTimeline {
    pub entries: Option<Vec<TimelineEntry>>,
    calls: AtomicUsize,
    last_credentials: Mutex<Option<(String, String)>>,
}

impl StubTimeline {
    pub fn with_entries(entries: Vec<TimelineEntry>) -> Self {
        Self {
            entries: Some(entries),
            calls: AtomicUsize::new(0),
            last_credentials: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            entries: None,
            calls: AtomicUsize::new(0),
            last_credentials: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Credentials passed to the most recent fetch.
    pub fn last_credentials(&self) -> Option<(String, String)> {
        self.last_credentials.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl TimelineSource for StubTimeline {
    async fn fetch_timeline(
        &self,
        access_token: &str,
        access_secret: &str,
    ) -> AppResult<Vec<TimelineEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_credentials.lock() {
            *last = Some((access_token.to_string(), access_secret.to_string()));
        }
        self.entries
            .clone()
            .ok_or_else(|| AppError::Upstream("stub: timeline unavailable".to_string()))
    }
}
