//! OAuth1 login flow.
//!
//! # Per-attempt state machine
//!
//! ```text
//! Init ──request_token──► RequestTokenObtained ──authorization_url──► AwaitingCallback
//!   │                          │                                           │
//!   └──────────────────────────┴────────────► Failed ◄─────────────────────┤
//!                                                                          ▼
//!                                           access_token ◄── parse_callback
//!                                                │
//!                                                ▼
//!                                            Completed
//! ```
//!
//! The server keeps no state between the two halves. The request secret
//! travels in a cookie from `start_login` to `complete_callback`, and the
//! provider's verifier vouches for the rest.

use std::fmt;
use std::sync::Arc;

use axum::http::Uri;
use tracing::{debug, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::models::{LoginResult, SessionCredentials};
use crate::provider::OAuth1Provider;

/// Where a login attempt is, used to label failures in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    Init,
    RequestTokenObtained,
    AwaitingCallback,
    Completed,
}

impl fmt::Display for LoginStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoginStage::Init => "init",
            LoginStage::RequestTokenObtained => "request_token_obtained",
            LoginStage::AwaitingCallback => "awaiting_callback",
            LoginStage::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Runs both halves of the OAuth1 handshake against an injected provider.
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn OAuth1Provider>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn OAuth1Provider>) -> Self {
        Self { provider }
    }

    /// Start a login: obtain a request token and the URL to send the user to.
    ///
    /// # Errors
    ///
    /// `AppError::Upstream` if either provider call fails. There is no
    /// partial result: a request token without an authorization URL is
    /// useless to the caller.
    #[instrument(skip(self))]
    pub async fn start_login(&self) -> AppResult<LoginResult> {
        let pending = self
            .provider
            .request_token()
            .await
            .map_err(|e| failed(LoginStage::Init, e))?;

        let authorization_url = self
            .provider
            .authorization_url(&pending.token)
            .map_err(|e| failed(LoginStage::RequestTokenObtained, e))?;

        debug!(stage = %LoginStage::AwaitingCallback, "Login started");
        Ok(LoginResult {
            authorization_url,
            request_secret: pending.secret,
        })
    }

    /// Finish a login: exchange the provider's verifier for session credentials.
    ///
    /// `request_secret` is the value the client kept since `start_login`;
    /// `request` is the callback request the provider redirected back with.
    ///
    /// # Errors
    ///
    /// - `AppError::Validation` if the secret is empty or the request is absent
    ///   (no provider call is made)
    /// - `AppError::Upstream` if the callback cannot be parsed or the provider
    ///   rejects the verifier
    #[instrument(skip_all)]
    pub async fn complete_callback(
        &self,
        request_secret: &str,
        request: Option<&Uri>,
    ) -> AppResult<SessionCredentials> {
        if request_secret.is_empty() {
            return Err(AppError::Validation(
                "request secret is missing".to_string(),
            ));
        }
        let Some(request) = request else {
            return Err(AppError::Validation(
                "callback request is missing".to_string(),
            ));
        };

        let callback = self
            .provider
            .parse_callback(request)
            .map_err(|e| failed(LoginStage::AwaitingCallback, e))?;

        let credentials = self
            .provider
            .access_token(&callback.request_token, request_secret, &callback.verifier)
            .await
            .map_err(|e| failed(LoginStage::AwaitingCallback, e))?;

        debug!(stage = %LoginStage::Completed, "Login completed");
        Ok(credentials.into())
    }
}

fn failed(stage: LoginStage, error: AppError) -> AppError {
    warn!(%stage, error = %error, "Login attempt failed");
    error.into_upstream()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::provider::mock::StubProvider;

    fn service(provider: StubProvider) -> (AuthService, Arc<StubProvider>) {
        let provider = Arc::new(provider);
        (AuthService::new(provider.clone()), provider)
    }

    fn callback_uri() -> Uri {
        "/oauth/twitter/callback?oauth_token=request-token&oauth_verifier=verifier-1"
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn test_start_login_success() {
        let (service, provider) = service(StubProvider::succeeding());

        let result = service.start_login().await.unwrap();

        assert_eq!(result.request_secret, "request-secret");
        assert_eq!(
            result.authorization_url.as_str(),
            "https://provider.example/oauth/authorize?oauth_token=request-token"
        );
        assert_eq!(provider.request_token_calls(), 1);
        assert_eq!(provider.authorization_url_calls(), 1);
    }

    #[tokio::test]
    async fn test_start_login_request_token_failure() {
        let (service, provider) = service(StubProvider::succeeding().without_request_token());

        let err = service.start_login().await.unwrap_err();

        assert!(err.is_upstream());
        assert_eq!(provider.authorization_url_calls(), 0);
    }

    #[tokio::test]
    async fn test_start_login_authorization_url_failure_is_propagated() {
        let (service, _) = service(StubProvider::succeeding().without_authorization_url());

        let err = service.start_login().await.unwrap_err();

        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_complete_callback_success() {
        let (service, provider) = service(StubProvider::succeeding());
        let uri = callback_uri();

        let credentials = service
            .complete_callback("request-secret", Some(&uri))
            .await
            .unwrap();

        assert_eq!(credentials.access_token, "access-token");
        assert_eq!(credentials.access_secret, "access-secret");
        assert_eq!(
            provider.last_exchange(),
            Some((
                "request-token".to_string(),
                "request-secret".to_string(),
                "verifier-1".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_complete_callback_forwards_long_request_secret() {
        let (service, provider) = service(StubProvider::succeeding());
        let uri = callback_uri();
        let secret = "s".repeat(1024);

        service.complete_callback(&secret, Some(&uri)).await.unwrap();

        assert_eq!(provider.access_token_calls(), 1);
        assert_eq!(
            provider.last_exchange().map(|(_, s, _)| s),
            Some(secret)
        );
    }

    #[tokio::test]
    async fn test_complete_callback_empty_secret() {
        let (service, provider) = service(StubProvider::succeeding());
        let uri = callback_uri();

        let err = service.complete_callback("", Some(&uri)).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(provider.access_token_calls(), 0);
    }

    #[tokio::test]
    async fn test_complete_callback_missing_request() {
        let (service, provider) = service(StubProvider::succeeding());

        let err = service
            .complete_callback("request-secret", None)
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(provider.access_token_calls(), 0);
    }

    #[tokio::test]
    async fn test_complete_callback_parse_failure() {
        let (service, provider) = service(StubProvider::succeeding().with_unparseable_callback());
        let uri = callback_uri();

        let err = service
            .complete_callback("request-secret", Some(&uri))
            .await
            .unwrap_err();

        assert!(err.is_upstream());
        assert_eq!(provider.access_token_calls(), 0);
    }

    #[tokio::test]
    async fn test_complete_callback_verifier_rejected() {
        let (service, _) = service(StubProvider::succeeding().without_access_token());
        let uri = callback_uri();

        let err = service
            .complete_callback("request-secret", Some(&uri))
            .await
            .unwrap_err();

        assert!(err.is_upstream());
    }

    #[test]
    fn test_login_stage_display() {
        assert_eq!(LoginStage::AwaitingCallback.to_string(), "awaiting_callback");
    }
}
