//! Twitter implementation of the provider capabilities.
//!
//! # Endpoints
//!
//! | Leg | Method | URL |
//! |-----|--------|-----|
//! | Request token | POST | `https://api.twitter.com/oauth/request_token` |
//! | Authorize | GET (browser) | `https://api.twitter.com/oauth/authorize` |
//! | Access token | POST | `https://api.twitter.com/oauth/access_token` |
//! | Home timeline | GET | `https://api.twitter.com/1.1/statuses/home_timeline.json` |
//!
//! Every call goes through one `reqwest::Client` built with the configured
//! upstream timeout. A timeout surfaces as `AppError::Upstream` like any
//! other provider failure; nothing is retried.

use std::time::Instant;

use async_trait::async_trait;
use axum::http::Uri;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::oauth1::{self, ConsumerCredentials, SigningRequest, TokenCredentials};
use super::{CallbackParams, OAuth1Provider, TimelineSource};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::{TimelineEntry, TokenPair};
use crate::validation::{validate_credential, validate_token_pair};

/// Upper bound on how much of an error body ends up in the log.
const MAX_ERROR_BODY_LOG: usize = 200;

/// Provider endpoint URLs. Overridable so tests can point at a local server.
#[derive(Debug, Clone)]
pub struct TwitterEndpoints {
    pub request_token: String,
    pub authorize: String,
    pub access_token: String,
    pub home_timeline: String,
}

impl Default for TwitterEndpoints {
    fn default() -> Self {
        Self {
            request_token: "https://api.twitter.com/oauth/request_token".to_string(),
            authorize: "https://api.twitter.com/oauth/authorize".to_string(),
            access_token: "https://api.twitter.com/oauth/access_token".to_string(),
            home_timeline: "https://api.twitter.com/1.1/statuses/home_timeline.json"
                .to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RequestTokenResponse {
    oauth_token: String,
    oauth_token_secret: String,
    #[serde(default)]
    oauth_callback_confirmed: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    oauth_token: String,
    oauth_token_secret: String,
    #[serde(default)]
    screen_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    user: TweetUser,
}

#[derive(Debug, Deserialize)]
struct TweetUser {
    name: String,
    screen_name: String,
}

/// Twitter OAuth1 + timeline client.
///
/// Cheap to clone; the inner `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    http: reqwest::Client,
    consumer: ConsumerCredentials,
    callback_url: String,
    endpoints: TwitterEndpoints,
    timeline_count: u32,
}

impl TwitterClient {
    /// Build a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the consumer credentials or callback
    /// URL are missing, or the HTTP client cannot be built.
    pub fn new(config: &Config) -> AppResult<Self> {
        Self::with_endpoints(config, TwitterEndpoints::default())
    }

    /// Build a client that talks to custom endpoint URLs.
    pub fn with_endpoints(config: &Config, endpoints: TwitterEndpoints) -> AppResult<Self> {
        if config.consumer_key.is_empty()
            || config.consumer_secret.is_empty()
            || config.callback_url.is_empty()
        {
            return Err(AppError::Config(
                "consumer key, consumer secret, and callback URL are required".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .user_agent(concat!("tweeters-stats/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            consumer: ConsumerCredentials::new(&config.consumer_key, &config.consumer_secret),
            callback_url: config.callback_url.clone(),
            endpoints,
            timeline_count: config.timeline_count,
        })
    }

    /// Issue a signed, form-less POST to an OAuth endpoint and return the body.
    async fn post_signed(
        &self,
        operation: &'static str,
        endpoint: &str,
        token: Option<TokenCredentials<'_>>,
        extra_oauth_params: &[(&str, &str)],
    ) -> AppResult<String> {
        let url = parse_endpoint(endpoint)?;
        let header = oauth1::authorization_header(
            &self.consumer,
            token,
            &SigningRequest {
                method: "POST",
                url: &url,
                body_params: &[],
                extra_oauth_params,
            },
        )?;

        let started = Instant::now();
        let result: AppResult<String> = async {
            let response = self
                .http
                .post(url)
                .header(AUTHORIZATION, header)
                .send()
                .await?;
            read_success_body(operation, response).await
        }
        .await;

        metrics::record_upstream_call(operation, result.is_ok(), started.elapsed().as_secs_f64());
        result
    }
}

#[async_trait]
impl OAuth1Provider for TwitterClient {
    #[instrument(skip(self))]
    async fn request_token(&self) -> AppResult<TokenPair> {
        let body = self
            .post_signed(
                "request_token",
                &self.endpoints.request_token,
                None,
                &[("oauth_callback", self.callback_url.as_str())],
            )
            .await?;

        let parsed: RequestTokenResponse = serde_urlencoded::from_str(&body)
            .map_err(|e| AppError::Upstream(format!("Malformed request token response: {e}")))?;

        if parsed.oauth_callback_confirmed.as_deref() != Some("true") {
            return Err(AppError::Upstream(
                "Provider did not confirm the callback URL".to_string(),
            ));
        }

        debug!("Obtained request token");
        Ok(TokenPair::new(parsed.oauth_token, parsed.oauth_token_secret))
    }

    fn authorization_url(&self, request_token: &str) -> AppResult<Url> {
        validate_credential(request_token, "request token")?;

        let mut url = parse_endpoint(&self.endpoints.authorize)?;
        url.query_pairs_mut()
            .append_pair("oauth_token", request_token);
        Ok(url)
    }

    #[instrument(skip_all)]
    async fn access_token(
        &self,
        request_token: &str,
        request_secret: &str,
        verifier: &str,
    ) -> AppResult<TokenPair> {
        validate_token_pair(request_token, request_secret, "request")?;
        validate_credential(verifier, "verifier")?;

        let body = self
            .post_signed(
                "access_token",
                &self.endpoints.access_token,
                Some(TokenCredentials {
                    token: request_token,
                    secret: request_secret,
                }),
                &[("oauth_verifier", verifier)],
            )
            .await?;

        let parsed: AccessTokenResponse = serde_urlencoded::from_str(&body)
            .map_err(|e| AppError::Upstream(format!("Malformed access token response: {e}")))?;

        debug!(screen_name = ?parsed.screen_name, "Exchanged verifier for access token");
        Ok(TokenPair::new(parsed.oauth_token, parsed.oauth_token_secret))
    }

    fn parse_callback(&self, uri: &Uri) -> AppResult<CallbackParams> {
        parse_callback_query(uri.query().unwrap_or_default())
    }
}

#[async_trait]
impl TimelineSource for TwitterClient {
    #[instrument(skip_all, fields(count = self.timeline_count))]
    async fn fetch_timeline(
        &self,
        access_token: &str,
        access_secret: &str,
    ) -> AppResult<Vec<TimelineEntry>> {
        validate_token_pair(access_token, access_secret, "access")?;

        let mut url = parse_endpoint(&self.endpoints.home_timeline)?;
        url.query_pairs_mut()
            .append_pair("count", &self.timeline_count.to_string());

        let header = oauth1::authorization_header(
            &self.consumer,
            Some(TokenCredentials {
                token: access_token,
                secret: access_secret,
            }),
            &SigningRequest {
                method: "GET",
                url: &url,
                body_params: &[],
                extra_oauth_params: &[],
            },
        )?;

        let started = Instant::now();
        let result: AppResult<Vec<TimelineEntry>> = async {
            let response = self
                .http
                .get(url)
                .header(AUTHORIZATION, header)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(upstream_status_error("home_timeline", status, &body));
            }

            let tweets: Vec<Tweet> = response.json().await?;
            Ok(tweets
                .into_iter()
                .map(|t| TimelineEntry::new(t.user.name, t.user.screen_name))
                .collect())
        }
        .await;

        metrics::record_upstream_call(
            "home_timeline",
            result.is_ok(),
            started.elapsed().as_secs_f64(),
        );

        if let Ok(entries) = &result {
            debug!(entries = entries.len(), "Fetched home timeline");
        }
        result
    }
}

/// Extract `oauth_token` and `oauth_verifier` from a callback query string.
///
/// A `denied` parameter means the user declined on the provider's page.
pub fn parse_callback_query(query: &str) -> AppResult<CallbackParams> {
    let mut request_token = None;
    let mut verifier = None;

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "oauth_token" => request_token = Some(value.into_owned()),
            "oauth_verifier" => verifier = Some(value.into_owned()),
            "denied" => {
                return Err(AppError::Upstream(
                    "User denied the authorization request".to_string(),
                ));
            }
            _ => {}
        }
    }

    match (request_token, verifier) {
        (Some(request_token), Some(verifier))
            if !request_token.is_empty() && !verifier.is_empty() =>
        {
            Ok(CallbackParams {
                request_token,
                verifier,
            })
        }
        _ => Err(AppError::Upstream(
            "Callback is missing oauth_token or oauth_verifier".to_string(),
        )),
    }
}

fn parse_endpoint(endpoint: &str) -> AppResult<Url> {
    Url::parse(endpoint)
        .map_err(|e| AppError::Config(format!("Invalid provider endpoint '{endpoint}': {e}")))
}

async fn read_success_body(operation: &str, response: reqwest::Response) -> AppResult<String> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        Ok(body)
    } else {
        Err(upstream_status_error(operation, status, &body))
    }
}

fn upstream_status_error(operation: &str, status: reqwest::StatusCode, body: &str) -> AppError {
    let snippet: String = body.chars().take(MAX_ERROR_BODY_LOG).collect();
    warn!(operation, %status, body = %snippet, "Provider returned an error status");
    AppError::Upstream(format!("{operation} returned {status}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn client() -> TwitterClient {
        TwitterClient::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_new_requires_consumer_credentials() {
        let config = Config {
            consumer_key: String::new(),
            ..Config::default()
        };
        let err = TwitterClient::new(&config).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_authorization_url() {
        let url = client().authorization_url("req-token/1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.twitter.com/oauth/authorize?oauth_token=req-token%2F1"
        );
    }

    #[test]
    fn test_authorization_url_requires_token() {
        let err = client().authorization_url("").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_authorization_url_bad_endpoint() {
        let endpoints = TwitterEndpoints {
            authorize: "not a url".to_string(),
            ..TwitterEndpoints::default()
        };
        let client = TwitterClient::with_endpoints(&Config::default(), endpoints).unwrap();
        assert!(client.authorization_url("token").is_err());
    }

    #[test]
    fn test_parse_callback() {
        let uri: Uri = "/oauth/twitter/callback?oauth_token=abc&oauth_verifier=xyz"
            .parse()
            .unwrap();
        let params = client().parse_callback(&uri).unwrap();
        assert_eq!(params.request_token, "abc");
        assert_eq!(params.verifier, "xyz");
    }

    #[test]
    fn test_parse_callback_decodes_values() {
        let params = parse_callback_query("oauth_token=a%2Bb&oauth_verifier=c+d").unwrap();
        assert_eq!(params.request_token, "a+b");
        assert_eq!(params.verifier, "c d");
    }

    #[test]
    fn test_parse_callback_missing_verifier() {
        let err = parse_callback_query("oauth_token=abc").unwrap_err();
        assert!(err.is_upstream());

        let err = parse_callback_query("oauth_token=abc&oauth_verifier=").unwrap_err();
        assert!(err.is_upstream());

        assert!(parse_callback_query("").is_err());
    }

    #[test]
    fn test_parse_callback_denied() {
        let err = parse_callback_query("denied=abc").unwrap_err();
        assert!(err.to_string().contains("denied"));
    }

    #[tokio::test]
    async fn test_access_token_validates_arguments_before_network() {
        let client = client();
        assert!(client.access_token("", "secret", "v").await.unwrap_err().is_validation());
        assert!(client.access_token("t", "", "v").await.unwrap_err().is_validation());
        assert!(client.access_token("t", "s", "").await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_fetch_timeline_validates_arguments_before_network() {
        let err = client().fetch_timeline("", "secret").await.unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_request_token_response_parsing() {
        let parsed: RequestTokenResponse = serde_urlencoded::from_str(
            "oauth_token=tok&oauth_token_secret=sec&oauth_callback_confirmed=true",
        )
        .unwrap();
        assert_eq!(parsed.oauth_token, "tok");
        assert_eq!(parsed.oauth_token_secret, "sec");
        assert_eq!(parsed.oauth_callback_confirmed.as_deref(), Some("true"));
    }

    #[test]
    fn test_access_token_response_ignores_extra_fields() {
        let parsed: AccessTokenResponse = serde_urlencoded::from_str(
            "oauth_token=tok&oauth_token_secret=sec&user_id=42&screen_name=jsmith",
        )
        .unwrap();
        assert_eq!(parsed.oauth_token, "tok");
        assert_eq!(parsed.screen_name.as_deref(), Some("jsmith"));
    }

    #[test]
    fn test_tweet_deserialization() {
        let json = r#"[{"id": 1, "text": "hi", "user": {"name": "John Smith", "screen_name": "jsmith", "id": 7}}]"#;
        let tweets: Vec<Tweet> = serde_json::from_str(json).unwrap();
        assert_eq!(tweets[0].user.name, "John Smith");
        assert_eq!(tweets[0].user.screen_name, "jsmith");
    }
}
