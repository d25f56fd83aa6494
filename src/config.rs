//! Application configuration loaded from environment variables.
//!
//! # Required Variables
//!
//! The service refuses to start without these:
//!
//! - `CONSUMER_KEY`, `CONSUMER_SECRET`: OAuth1 consumer credentials
//! - `CALLBACK_URL`: where the identity provider sends the user back
//! - `PORT`: listen port
//! - `HOMEPAGE`: redirect target once the OAuth callback completes
//! - `HOST`, `PROTOCOL`: canonical host and protocol, used for CSRF checks
//!
//! # Optional Variables
//!
//! - `CORS_DOMAIN`: single allowed CORS origin (unset = no CORS headers)
//! - `BIND_ADDRESS`: interface to bind (default: `0.0.0.0`)
//! - `INDEX_PATH`: static homepage document (default: `index.html`)
//! - `UPSTREAM_TIMEOUT_SECS`: timeout for provider calls (default: 10)
//! - `TIMELINE_COUNT`: timeline items fetched per stats call (default: 200)
//! - `METRICS_PORT`: Prometheus listener port, 0 = disabled (default: 0)
//! - `LOG_FORMAT`: `text` or `json` (default: `text`)

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::validation::{validate_cors_domain, validate_host, validate_protocol};

/// Largest timeline page the provider serves in one call.
pub const MAX_TIMELINE_COUNT: u32 = 200;

/// Application configuration loaded from environment variables.
///
/// Passed explicitly to every component that needs it; there is no global.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.server_addr());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // OAuth1 Consumer
    // =========================================================================
    /// OAuth1 consumer key issued by the identity provider
    pub consumer_key: String,

    /// OAuth1 consumer secret issued by the identity provider
    pub consumer_secret: String,

    /// Callback URL registered with the provider
    pub callback_url: String,

    // =========================================================================
    // Server
    // =========================================================================
    /// Interface to bind (default: "0.0.0.0")
    pub bind_address: String,

    /// Listen port
    pub port: u16,

    /// Where the OAuth callback redirects once it is done (success or not)
    pub homepage: String,

    /// Static homepage document served on `GET /`
    pub index_path: PathBuf,

    // =========================================================================
    // Canonical Origin & CORS
    // =========================================================================
    /// Canonical host, compared against the `Host` header of API requests
    pub host: String,

    /// Canonical protocol ("http" or "https")
    pub protocol: String,

    /// Allowed CORS origin (None = no CORS headers are emitted)
    pub cors_domain: Option<String>,

    // =========================================================================
    // Upstream
    // =========================================================================
    /// Timeout applied to every identity provider / timeline HTTP call
    pub upstream_timeout: Duration,

    /// Number of home timeline items requested per stats call (1..=200)
    pub timeline_count: u32,

    // =========================================================================
    // Observability
    // =========================================================================
    /// Port for Prometheus metrics endpoint (0 = disabled)
    pub metrics_port: u16,

    /// Emit logs as JSON instead of human-readable text
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or any
    /// value fails to parse or validate.
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            consumer_key: Self::require_env("CONSUMER_KEY")?,
            consumer_secret: Self::require_env("CONSUMER_SECRET")?,
            callback_url: Self::require_env("CALLBACK_URL")?,

            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::require_parsed_env("PORT")?,
            homepage: Self::require_env("HOMEPAGE")?,
            index_path: env::var("INDEX_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("index.html")),

            host: Self::require_env("HOST")?,
            protocol: Self::require_env("PROTOCOL")?,
            cors_domain: env::var("CORS_DOMAIN").ok().filter(|d| !d.is_empty()),

            upstream_timeout: Duration::from_secs(Self::parse_env("UPSTREAM_TIMEOUT_SECS", 10)?),
            timeline_count: Self::parse_env("TIMELINE_COUNT", MAX_TIMELINE_COUNT)?,

            metrics_port: Self::parse_env("METRICS_PORT", 0)?,
            log_json: Self::parse_log_format()?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if validation fails.
    pub fn validate(&self) -> AppResult<()> {
        validate_host(&self.host)?;
        validate_protocol(&self.protocol)?;
        if let Some(domain) = &self.cors_domain {
            validate_cors_domain(domain)?;
        }

        if self.upstream_timeout.is_zero() {
            return Err(AppError::Config(
                "UPSTREAM_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        if self.timeline_count == 0 || self.timeline_count > MAX_TIMELINE_COUNT {
            return Err(AppError::Config(format!(
                "TIMELINE_COUNT must be between 1 and {MAX_TIMELINE_COUNT}"
            )));
        }

        if url::Url::parse(&self.callback_url).is_err() {
            return Err(AppError::Config(format!(
                "CALLBACK_URL is not an absolute URL: '{}'",
                self.callback_url
            )));
        }

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Canonical origin, e.g. `https://stats.example.com`.
    pub fn canonical_origin(&self) -> String {
        format!("{}://{}", self.protocol, self.host)
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address.
    ///
    /// Returns `None` if metrics are disabled (port = 0).
    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        if self.metrics_enabled() {
            Some(SocketAddr::from(([0, 0, 0, 0], self.metrics_port)))
        } else {
            None
        }
    }

    /// Read a required, non-empty environment variable.
    fn require_env(name: &str) -> AppResult<String> {
        Self::require_value(name, env::var(name).ok())
    }

    fn require_value(name: &str, value: Option<String>) -> AppResult<String> {
        value
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Config(format!("{name} is required")))
    }

    /// Read and parse a required environment variable.
    fn require_parsed_env<T>(name: &str) -> AppResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        Self::require_env(name)?
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid {name}: {e}")))
    }

    /// Parse an environment variable into the specified type with a default value.
    fn parse_env<T>(name: &str, default: T) -> AppResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(val) => val
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid {name}: {e}"))),
            Err(_) => Ok(default),
        }
    }

    fn parse_log_format() -> AppResult<bool> {
        match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => Ok(true),
            Ok("text") | Ok("") | Err(_) => Ok(false),
            Ok(other) => Err(AppError::Config(format!(
                "LOG_FORMAT must be 'text' or 'json', got '{other}'"
            ))),
        }
    }
}

/// Configuration for tests and local development.
///
/// Points at `http://localhost:3000` with placeholder consumer credentials.
/// Production deployments should use `Config::from_env()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            consumer_key: "consumer-key".to_string(),
            consumer_secret: "consumer-secret".to_string(),
            callback_url: "http://localhost:3000/oauth/twitter/callback".to_string(),
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            homepage: "/".to_string(),
            index_path: PathBuf::from("index.html"),
            host: "localhost:3000".to_string(),
            protocol: "http".to_string(),
            cors_domain: None,
            upstream_timeout: Duration::from_secs(10),
            timeline_count: MAX_TIMELINE_COUNT,
            metrics_port: 0,
            log_json: false,
        }
    }
}
