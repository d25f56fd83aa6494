use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error types with appropriate HTTP status codes.
///
/// # Taxonomy
///
/// - `Validation` - a required caller-supplied value is missing or malformed.
///   Never retried.
/// - `Upstream` - the identity provider or timeline API call failed. Surfaced
///   as an opaque failure; the route handler decides on redirect or status.
/// - `Internal` - unexpected fault (including recovered panics).
/// - `Config` - startup configuration is missing or invalid.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Upstream call failed: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Short machine-readable kind, also used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Upstream(_) => "upstream",
            AppError::Internal(_) => "internal",
            AppError::Config(_) => "config",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, AppError::Upstream(_))
    }

    /// Reclassify a collaborator failure as `Upstream`, keeping the message.
    ///
    /// Use cases report every provider failure as upstream, even when the
    /// provider rejected its own arguments.
    pub fn into_upstream(self) -> AppError {
        match self {
            AppError::Upstream(_) => self,
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Upstream(format!("request timed out: {e}"))
        } else {
            AppError::Upstream(e.to_string())
        }
    }
}

/// Error response body for API endpoints.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Full details stay in the server log; clients only get the sanitized message
        tracing::error!(error = %self, "Request failed");

        let (status, message) = match &self {
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "A required parameter is missing or invalid.",
            ),
            AppError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "The identity provider could not be reached. Please try again.",
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred. Please contact support if the issue persists.",
            ),
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Service configuration error. Please contact support.",
            ),
        };

        let body = ErrorResponse {
            error: self.kind().to_string(),
            message: message.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Config("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_response_body_hides_internal_details() {
        let response = AppError::Upstream("consumer secret rejected by 10.0.0.7".into())
            .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(body.contains("\"error\":\"upstream\""));
        assert!(!body.contains("10.0.0.7"));
    }

    #[test]
    fn test_kind_predicates() {
        assert!(AppError::Validation(String::new()).is_validation());
        assert!(!AppError::Validation(String::new()).is_upstream());
        assert!(AppError::Upstream(String::new()).is_upstream());
    }
}
