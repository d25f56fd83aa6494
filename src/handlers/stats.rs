//! Per-author timeline statistics endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tower_cookies::Cookies;
use tracing::{instrument, warn};

use super::cookies::{ACCESS_SECRET_COOKIE, ACCESS_TOKEN_COOKIE, cookie_value};
use crate::models::StatsResponse;
use crate::state::AppState;

/// `GET /tweeters-stats`
///
/// Reads the session credentials from cookies and returns the ranked
/// authors of the user's home timeline. Any failure, missing cookies
/// included, is `401` with an empty body.
///
/// # Response Body
///
/// ```json
/// {
///   "data": [
///     { "fullName": "John Smith0", "username": "jsmith0", "tweetsCount": 2 },
///     { "fullName": "John Smith1", "username": "jsmith1", "tweetsCount": 1 }
///   ]
/// }
/// ```
#[instrument(skip_all)]
pub async fn tweeters_stats(State(state): State<AppState>, cookies: Cookies) -> Response {
    let access_token = cookie_value(&cookies, ACCESS_TOKEN_COOKIE);
    let access_secret = cookie_value(&cookies, ACCESS_SECRET_COOKIE);

    match state.stats.compute_stats(&access_token, &access_secret).await {
        Ok(data) => Json(StatsResponse { data }).into_response(),
        Err(e) => {
            warn!(error = %e, "Stats request failed");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}
