//! OAuth1 login, callback and logout endpoints.
//!
//! # Endpoints
//!
//! - `GET /login/twitter` - Start login, redirect to the provider
//! - `GET /oauth/twitter/callback` - Finish login, redirect to the homepage
//! - `DELETE /logout` - Drop all credential cookies
//!
//! Failures never reach the client as error text: login falls back to `/`,
//! the callback falls back to the homepage without setting cookies.

use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tower_cookies::Cookies;
use tracing::{info, instrument, warn};

use super::cookies::{
    ACCESS_SECRET_COOKIE, ACCESS_TOKEN_COOKIE, REQUEST_SECRET_COOKIE, cookie_value,
    credential_cookie, removal_cookie,
};
use crate::state::AppState;

/// `302 Found` to `location`.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Start the OAuth1 flow.
///
/// On success the request secret goes into the `oauthRequestSecret` cookie
/// and the browser is sent to the provider's authorization page.
#[instrument(skip_all)]
pub async fn login(State(state): State<AppState>, cookies: Cookies) -> Response {
    match state.auth.start_login().await {
        Ok(result) => {
            cookies.add(credential_cookie(
                REQUEST_SECRET_COOKIE,
                result.request_secret,
            ));
            found(result.authorization_url.as_str())
        }
        Err(e) => {
            warn!(error = %e, "Login failed, redirecting to /");
            found("/")
        }
    }
}

/// Provider callback: exchange the verifier for session credentials.
#[instrument(skip_all)]
pub async fn oauth_callback(
    State(state): State<AppState>,
    cookies: Cookies,
    uri: Uri,
) -> Response {
    let request_secret = cookie_value(&cookies, REQUEST_SECRET_COOKIE);
    let homepage = state.config.homepage.as_str();

    match state.auth.complete_callback(&request_secret, Some(&uri)).await {
        Ok(credentials) => {
            cookies.add(credential_cookie(
                ACCESS_TOKEN_COOKIE,
                credentials.access_token,
            ));
            cookies.add(credential_cookie(
                ACCESS_SECRET_COOKIE,
                credentials.access_secret,
            ));
            info!("Login completed");
            found(homepage)
        }
        Err(e) => {
            warn!(error = %e, "OAuth callback failed, redirecting to homepage");
            found(homepage)
        }
    }
}

/// Clear every credential cookie. Always `204 No Content`.
#[instrument(skip_all)]
pub async fn logout(cookies: Cookies) -> StatusCode {
    for name in [REQUEST_SECRET_COOKIE, ACCESS_TOKEN_COOKIE, ACCESS_SECRET_COOKIE] {
        cookies.add(removal_cookie(name));
    }
    StatusCode::NO_CONTENT
}
