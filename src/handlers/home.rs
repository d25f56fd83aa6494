//! Static homepage.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

use crate::state::AppState;

/// `GET /` - the configured index document, or `500` if it cannot be read.
///
/// The file is read on every request so it can be replaced without a
/// restart.
pub async fn homepage(State(state): State<AppState>) -> Response {
    let path = &state.config.index_path;

    match tokio::fs::read(path).await {
        Ok(document) => Html(document).into_response(),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read homepage document");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
