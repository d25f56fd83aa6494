//! Security and CORS response headers.
//!
//! Headers are prepared once per pipeline and merged into every response.
//! A header the route handler already set is left alone.

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self' data: maxcdn.bootstrapcdn.com; \
     style-src 'unsafe-inline' maxcdn.bootstrapcdn.com; script-src 'unsafe-inline'";

/// Methods advertised to the allowed CORS origin.
pub const CORS_ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE";

/// The fixed security header set sent on every response.
pub fn security_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(8);
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("same-origin"));
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=5184000"),
    );
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_DNS_PREFETCH_CONTROL, HeaderValue::from_static("off"));
    headers.insert(
        HeaderName::from_static("x-download-options"),
        HeaderValue::from_static("noopen"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    headers
}

/// Add the CORS grant for `allowed_origin` (with credentials).
pub fn add_cors_headers(headers: &mut HeaderMap, allowed_origin: HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allowed_origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOWED_METHODS),
    );
}

/// Security headers plus the CORS grant when an origin is configured.
pub fn response_headers(cors_origin: Option<&HeaderValue>) -> HeaderMap {
    let mut headers = security_headers();
    if let Some(origin) = cors_origin {
        add_cors_headers(&mut headers, origin.clone());
    }
    headers
}

/// Copy `preset` into `target`, keeping values `target` already has.
pub fn merge_missing(target: &mut HeaderMap, preset: &HeaderMap) {
    for (name, value) in preset {
        if !target.contains_key(name) {
            target.insert(name.clone(), value.clone());
        }
    }
}
