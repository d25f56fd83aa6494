//! Client identity extraction for the access log.
//!
//! # Security Warning
//!
//! `X-Forwarded-For` is client-controlled. Its raw value is logged as-is and
//! is only trustworthy when a reverse proxy overwrites it. Nothing in this
//! service makes an access decision based on the client address.

use std::borrow::Cow;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::http::header::{self, HeaderName};

/// Placeholder for any access-log field the request does not carry.
pub const PLACEHOLDER: &str = "-";

/// Header set by reverse proxies with the originating client address.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Client address for logging.
///
/// Priority:
/// 1. A non-empty `X-Forwarded-For` header, verbatim (the whole chain)
/// 2. The remote socket IP from `ConnectInfo`, port stripped
/// 3. [`PLACEHOLDER`] when neither is available (e.g. in-process tests)
#[inline]
pub fn extract_client_ip<B>(req: &Request<B>) -> Cow<'static, str> {
    if let Some(forwarded) = req.headers().get(X_FORWARDED_FOR)
        && let Ok(value) = forwarded.to_str()
        && !value.is_empty()
    {
        return Cow::Owned(value.to_string());
    }

    match req.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => Cow::Owned(addr.ip().to_string()),
        None => Cow::Borrowed(PLACEHOLDER),
    }
}

/// Header value as text, or [`PLACEHOLDER`] when absent, empty or not UTF-8.
#[inline]
pub fn header_or_placeholder<B>(req: &Request<B>, name: HeaderName) -> Cow<'static, str> {
    match req.headers().get(name).and_then(|v| v.to_str().ok()) {
        Some(value) if !value.is_empty() => Cow::Owned(value.to_string()),
        _ => Cow::Borrowed(PLACEHOLDER),
    }
}

/// `Referer` header or [`PLACEHOLDER`].
pub fn referer<B>(req: &Request<B>) -> Cow<'static, str> {
    header_or_placeholder(req, header::REFERER)
}

/// `User-Agent` header or [`PLACEHOLDER`].
pub fn user_agent<B>(req: &Request<B>) -> Cow<'static, str> {
    header_or_placeholder(req, header::USER_AGENT)
}
