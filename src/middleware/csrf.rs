//! Cross-site request forgery policy.
//!
//! Entry points of the login flow (and the health probe) are exempt. Every
//! other request must:
//!
//! 1. carry `X-Requested-With: XMLHttpRequest` and a `Host` equal to the
//!    canonical host, and
//! 2. come from the canonical origin: `Origin` equals it, or `Referer`
//!    equals it or starts with `"{origin}/"`.
//!
//! Browsers do not let cross-origin pages set `X-Requested-With` without a
//! CORS preflight, and do not let pages forge `Origin`/`Referer`.

use std::fmt;

use axum::http::Request;
use axum::http::header;

/// Paths reachable without CSRF markers.
pub const EXEMPT_PATHS: [&str; 4] = ["/", "/login/twitter", "/oauth/twitter/callback", "/health"];

/// Marker header for programmatic (XHR/fetch) requests.
pub const REQUESTED_WITH_HEADER: &str = "x-requested-with";
pub const XML_HTTP_REQUEST: &str = "XMLHttpRequest";

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfRejection {
    /// `X-Requested-With: XMLHttpRequest` is absent
    MissingMarker,
    /// `Host` differs from the canonical host
    HostMismatch,
    /// Neither `Origin` nor `Referer` belongs to the canonical origin
    OriginMismatch,
}

impl CsrfRejection {
    /// Metrics label.
    pub fn reason(self) -> &'static str {
        match self {
            CsrfRejection::MissingMarker => "missing_marker",
            CsrfRejection::HostMismatch => "host_mismatch",
            CsrfRejection::OriginMismatch => "origin_mismatch",
        }
    }
}

impl fmt::Display for CsrfRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// CSRF policy bound to one canonical host and origin.
#[derive(Debug, Clone)]
pub struct CsrfPolicy {
    host: String,
    origin: String,
    referer_prefix: String,
}

impl CsrfPolicy {
    /// `origin` is `"{protocol}://{host}"`.
    pub fn new(host: impl Into<String>, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            host: host.into(),
            referer_prefix: format!("{origin}/"),
            origin,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn is_exempt(path: &str) -> bool {
        EXEMPT_PATHS.contains(&path)
    }

    /// Check a request against the policy.
    ///
    /// # Errors
    ///
    /// Returns the first rule the request breaks.
    pub fn check<B>(&self, req: &Request<B>) -> Result<(), CsrfRejection> {
        if Self::is_exempt(req.uri().path()) {
            return Ok(());
        }

        let headers = req.headers();

        let marker = headers
            .get(REQUESTED_WITH_HEADER)
            .and_then(|v| v.to_str().ok());
        if marker != Some(XML_HTTP_REQUEST) {
            return Err(CsrfRejection::MissingMarker);
        }

        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| req.uri().authority().map(|a| a.as_str()));
        if host != Some(self.host.as_str()) {
            return Err(CsrfRejection::HostMismatch);
        }

        let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
        let referer = headers.get(header::REFERER).and_then(|v| v.to_str().ok());
        if !self.is_same_origin(origin, referer) {
            return Err(CsrfRejection::OriginMismatch);
        }

        Ok(())
    }

    /// `Origin` matches exactly, or `Referer` matches exactly or by prefix.
    pub fn is_same_origin(&self, origin: Option<&str>, referer: Option<&str>) -> bool {
        if origin == Some(self.origin.as_str()) {
            return true;
        }

        match referer {
            Some(referer) => referer == self.origin || referer.starts_with(&self.referer_prefix),
            None => false,
        }
    }
}
