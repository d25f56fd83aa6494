//! Input validation for credentials and canonical-origin configuration.
//!
//! Credential strings are opaque to the server: they are only checked for
//! presence, never parsed. Configuration values that feed the CSRF policy
//! are checked more strictly, since a malformed canonical host would make
//! every API request fail the origin check.

use axum::http::HeaderValue;

use crate::error::{AppError, AppResult};

/// Maximum length of a canonical host value.
pub const MAX_HOST_LENGTH: usize = 253 + 6; // DNS name + ":65535"

/// Protocols accepted for the canonical origin.
pub const ALLOWED_PROTOCOLS: [&str; 2] = ["http", "https"];

/// Validate that a caller-supplied credential is present.
///
/// Only emptiness is rejected; the value itself is forwarded untouched.
/// `field` names the value in the error message (e.g. "access token").
pub fn validate_credential(value: &str, field: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is missing")));
    }

    Ok(())
}

/// Validate both halves of a token pair, reporting the first missing one.
pub fn validate_token_pair(token: &str, secret: &str, kind: &str) -> AppResult<()> {
    validate_credential(token, &format!("{kind} token"))?;
    validate_credential(secret, &format!("{kind} secret"))
}

/// Validate the canonical protocol (`http` or `https`).
pub fn validate_protocol(protocol: &str) -> AppResult<()> {
    if ALLOWED_PROTOCOLS.contains(&protocol) {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "PROTOCOL must be one of {ALLOWED_PROTOCOLS:?}, got '{protocol}'"
        )))
    }
}

/// Validate the canonical host as it will appear in the `Host` header.
///
/// Rules:
/// - Must be non-empty and at most 259 characters
/// - No scheme, path, whitespace, or userinfo (`host` or `host:port` only)
/// - A port, when present, must be a valid u16
pub fn validate_host(host: &str) -> AppResult<()> {
    if host.is_empty() {
        return Err(AppError::Config("HOST cannot be empty".to_string()));
    }

    if host.len() > MAX_HOST_LENGTH {
        return Err(AppError::Config(format!(
            "HOST cannot exceed {MAX_HOST_LENGTH} characters"
        )));
    }

    if host
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '@' | '?' | '#'))
    {
        return Err(AppError::Config(format!(
            "HOST must be a bare host[:port], got '{host}'"
        )));
    }

    // IPv6 literals keep their colons inside brackets
    let port = match host.rsplit_once(':') {
        Some((name, _)) if !name.ends_with(']') && name.contains(':') => None,
        Some((_, port)) => Some(port),
        None => None,
    };

    if let Some(port) = port
        && port.parse::<u16>().is_err()
    {
        return Err(AppError::Config(format!(
            "HOST has an invalid port: '{port}'"
        )));
    }

    Ok(())
}

/// Validate the optional CORS origin, which is echoed verbatim in a header.
pub fn validate_cors_domain(domain: &str) -> AppResult<()> {
    if HeaderValue::from_str(domain).is_err() {
        return Err(AppError::Config(format!(
            "CORS_DOMAIN is not a valid header value: '{}'",
            domain.escape_debug()
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_valid() {
        assert!(validate_credential("abc-123", "access token").is_ok());
    }

    #[test]
    fn test_credential_empty() {
        let err = validate_credential("", "access token").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("access token is missing"));
    }

    #[test]
    fn test_credential_length_is_not_limited() {
        let long = "a".repeat(4096);
        assert!(validate_credential(&long, "secret").is_ok());
        assert!(validate_token_pair(&long, &long, "access").is_ok());
    }

    #[test]
    fn test_token_pair_reports_secret() {
        let err = validate_token_pair("token", "", "access").unwrap_err();
        assert!(err.to_string().contains("access secret"));
    }

    #[test]
    fn test_protocol() {
        assert!(validate_protocol("http").is_ok());
        assert!(validate_protocol("https").is_ok());
        assert!(validate_protocol("ftp").is_err());
        assert!(validate_protocol("HTTPS").is_err());
        assert!(validate_protocol("").is_err());
    }

    #[test]
    fn test_cors_domain() {
        assert!(validate_cors_domain("https://app.example.com").is_ok());
        assert!(validate_cors_domain("https://app.example.com\r\nX-Evil: 1").is_err());
    }

    #[test]
    fn test_host_valid() {
        assert!(validate_host("example.com").is_ok());
        assert!(validate_host("localhost:3000").is_ok());
        assert!(validate_host("[::1]:8080").is_ok());
        assert!(validate_host("::1").is_ok());
    }

    #[test]
    fn test_host_invalid() {
        assert!(validate_host("").is_err());
        assert!(validate_host("https://example.com").is_err());
        assert!(validate_host("example.com/path").is_err());
        assert!(validate_host("user@example.com").is_err());
        assert!(validate_host("example.com:99999").is_err());
        assert!(validate_host("example.com:abc").is_err());
        assert!(validate_host("exa mple.com").is_err());
    }
}
