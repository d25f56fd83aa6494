//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! Implements the parts of RFC 5849 a client needs:
//!
//! 1. Collect parameters: URL query + form body + `oauth_*` protocol params
//! 2. Percent-encode keys and values (RFC 3986 unreserved set only)
//! 3. Sort by encoded key, then encoded value, and join as `k=v&k=v`
//! 4. Signature base string: `METHOD&enc(base_url)&enc(params)`
//! 5. Signing key: `enc(consumer_secret)&enc(token_secret)`
//! 6. `oauth_signature = base64(hmac_sha1(key, base_string))`
//!
//! The result is sent as an `Authorization: OAuth ...` header.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;
use url::Url;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

type HmacSha1 = Hmac<Sha1>;

/// Everything except the RFC 3986 unreserved characters gets encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// Consumer (application) credentials issued by the provider.
#[derive(Clone)]
pub struct ConsumerCredentials {
    pub key: String,
    pub secret: String,
}

impl ConsumerCredentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for ConsumerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerCredentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Token half of the signing key. Absent while requesting a request token.
#[derive(Debug, Clone, Copy)]
pub struct TokenCredentials<'a> {
    pub token: &'a str,
    pub secret: &'a str,
}

/// Percent-encode a string per RFC 5849 section 3.6.
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

/// Base string URI: scheme and host lowercased, default port dropped,
/// query and fragment removed.
pub fn base_string_uri(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

/// Normalize request parameters into the sorted `k=v&k=v` form.
pub fn normalize_parameters(params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the signature base string for a request.
///
/// `params` must already contain the query, body and `oauth_*` parameters
/// (but not `oauth_signature`).
pub fn signature_base_string(method: &str, url: &Url, params: &[(String, String)]) -> String {
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(&base_string_uri(url)),
        percent_encode(&normalize_parameters(params))
    )
}

/// Compute the HMAC-SHA1 signature of a base string.
pub fn sign(base_string: &str, consumer_secret: &str, token_secret: &str) -> AppResult<String> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );

    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| AppError::Internal(format!("Failed to initialize HMAC: {e}")))?;
    mac.update(base_string.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// A request about to be signed.
#[derive(Debug)]
pub struct SigningRequest<'a> {
    pub method: &'a str,
    pub url: &'a Url,
    /// Form-encoded body parameters, if any
    pub body_params: &'a [(String, String)],
    /// Extra protocol parameters such as `oauth_callback` or `oauth_verifier`
    pub extra_oauth_params: &'a [(&'a str, &'a str)],
}

/// Build an `Authorization` header with a fresh nonce and the current time.
pub fn authorization_header(
    consumer: &ConsumerCredentials,
    token: Option<TokenCredentials<'_>>,
    request: &SigningRequest<'_>,
) -> AppResult<String> {
    let nonce = Uuid::new_v4().simple().to_string();
    let timestamp = chrono::Utc::now().timestamp();
    authorization_header_with(consumer, token, request, &nonce, timestamp)
}

/// Build an `Authorization` header with an explicit nonce and timestamp.
pub fn authorization_header_with(
    consumer: &ConsumerCredentials,
    token: Option<TokenCredentials<'_>>,
    request: &SigningRequest<'_>,
    nonce: &str,
    timestamp: i64,
) -> AppResult<String> {
    let mut oauth_params: Vec<(String, String)> = vec![
        ("oauth_consumer_key".to_string(), consumer.key.clone()),
        ("oauth_nonce".to_string(), nonce.to_string()),
        (
            "oauth_signature_method".to_string(),
            SIGNATURE_METHOD.to_string(),
        ),
        ("oauth_timestamp".to_string(), timestamp.to_string()),
        ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
    ];
    if let Some(token) = token {
        oauth_params.push(("oauth_token".to_string(), token.token.to_string()));
    }
    oauth_params.extend(
        request
            .extra_oauth_params
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
    );

    let mut all_params: Vec<(String, String)> = request
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    all_params.extend(request.body_params.iter().cloned());
    all_params.extend(oauth_params.iter().cloned());

    let base_string = signature_base_string(request.method, request.url, &all_params);
    let signature = sign(
        &base_string,
        &consumer.secret,
        token.map(|t| t.secret).unwrap_or_default(),
    )?;

    oauth_params.push(("oauth_signature".to_string(), signature));
    oauth_params.sort();

    let fields = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {fields}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    // Worked example from the provider's "creating a signature" guide.
    const CONSUMER_KEY: &str = "xvz1evFS4wEEPTGEFPHBog";
    const CONSUMER_SECRET: &str = "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw";
    const TOKEN: &str = "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb";
    const TOKEN_SECRET: &str = "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE";
    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const TIMESTAMP: i64 = 1318622958;

    fn example_params() -> Vec<(String, String)> {
        vec![
            (
                "status".to_string(),
                "Hello Ladies + Gentlemen, a signed OAuth request!".to_string(),
            ),
            ("include_entities".to_string(), "true".to_string()),
            ("oauth_consumer_key".to_string(), CONSUMER_KEY.to_string()),
            ("oauth_nonce".to_string(), NONCE.to_string()),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            ("oauth_timestamp".to_string(), TIMESTAMP.to_string()),
            ("oauth_token".to_string(), TOKEN.to_string()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ]
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("An encoded string!"), "An%20encoded%20string%21");
        assert_eq!(percent_encode("Dogs, Cats & Mice"), "Dogs%2C%20Cats%20%26%20Mice");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
        assert_eq!(percent_encode("a-b.c_d~e"), "a-b.c_d~e");
    }

    #[test]
    fn test_base_string_uri() {
        let url = Url::parse("HTTPS://API.Example.com:443/1.1/x.json?a=b#frag").unwrap();
        assert_eq!(base_string_uri(&url), "https://api.example.com/1.1/x.json");

        let url = Url::parse("http://example.com:8080/path").unwrap();
        assert_eq!(base_string_uri(&url), "http://example.com:8080/path");
    }

    #[test]
    fn test_normalize_parameters_sorted() {
        let params = vec![
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "z".to_string()),
            ("a".to_string(), "y".to_string()),
        ];
        assert_eq!(normalize_parameters(&params), "a=y&a=z&b=2");
    }

    #[test]
    fn test_signature_base_string_prefix() {
        let url = Url::parse("https://api.twitter.com/1.1/statuses/update.json").unwrap();
        let base = signature_base_string("post", &url, &example_params());

        assert!(base.starts_with(
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&include_entities%3Dtrue%26oauth_consumer_key%3D"
        ));
        assert!(base.ends_with(
            "status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        ));
    }

    #[test]
    fn test_sign_known_vector() {
        let url = Url::parse("https://api.twitter.com/1.1/statuses/update.json").unwrap();
        let base = signature_base_string("POST", &url, &example_params());

        let signature = sign(&base, CONSUMER_SECRET, TOKEN_SECRET).unwrap();
        assert_eq!(signature, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn test_authorization_header_known_vector() {
        let url = Url::parse(
            "https://api.twitter.com/1.1/statuses/update.json?include_entities=true",
        )
        .unwrap();
        let body = vec![(
            "status".to_string(),
            "Hello Ladies + Gentlemen, a signed OAuth request!".to_string(),
        )];
        let consumer = ConsumerCredentials::new(CONSUMER_KEY, CONSUMER_SECRET);
        let request = SigningRequest {
            method: "POST",
            url: &url,
            body_params: &body,
            extra_oauth_params: &[],
        };

        let header = authorization_header_with(
            &consumer,
            Some(TokenCredentials {
                token: TOKEN,
                secret: TOKEN_SECRET,
            }),
            &request,
            NONCE,
            TIMESTAMP,
        )
        .unwrap();

        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_token=\"370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb\""));
        assert!(!header.contains("status"));
    }

    #[test]
    fn test_authorization_header_without_token() {
        let url = Url::parse("https://api.twitter.com/oauth/request_token").unwrap();
        let consumer = ConsumerCredentials::new("key", "secret");
        let request = SigningRequest {
            method: "POST",
            url: &url,
            body_params: &[],
            extra_oauth_params: &[("oauth_callback", "http://localhost/cb")],
        };

        let header = authorization_header(&consumer, None, &request).unwrap();

        assert!(header.contains("oauth_callback=\"http%3A%2F%2Flocalhost%2Fcb\""));
        assert!(!header.contains("oauth_token="));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
    }

    #[test]
    fn test_consumer_debug_redacts_secret() {
        let consumer = ConsumerCredentials::new("key", "top-secret");
        assert!(!format!("{consumer:?}").contains("top-secret"));
    }
}
