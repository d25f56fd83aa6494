//! Fuzz testing for request-derived inputs.
//!
//! Everything here parses or matches attacker-controlled strings: callback
//! query strings, CSRF origin/referer headers, credentials and the values
//! that go into OAuth1 signatures. None of it may panic.
//!
//! # Running the Fuzz Tests
//!
//! ```bash
//! cargo +nightly install cargo-fuzz
//! cargo +nightly fuzz run fuzz_request_inputs -- -max_total_time=60
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tweeters_stats::middleware::CsrfPolicy;
use tweeters_stats::provider::oauth1::{normalize_parameters, percent_encode};
use tweeters_stats::provider::twitter::parse_callback_query;
use tweeters_stats::validation::{validate_credential, validate_host};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    query: &'a str,
    origin: Option<&'a str>,
    referer: Option<&'a str>,
    credential: &'a str,
    params: Vec<(&'a str, &'a str)>,
}

fuzz_target!(|input: Input<'_>| {
    let _ = parse_callback_query(input.query);

    let policy = CsrfPolicy::new("stats.example.com", "https://stats.example.com");
    let same_origin = policy.is_same_origin(input.origin, input.referer);
    if same_origin && input.origin != Some("https://stats.example.com") {
        let referer = input.referer.unwrap_or_default();
        assert!(
            referer == "https://stats.example.com"
                || referer.starts_with("https://stats.example.com/")
        );
    }

    let _ = validate_credential(input.credential, "access token");
    let _ = validate_host(input.credential);

    // Encoding output is restricted to the unreserved set plus %XX
    let encoded = percent_encode(input.credential);
    assert!(
        encoded
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"-._~%".contains(&b))
    );

    let params: Vec<(String, String)> = input
        .params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let _ = normalize_parameters(&params);
});
