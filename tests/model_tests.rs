//! Unit tests for the JSON shapes the frontend depends on.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::Utc;
use serde_json::json;

mod stats_tests {
    use super::*;
    use tweeters_stats::models::{AuthorStats, StatsResponse};

    fn author(name: &str, handle: &str, count: u32) -> AuthorStats {
        AuthorStats {
            display_name: name.to_string(),
            handle: handle.to_string(),
            count,
        }
    }

    #[test]
    fn test_author_stats_field_names() {
        let value = serde_json::to_value(author("John Smith0", "jsmith0", 2)).unwrap();

        assert_eq!(
            value,
            json!({ "fullName": "John Smith0", "username": "jsmith0", "tweetsCount": 2 })
        );
    }

    #[test]
    fn test_stats_response_wraps_data() {
        let response = StatsResponse {
            data: vec![author("John Smith0", "jsmith0", 2), author("John Smith1", "jsmith1", 1)],
        };

        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["data"].as_array().unwrap().len(), 2);
        assert_eq!(value["data"][0]["username"], "jsmith0");
        assert_eq!(value["data"][1]["tweetsCount"], 1);
    }

    #[test]
    fn test_empty_stats_is_empty_array() {
        let value = serde_json::to_value(StatsResponse { data: vec![] }).unwrap();

        assert_eq!(value, json!({ "data": [] }));
    }

    #[test]
    fn test_stats_response_deserialization() {
        let body = r#"{"data":[{"fullName":"A","username":"a","tweetsCount":3}]}"#;

        let response: StatsResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.data, vec![author("A", "a", 3)]);
    }

    #[test]
    fn test_unicode_display_name_preserved() {
        let json = serde_json::to_string(&author("Zoë 🐦", "zoe", 1)).unwrap();
        let parsed: AuthorStats = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.display_name, "Zoë 🐦");
    }
}

mod api_tests {
    use super::*;
    use tweeters_stats::models::HealthResponse;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: Utc::now(),
            uptime_seconds: 42,
        };

        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "healthy");
        assert_eq!(value["version"], "0.1.0");
        assert_eq!(value["uptime_seconds"], 42);
        assert!(value["timestamp"].is_string());
    }
}

mod credential_tests {
    use tweeters_stats::models::{SessionCredentials, TokenPair};

    #[test]
    fn test_debug_redacts_secrets() {
        let pair = TokenPair::new("token-123", "super-secret");
        let credentials = SessionCredentials::from(pair.clone());

        assert!(!format!("{pair:?}").contains("super-secret"));
        assert!(!format!("{credentials:?}").contains("super-secret"));
        assert!(format!("{credentials:?}").contains("token-123"));
    }

    #[test]
    fn test_session_credentials_from_token_pair() {
        let credentials = SessionCredentials::from(TokenPair::new("t", "s"));

        assert_eq!(credentials.access_token, "t");
        assert_eq!(credentials.access_secret, "s");
    }
}

mod config_tests {
    use tweeters_stats::Config;

    #[test]
    fn test_server_addr_format() {
        let config = Config {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };

        assert_eq!(config.server_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert_eq!(config.canonical_origin(), "http://localhost:3000");
        assert_eq!(config.timeline_count, 200);
        assert!(config.cors_domain.is_none());
        assert!(!config.metrics_enabled());
        assert!(config.validate().is_ok());
    }
}
