//! Prometheus metrics for the stats service.
//!
//! Metrics are exposed on a dedicated listener when `METRICS_PORT` is set.
//!
//! # Available Metrics
//!
//! ## Counters
//! - `tweeters_http_requests_total` - Finished requests (labels: method, status)
//! - `tweeters_csrf_rejections_total` - Requests refused by the CSRF policy (label: reason)
//! - `tweeters_panics_total` - Handler panics recovered by the pipeline
//! - `tweeters_upstream_calls_total` - Provider API calls (labels: operation, outcome)
//!
//! ## Histograms
//! - `tweeters_http_request_duration_seconds` - Request duration (label: method)
//! - `tweeters_upstream_duration_seconds` - Provider API call duration (label: operation)
//!
//! Recording functions are no-ops until [`init_metrics`] installs a recorder.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "tweeters_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "tweeters_http_request_duration_seconds";
    pub const CSRF_REJECTIONS_TOTAL: &str = "tweeters_csrf_rejections_total";
    pub const PANICS_TOTAL: &str = "tweeters_panics_total";
    pub const UPSTREAM_CALLS_TOTAL: &str = "tweeters_upstream_calls_total";
    pub const UPSTREAM_DURATION_SECONDS: &str = "tweeters_upstream_duration_seconds";
}

/// Install the Prometheus exporter and describe every metric.
///
/// # Errors
///
/// Returns a message if the exporter cannot bind or a recorder is already
/// installed.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(names::HTTP_REQUESTS_TOTAL, "Total number of HTTP requests served");
    describe_counter!(
        names::CSRF_REJECTIONS_TOTAL,
        "Total number of requests rejected by the CSRF policy"
    );
    describe_counter!(
        names::PANICS_TOTAL,
        "Total number of handler panics recovered"
    );
    describe_counter!(
        names::UPSTREAM_CALLS_TOTAL,
        "Total number of calls to the identity provider API"
    );

    describe_histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );
    describe_histogram!(
        names::UPSTREAM_DURATION_SECONDS,
        "Identity provider API call duration in seconds"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

/// Record one finished HTTP request.
pub fn record_request(method: &str, status: u16, duration_secs: f64) {
    counter!(names::HTTP_REQUESTS_TOTAL, "method" => method.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, "method" => method.to_string())
        .record(duration_secs);
}

/// Record a CSRF rejection. `reason` is a short static label.
pub fn record_csrf_rejection(reason: &'static str) {
    counter!(names::CSRF_REJECTIONS_TOTAL, "reason" => reason).increment(1);
}

/// Record a recovered handler panic.
pub fn record_panic() {
    counter!(names::PANICS_TOTAL).increment(1);
}

/// Record one provider API call and its latency.
pub fn record_upstream_call(operation: &str, success: bool, duration_secs: f64) {
    let outcome = if success { "success" } else { "failure" };
    counter!(names::UPSTREAM_CALLS_TOTAL, "operation" => operation.to_string(), "outcome" => outcome)
        .increment(1);
    histogram!(names::UPSTREAM_DURATION_SECONDS, "operation" => operation.to_string())
        .record(duration_secs);
}
