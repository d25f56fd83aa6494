//! HTTP middleware: the request pipeline and its parts.
//!
//! - **Access log**: one Apache combined line per request, written when the
//!   response body completes
//! - **Panic recovery**: handler panics become `500 Internal Error`
//! - **Security headers**: fixed CSP/HSTS/nosniff/frame-options set
//! - **CORS**: grant for one configured origin, with credentials
//! - **CSRF**: marker header, canonical host and same-origin checks on
//!   every non-exempt path
//!
//! # Architecture
//!
//! ```text
//! Request → PipelineLayer ─┬─ 403 (CSRF) ──────────────┐
//!                          ├─ 200 (OPTIONS) ───────────┤
//!                          └─ Router → Handler ────────┤
//!                                                      ↓
//!                              headers merged, body instrumented → access log
//! ```

pub mod access_log;
pub mod csrf;
pub mod headers;
pub mod ip;
pub mod pipeline;

pub use access_log::{AccessLogRecord, AccessLogSink, MemoryAccessLog, TracingAccessLog};
pub use csrf::{CsrfPolicy, CsrfRejection, EXEMPT_PATHS};
pub use ip::{PLACEHOLDER, extract_client_ip};
pub use pipeline::{INTERNAL_ERROR_BODY, PipelineConfig, PipelineLayer, PipelineService};
