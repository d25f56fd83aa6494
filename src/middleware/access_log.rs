//! Access log in Apache combined format, plus elapsed seconds.
//!
//! ```text
//! 203.0.113.50 - - [15/Oct/2026 09:14:03] "GET /tweeters-stats HTTP/1.1" 200 312 "https://stats.example.com/" "Mozilla/5.0" 0.087
//! ```
//!
//! Exactly one record is emitted per request. The pipeline moves a
//! [`LogGuard`] into the response body ([`InstrumentedBody`]); the guard
//! counts the bytes handed to the transport and emits when the body ends,
//! fails, or is dropped, whichever happens first.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use chrono::{DateTime, Utc};
use http_body::{Body as HttpBody, Frame, SizeHint};
use tracing::{error, info};

use crate::metrics;

/// Tracing target of access-log events.
pub const ACCESS_LOG_TARGET: &str = "access_log";

/// `DD/Mon/YYYY HH:MM:SS`, UTC.
pub const TIMESTAMP_FORMAT: &str = "%d/%b/%Y %H:%M:%S";

/// One finished request.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessLogRecord {
    pub client_ip: String,
    pub timestamp: DateTime<Utc>,
    pub method: String,
    /// Request URI as received (path and query)
    pub uri: String,
    pub protocol: String,
    pub status: u16,
    /// Response body bytes actually produced
    pub bytes: u64,
    pub referer: String,
    pub user_agent: String,
    pub elapsed: Duration,
}

impl AccessLogRecord {
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl fmt::Display for AccessLogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - - [{}] \"{} {} {}\" {} {} \"{}\" \"{}\" {:.3}",
            self.client_ip,
            self.formatted_timestamp(),
            self.method,
            self.uri,
            self.protocol,
            self.status,
            self.bytes,
            self.referer,
            self.user_agent,
            self.elapsed.as_secs_f64(),
        )
    }
}

/// Destination of access-log records.
pub trait AccessLogSink: Send + Sync + 'static {
    fn record(&self, record: &AccessLogRecord);
}

/// Emits each record as a `tracing` event on [`ACCESS_LOG_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAccessLog;

impl AccessLogSink for TracingAccessLog {
    fn record(&self, record: &AccessLogRecord) {
        info!(
            target: ACCESS_LOG_TARGET,
            client_ip = %record.client_ip,
            method = %record.method,
            uri = %record.uri,
            protocol = %record.protocol,
            status = record.status,
            bytes = record.bytes,
            referer = %record.referer,
            user_agent = %record.user_agent,
            elapsed_secs = record.elapsed.as_secs_f64(),
            "{record}"
        );
    }
}

/// Keeps records in memory. Used by tests to assert on what was logged.
#[derive(Debug, Default)]
pub struct MemoryAccessLog {
    records: Mutex<Vec<AccessLogRecord>>,
}

impl MemoryAccessLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AccessLogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl AccessLogSink for MemoryAccessLog {
    fn record(&self, record: &AccessLogRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

/// Request-side fields captured before dispatch.
#[derive(Debug, Clone)]
pub struct RequestSummary {
    pub client_ip: String,
    pub method: String,
    pub uri: String,
    pub protocol: String,
    pub referer: String,
    pub user_agent: String,
}

/// Per-request instrumentation state. Emits its record once, at the latest
/// on drop.
pub struct LogGuard {
    pending: Option<(RequestSummary, Arc<dyn AccessLogSink>)>,
    started: Instant,
    status: u16,
    bytes: u64,
}

impl LogGuard {
    pub fn new(summary: RequestSummary, sink: Arc<dyn AccessLogSink>) -> Self {
        Self {
            pending: Some((summary, sink)),
            started: Instant::now(),
            status: 200,
            bytes: 0,
        }
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn add_bytes(&mut self, count: usize) {
        self.bytes = self.bytes.saturating_add(count as u64);
    }

    /// Emit the record. Later calls are no-ops.
    pub fn emit(&mut self) {
        let Some((summary, sink)) = self.pending.take() else {
            return;
        };

        let elapsed = self.started.elapsed();
        let record = AccessLogRecord {
            client_ip: summary.client_ip,
            timestamp: Utc::now(),
            method: summary.method,
            uri: summary.uri,
            protocol: summary.protocol,
            status: self.status,
            bytes: self.bytes,
            referer: summary.referer,
            user_agent: summary.user_agent,
            elapsed,
        };

        metrics::record_request(&record.method, record.status, elapsed.as_secs_f64());
        sink.record(&record);
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        self.emit();
    }
}

/// Response body that counts bytes and completes the access log.
///
/// A panic while producing a frame is caught: the record is completed with
/// status 500 and the bytes produced so far, and the body ends with an error.
pub struct InstrumentedBody {
    inner: Body,
    guard: LogGuard,
}

impl InstrumentedBody {
    pub fn new(inner: Body, guard: LogGuard) -> Self {
        Self { inner, guard }
    }
}

impl HttpBody for InstrumentedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();

        let polled = std::panic::catch_unwind(AssertUnwindSafe(|| {
            Pin::new(&mut this.inner).poll_frame(cx)
        }));

        match polled {
            Ok(Poll::Ready(Some(Ok(frame)))) => {
                if let Some(data) = frame.data_ref() {
                    this.guard.add_bytes(data.len());
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Ok(Poll::Ready(Some(Err(e)))) => {
                this.guard.emit();
                Poll::Ready(Some(Err(e)))
            }
            Ok(Poll::Ready(None)) => {
                this.guard.emit();
                Poll::Ready(None)
            }
            Ok(Poll::Pending) => Poll::Pending,
            Err(panic) => {
                error!(panic = %panic_message(panic.as_ref()), "Response body panicked");
                metrics::record_panic();
                this.guard.set_status(500);
                this.guard.emit();
                Poll::Ready(Some(Err(axum::Error::new("response body panicked"))))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "Unknown error"
    }
}
