//! The request pipeline wrapped around every route.
//!
//! Order of operations per request:
//!
//! ```text
//! instrument → catch panics → capture client identity → security headers
//!   → CORS headers → CSRF check ─┬─ 403 (empty body)
//!                                ├─ OPTIONS: 200 (empty body, no dispatch)
//!                                └─ dispatch to router
//! ```
//!
//! Every outcome, including rejections and recovered panics, leaves through
//! an [`InstrumentedBody`] so the access log fires exactly once.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{Method, Request, Response, StatusCode};
use futures::FutureExt;
use tower::{Layer, Service};
use tracing::{error, warn};

use super::access_log::{
    AccessLogSink, InstrumentedBody, LogGuard, RequestSummary, TracingAccessLog, panic_message,
};
use super::csrf::CsrfPolicy;
use super::headers::{merge_missing, response_headers};
use super::ip::{extract_client_ip, referer, user_agent};
use crate::config::Config;
use crate::metrics;

/// Body of the fallback response after a handler panic.
pub const INTERNAL_ERROR_BODY: &str = "Internal Error\n";

/// Settings captured from [`Config`] when the router is built.
#[derive(Clone)]
pub struct PipelineConfig {
    csrf: CsrfPolicy,
    cors_origin: Option<HeaderValue>,
    sink: Arc<dyn AccessLogSink>,
}

impl PipelineConfig {
    pub fn new(csrf: CsrfPolicy, cors_origin: Option<HeaderValue>) -> Self {
        Self {
            csrf,
            cors_origin,
            sink: Arc::new(TracingAccessLog),
        }
    }

    /// Canonical host/origin for CSRF and the optional CORS origin.
    ///
    /// `CORS_DOMAIN` is checked by `Config::validate`; a value that is not a
    /// valid header is ignored here.
    pub fn from_config(config: &Config) -> Self {
        let cors_origin = config
            .cors_domain
            .as_deref()
            .and_then(|domain| HeaderValue::from_str(domain).ok());

        Self::new(
            CsrfPolicy::new(config.host.clone(), config.canonical_origin()),
            cors_origin,
        )
    }

    /// Replace the default `tracing` access-log sink.
    pub fn with_sink(mut self, sink: Arc<dyn AccessLogSink>) -> Self {
        self.sink = sink;
        self
    }
}

/// Layer applying the pipeline to a service.
#[derive(Clone)]
pub struct PipelineLayer {
    config: Arc<PipelineConfig>,
    headers: Arc<HeaderMap>,
}

impl PipelineLayer {
    pub fn new(config: PipelineConfig) -> Self {
        let headers = response_headers(config.cors_origin.as_ref());
        Self {
            config: Arc::new(config),
            headers: Arc::new(headers),
        }
    }
}

impl<S> Layer<S> for PipelineLayer {
    type Service = PipelineService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PipelineService {
            inner,
            config: self.config.clone(),
            headers: self.headers.clone(),
        }
    }
}

/// Pipeline service wrapper.
#[derive(Clone)]
pub struct PipelineService<S> {
    inner: S,
    config: Arc<PipelineConfig>,
    headers: Arc<HeaderMap>,
}

impl<S> Service<Request<Body>> for PipelineService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut guard = LogGuard::new(summarize(&req), self.config.sink.clone());
        let headers = self.headers.clone();

        if let Err(rejection) = self.config.csrf.check(&req) {
            warn!(
                method = %req.method(),
                path = %req.uri().path(),
                reason = %rejection,
                "Request rejected by CSRF policy"
            );
            metrics::record_csrf_rejection(rejection.reason());
            let response = empty_response(StatusCode::FORBIDDEN, &headers);
            return Box::pin(async move { Ok(instrument(response, guard)) });
        }

        if req.method() == Method::OPTIONS {
            let response = empty_response(StatusCode::OK, &headers);
            return Box::pin(async move { Ok(instrument(response, guard)) });
        }

        let mut inner = self.inner.clone();

        Box::pin(async move {
            // The inner call runs inside the guarded future so a panic while
            // building the handler future is caught as well
            let dispatched = AssertUnwindSafe(async move { inner.call(req).await })
                .catch_unwind()
                .await;

            let response = match dispatched {
                Ok(Ok(mut response)) => {
                    merge_missing(response.headers_mut(), &headers);
                    response
                }
                Ok(Err(e)) => {
                    guard.set_status(StatusCode::INTERNAL_SERVER_ERROR.as_u16());
                    return Err(e);
                }
                Err(panic) => {
                    error!(panic = %panic_message(panic.as_ref()), "Handler panicked");
                    metrics::record_panic();
                    internal_error_response(&headers)
                }
            };

            Ok(instrument(response, guard))
        })
    }
}

fn summarize<B>(req: &Request<B>) -> RequestSummary {
    RequestSummary {
        client_ip: extract_client_ip(req).into_owned(),
        method: req.method().to_string(),
        uri: req
            .uri()
            .path_and_query()
            .map_or_else(|| req.uri().to_string(), |pq| pq.to_string()),
        protocol: format!("{:?}", req.version()),
        referer: referer(req).into_owned(),
        user_agent: user_agent(req).into_owned(),
    }
}

fn empty_response(status: StatusCode, headers: &HeaderMap) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response.headers_mut().extend(headers.clone());
    response
}

fn internal_error_response(headers: &HeaderMap) -> Response<Body> {
    let mut response = Response::new(Body::from(INTERNAL_ERROR_BODY));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().extend(headers.clone());
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Hand the guard to the response body, recording the final status.
fn instrument(response: Response<Body>, mut guard: LogGuard) -> Response<Body> {
    guard.set_status(response.status().as_u16());
    response.map(|body| Body::new(InstrumentedBody::new(body, guard)))
}
