//! HTTP request/response tracing middleware.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, TraceLayer};
use tracing::{Span, info_span};

/// Creates a tracing middleware for HTTP requests.
///
/// Opens one INFO span per request carrying the method and path, and logs
/// the status code and latency when the response is produced. Redirects
/// dominate this service's traffic, so the span is kept small: no headers,
/// no bodies.
pub fn layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    fn(&Request<Body>) -> Span,
    DefaultOnRequest,
    fn(&Response<Body>, Duration, &Span),
> {
    TraceLayer::new_for_http()
        .make_span_with(make_span as fn(&Request<Body>) -> Span)
        .on_response(log_response as fn(&Response<Body>, Duration, &Span))
}

fn make_span(request: &Request<Body>) -> Span {
    info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
    )
}

fn log_response(response: &Response<Body>, latency: Duration, _span: &Span) {
    tracing::info!(
        status = response.status().as_u16(),
        latency_ms = latency.as_millis() as u64,
        "request completed"
    );
}
