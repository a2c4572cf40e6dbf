//! Request middleware: access log and deadline.
//!
//! The access log emits one event per request with method, path, status and
//! latency. Failed requests also carry the canonical status token and error
//! message left by [`HttpFailure`](crate::errors::http::HttpFailure).

use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::http::ErrorSummary;
use crate::errors::Interruption;
use crate::http::{RequestContext, X_REQUEST_ID};
use crate::observability::metrics;

/// Bound the time spent in the inner service. An overrun is rendered as a
/// `DEADLINE_EXCEEDED` envelope for the current request id.
pub async fn deadline(State(limit): State<Duration>, ctx: RequestContext, request: Request, next: Next) -> Response {
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(elapsed) => ctx.fail("http.timeout", Interruption::from(elapsed)).into_response(),
    }
}

pub async fn access_log(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = start.elapsed().as_millis() as u64;
    metrics::record_request(method.as_str(), status, start);

    match response.extensions().get::<ErrorSummary>() {
        Some(summary) => tracing::warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            code = summary.status,
            error = %summary.message,
            latency_ms,
            "Request failed"
        ),
        None => tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms,
            "Request completed"
        ),
    }

    response
}
