//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, status
//! - `http_request_duration_seconds` (histogram): latency by method
//! - `component_constructions_total` (counter): by component, outcome
//! - `shutdown_hook_duration_seconds` (histogram): by hook
//! - `endpoint_exits_total` (counter): by endpoint, outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is installed once by the composition root and
//!   served by the metrics endpoint

use std::time::{Duration, Instant};

use axum::{extract::State, routing::get, Router};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder.
pub fn install() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Router serving `GET /metrics` in the Prometheus text format.
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(render)).with_state(handle)
}

async fn render(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_construction(component: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!(
        "component_constructions_total",
        "component" => component.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_hook(hook: &str, elapsed: Duration) {
    metrics::histogram!("shutdown_hook_duration_seconds", "hook" => hook.to_string()).record(elapsed.as_secs_f64());
}

pub fn record_endpoint_exit(endpoint: &str, outcome: &'static str) {
    metrics::counter!(
        "endpoint_exits_total",
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
