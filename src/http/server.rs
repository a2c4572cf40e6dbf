//! Router assembly for REST endpoints.
//!
//! # Responsibilities
//! - Wire up middleware (request id, tracing, access log, timeout)
//! - Render unmatched routes as a `NOT_FOUND` error envelope
//!
//! # Design Decisions
//! - Request id is set outermost so every inner layer and handler sees it
//! - Deadline is innermost so a timed-out request is still access-logged
//!   with its `DEADLINE_EXCEEDED` summary

use std::time::Duration;

use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::schema::HttpConfig;
use crate::errors::http::HttpFailure;
use crate::errors::Error;
use crate::http::middleware::{access_log, deadline};
use crate::http::RequestContext;

/// Apply the shared middleware stack to an application router.
pub fn layered(router: Router, config: &HttpConfig) -> Router {
    let limit = Duration::from_secs(config.request_timeout_secs);
    router.fallback(route_not_found).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(middleware::from_fn(access_log))
            .layer(middleware::from_fn_with_state(limit, deadline)),
    )
}

async fn route_not_found(ctx: RequestContext) -> HttpFailure {
    ctx.fail("http.route", Error::not_found("route", ctx.path.as_str()))
}
