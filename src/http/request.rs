//! Per-request context for handlers.
//!
//! # Responsibilities
//! - Expose the request id assigned by the request-id layer
//! - Render handler failures as the JSON error envelope for that id
//!
//! # Design Decisions
//! - Extraction never fails: a missing id is replaced by a fresh UUID
//! - Handlers return `Result<_, HttpFailure>` so `?` works after `.op(..)`

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, Method},
};
use tower_http::request_id::RequestId;
use uuid::Uuid;

use crate::errors::http::HttpFailure;
use crate::errors::{Cause, Error, Op};
use crate::http::X_REQUEST_ID;

/// Request id, method and path of the request being handled.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub method: Method,
    pub path: String,
}

impl RequestContext {
    /// Wrap `cause` under `op` and render it for this request.
    pub fn fail(&self, op: impl Into<Op>, cause: impl Into<Cause>) -> HttpFailure {
        self.render(&Error::wrap(op, cause))
    }

    pub fn render(&self, err: &Error) -> HttpFailure {
        tracing::debug!(request_id = %self.request_id, error = %err, "Rendering request error");
        HttpFailure::new(&self.request_id, err)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_layer = parts
            .extensions
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .map(str::to_string);
        let from_header = || {
            parts
                .headers
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let request_id = from_layer
            .or_else(from_header)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(Self {
            request_id,
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_reads_header_when_layer_absent() {
        let (mut parts, _) = Request::builder()
            .uri("/users/1")
            .header(X_REQUEST_ID, "abc-123")
            .body(())
            .unwrap()
            .into_parts();

        let ctx = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.request_id, "abc-123");
        assert_eq!(ctx.path, "/users/1");
    }

    #[tokio::test]
    async fn test_generates_id_when_missing() {
        let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        let ctx = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(Uuid::parse_str(&ctx.request_id).is_ok());
    }

    #[test]
    fn test_fail_uses_context_request_id() {
        let ctx = RequestContext {
            request_id: "req-5".into(),
            method: Method::GET,
            path: "/".into(),
        };
        let failure = ctx.fail("users.get", Error::not_found("user", "1"));
        assert_eq!(failure.body().error.code, 404);
        assert!(failure.body().error.details.iter().any(|d| matches!(
            d,
            crate::errors::DetailRecord::RequestInfo(info) if info.request_id == "req-5"
        )));
    }
}
