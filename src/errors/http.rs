//! HTTP rendering of taxonomy errors and the inverse `FromHttp` direction.
//!
//! # Wire Format
//! ```text
//! {"error": {"code": 404, "message": "...", "status": "NOT_FOUND",
//!            "details": [{"@type": "google.rpc.RequestInfo", "value": "{...}"}, ...]}}
//! ```
//!
//! # Design Decisions
//! - `details` always starts with the merged request-info and debug-info
//! - Rendering is a pure function of (request id, error): no shared state
//! - A decoded envelope keeps its details so it can be re-rendered

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::code::Code;
pub use crate::errors::detail::merge;
use crate::errors::detail::{DebugInfo, DetailRecord, RequestInfo};
use crate::errors::error::{Error, RemoteError};

/// Top-level HTTP error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    pub status: String,
    #[serde(default)]
    pub details: Vec<DetailRecord>,
}

impl HttpResponse {
    /// Render `err` for the request `request_id`.
    pub fn from_error(request_id: &str, err: &Error) -> Self {
        let code = err.canonical_code();
        let debug = DetailRecord::DebugInfo(DebugInfo {
            stack_entries: err.ops().into_iter().map(String::from).collect(),
            detail: String::new(),
        });
        let request = DetailRecord::RequestInfo(RequestInfo {
            request_id: request_id.to_string(),
            serving_data: String::new(),
        });

        Self {
            error: ErrorBody {
                code: code.http_status(),
                message: err.description(),
                status: code.as_str().to_string(),
                details: merge([debug, request].into_iter().chain(err.details())),
            },
        }
    }

    pub fn code(&self) -> Code {
        Code::from_token(&self.error.status)
    }
}

/// Summary left in response extensions for the access log.
#[derive(Debug, Clone)]
pub struct ErrorSummary {
    pub status: &'static str,
    pub message: String,
}

/// An error rendered for one request, ready to be returned by a handler.
#[derive(Debug, Clone)]
pub struct HttpFailure {
    code: Code,
    body: HttpResponse,
}

impl HttpFailure {
    pub fn new(request_id: &str, err: &Error) -> Self {
        Self {
            code: err.canonical_code(),
            body: HttpResponse::from_error(request_id, err),
        }
    }

    pub fn body(&self) -> &HttpResponse {
        &self.body
    }
}

impl IntoResponse for HttpFailure {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.body.error.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let summary = ErrorSummary {
            status: self.code.as_str(),
            message: self.body.error.message.clone(),
        };
        let mut response = (status, Json(self.body)).into_response();
        response.extensions_mut().insert(summary);
        response
    }
}

impl IntoResponse for Error {
    /// Renders with a fresh request id; prefer
    /// [`RequestContext::fail`](crate::http::RequestContext::fail) inside handlers.
    fn into_response(self) -> Response {
        HttpFailure::new(&Uuid::new_v4().to_string(), &self).into_response()
    }
}

/// Decode a peer's response. `None` below 400.
///
/// A parsable envelope yields an error with the peer's code, message and
/// details under the operation `"<METHOD> <url>"`; anything else is an
/// `Internal` (undecodable JSON) or `Unknown` (JSON without an error code)
/// failure.
pub fn from_http(method: &str, url: &str, status: u16, body: &[u8]) -> Option<Error> {
    if status < 400 {
        return None;
    }

    let envelope: HttpResponse = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) => return Some(Error::new(e).with_code(Code::Internal)),
    };

    if envelope.error.code == 0 {
        let text = String::from_utf8_lossy(body).into_owned();
        return Some(Error::new(text).with_code(Code::Unknown));
    }

    let code = envelope.code();
    let remote = RemoteError {
        message: envelope.error.message,
        details: envelope.error.details,
    };
    Some(Error::new(remote).with_code(code).with_op(format!("{method} {url}")))
}

/// Pass a successful response through, or turn a failed one into an [`Error`].
pub async fn check_response(method: &str, response: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.bytes().await.map_err(|e| Error::new(e).with_code(Code::Internal))?;
    match from_http(method, &url, status, &body) {
        Some(err) => Err(err),
        None => Err(Error::new(format!("unexpected status {status}")).with_code(Code::Unknown)),
    }
}
