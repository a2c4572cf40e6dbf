//! HTTP surface shared by every REST endpoint.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → server.rs (request id, trace span, access log, timeout)
//!     → request.rs (RequestContext extractor in handlers)
//!     → handler returns Ok(..) or HttpFailure
//!     → middleware.rs (access log reads the ErrorSummary extension)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod server;

/// Header carrying the request id, generated when absent and echoed back.
pub const X_REQUEST_ID: &str = "x-request-id";

pub use request::RequestContext;
pub use server::layered;
