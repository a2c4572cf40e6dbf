//! Error taxonomy shared by every protocol surface.
//!
//! # Data Flow
//! ```text
//! Handler / component failure
//!     → error.rs (wrap with operation label, optional canonical code)
//!     → kinds.rs (detail-bearing kinds: NotFound, BadRequest, ...)
//!     → [propagates through layers, one wrapper per layer]
//!
//! Protocol boundary:
//!     → http.rs (JSON envelope, status table, FromHttp)
//!     → rpc.rs (tonic Status with google.rpc details)
//! ```
//!
//! # Design Decisions
//! - One internal error type; wire forms exist only at the boundary
//! - Outermost explicit code wins; no explicit code means UNKNOWN
//! - Causes and details are closed enums matched by pattern, not downcast
//! - Operation chain is exposed as a debug detail, never in the message

pub mod code;
pub mod detail;
pub mod error;
pub mod http;
pub mod kinds;
pub mod rpc;

pub use code::Code;
pub use detail::DetailRecord;
pub use error::{Builder, Cause, Error, Interruption, Op, RemoteError, ResultExt};
pub use kinds::{BadRequest, Base, FailedPrecondition, FieldViolation, Kind, NotFound, ResourceExhausted};
