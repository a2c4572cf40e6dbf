//! The taxonomy error value and its operation chain.
//!
//! # Responsibilities
//! - Wrap a failure with an operation label and an optional canonical code
//! - Walk the chain: operations (outermost first), code, root cause
//! - Produce detail records from the root cause
//!
//! # Design Decisions
//! - A wrapper always has a cause; "no error" is `None` from [`Builder::build`]
//! - `Code` is governed by the outermost explicit code in the chain
//! - Cancellation and deadline causes resolve their own code only when no
//!   layer set one explicitly

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::errors::code::Code;
use crate::errors::detail::{DetailRecord, ErrorInfo};
use crate::errors::kinds::{BadRequest, Base, FailedPrecondition, FieldViolation, Kind, NotFound, ResourceExhausted};
use crate::BoxError;

/// Operation label attached at one wrapping level.
pub type Op = Cow<'static, str>;

/// Interruption of the surrounding work rather than a failure of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interruption {
    #[error("operation canceled")]
    Canceled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl Interruption {
    pub fn code(self) -> Code {
        match self {
            Interruption::Canceled => Code::Canceled,
            Interruption::DeadlineExceeded => Code::DeadlineExceeded,
        }
    }
}

impl From<tokio::time::error::Elapsed> for Interruption {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Interruption::DeadlineExceeded
    }
}

/// Failure reported by another instance through its HTTP envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
    pub details: Vec<DetailRecord>,
}

/// What an [`Error`] wraps.
#[derive(Debug)]
pub enum Cause {
    /// Another taxonomy layer.
    Wrapped(Box<Error>),
    Kind(Kind),
    /// A status received from an RPC peer, details included.
    Status(tonic::Status),
    Remote(RemoteError),
    Interrupted(Interruption),
    Other(BoxError),
}

impl Cause {
    fn as_std(&self) -> &(dyn StdError + 'static) {
        match self {
            Cause::Wrapped(e) => &**e,
            Cause::Kind(k) => k,
            Cause::Status(s) => s,
            Cause::Remote(r) => r,
            Cause::Interrupted(i) => i,
            Cause::Other(e) => e.as_ref(),
        }
    }

    /// Detail records produced by a terminal cause.
    fn details(&self) -> Vec<DetailRecord> {
        match self {
            Cause::Wrapped(e) => e.details(),
            Cause::Kind(k) => vec![k.detail()],
            Cause::Status(s) => crate::errors::rpc::status_details(s),
            Cause::Remote(r) => r.details.clone(),
            Cause::Interrupted(i) => vec![DetailRecord::ErrorInfo(ErrorInfo::from_reason(i.to_string()))],
            Cause::Other(e) => vec![DetailRecord::ErrorInfo(ErrorInfo::from_reason(e.to_string()))],
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Status(s) => f.write_str(s.message()),
            other => fmt::Display::fmt(other.as_std(), f),
        }
    }
}

impl From<Error> for Cause {
    fn from(e: Error) -> Self {
        Cause::Wrapped(Box::new(e))
    }
}

impl From<Kind> for Cause {
    fn from(k: Kind) -> Self {
        Cause::Kind(k)
    }
}

impl From<NotFound> for Cause {
    fn from(e: NotFound) -> Self {
        Cause::Kind(e.into())
    }
}

impl From<ResourceExhausted> for Cause {
    fn from(e: ResourceExhausted) -> Self {
        Cause::Kind(e.into())
    }
}

impl From<FailedPrecondition> for Cause {
    fn from(e: FailedPrecondition) -> Self {
        Cause::Kind(e.into())
    }
}

impl From<BadRequest> for Cause {
    fn from(e: BadRequest) -> Self {
        Cause::Kind(e.into())
    }
}

impl From<tonic::Status> for Cause {
    fn from(s: tonic::Status) -> Self {
        Cause::Status(s)
    }
}

impl From<RemoteError> for Cause {
    fn from(e: RemoteError) -> Self {
        Cause::Remote(e)
    }
}

impl From<Interruption> for Cause {
    fn from(i: Interruption) -> Self {
        Cause::Interrupted(i)
    }
}

impl From<tokio::time::error::Elapsed> for Cause {
    fn from(e: tokio::time::error::Elapsed) -> Self {
        Cause::Interrupted(e.into())
    }
}

impl From<BoxError> for Cause {
    fn from(e: BoxError) -> Self {
        Cause::Other(e)
    }
}

impl From<std::io::Error> for Cause {
    fn from(e: std::io::Error) -> Self {
        Cause::Other(Box::new(e))
    }
}

impl From<serde_json::Error> for Cause {
    fn from(e: serde_json::Error) -> Self {
        Cause::Other(Box::new(e))
    }
}

impl From<reqwest::Error> for Cause {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Cause::Interrupted(Interruption::DeadlineExceeded);
        }
        Cause::Other(Box::new(e))
    }
}

impl From<String> for Cause {
    fn from(message: String) -> Self {
        Cause::Other(message.into())
    }
}

impl From<&'static str> for Cause {
    fn from(message: &'static str) -> Self {
        Cause::Other(message.into())
    }
}

/// A failure wrapped with an operation label and optional canonical code.
#[derive(Debug)]
pub struct Error {
    op: Option<Op>,
    code: Option<Code>,
    cause: Cause,
}

impl Error {
    pub fn new(cause: impl Into<Cause>) -> Self {
        Self {
            op: None,
            code: None,
            cause: cause.into(),
        }
    }

    /// Wrap `cause` under operation `op`.
    pub fn wrap(op: impl Into<Op>, cause: impl Into<Cause>) -> Self {
        Self::new(cause).with_op(op)
    }

    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Set this layer's operation label.
    pub fn with_op(mut self, op: impl Into<Op>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Set this layer's code.
    pub fn with_code(mut self, code: Code) -> Self {
        self.code = Some(code);
        self
    }

    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::from_kind(NotFound::new(resource_type, id).into())
    }

    pub fn resource_exhausted(subject: impl Into<String>, description: impl Into<String>) -> Self {
        Self::from_kind(ResourceExhausted::new(subject, description).into())
    }

    pub fn failed_precondition(
        precondition_type: impl Into<String>,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::from_kind(FailedPrecondition::new(precondition_type, subject, description).into())
    }

    pub fn bad_request(violations: impl IntoIterator<Item = FieldViolation>) -> Self {
        Self::from_kind(BadRequest::new(violations).into())
    }

    fn from_kind(kind: Kind) -> Self {
        let code = kind.natural_code();
        Self::new(kind).with_code(code)
    }

    /// Operation labels, outermost first.
    pub fn ops(&self) -> Vec<&str> {
        let mut ops = Vec::new();
        let mut layer = Some(self);
        while let Some(err) = layer {
            if let Some(op) = err.op.as_deref().filter(|op| !op.is_empty()) {
                ops.push(op);
            }
            layer = err.inner();
        }
        ops
    }

    /// The outermost explicitly set code, or `Unknown`.
    pub fn code(&self) -> Code {
        self.explicit_code().unwrap_or(Code::Unknown)
    }

    pub fn explicit_code(&self) -> Option<Code> {
        let mut layer = Some(self);
        while let Some(err) = layer {
            if err.code.is_some() {
                return err.code;
            }
            layer = err.inner();
        }
        None
    }

    /// The code rendered on the wire.
    ///
    /// Same as [`Error::code`], except that an interrupted root cause with no
    /// explicit code anywhere resolves to `Canceled` / `DeadlineExceeded`.
    pub fn canonical_code(&self) -> Code {
        match (self.explicit_code(), self.root_cause()) {
            (Some(code), _) => code,
            (None, Cause::Interrupted(i)) => i.code(),
            (None, _) => Code::Unknown,
        }
    }

    /// The first non-taxonomy cause.
    pub fn root_cause(&self) -> &Cause {
        let mut err = self;
        while let Cause::Wrapped(inner) = &err.cause {
            err = &**inner;
        }
        &err.cause
    }

    /// Text of the root cause; the user-facing message.
    pub fn description(&self) -> String {
        self.root_cause().to_string()
    }

    /// Detail records of the root cause, or a generic record built from its
    /// message.
    pub fn details(&self) -> Vec<DetailRecord> {
        self.root_cause().details()
    }

    /// The base error of a predefined kind at the root, if any.
    pub fn base(&self) -> Option<Base> {
        match self.root_cause() {
            Cause::Kind(kind) => Some(kind.base()),
            _ => None,
        }
    }

    fn inner(&self) -> Option<&Error> {
        match &self.cause {
            Cause::Wrapped(inner) => Some(&**inner),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ops = self.ops();
        if !ops.is_empty() {
            write!(f, "op = {}, ", ops.join(" > "))?;
        }
        write!(f, "code = {}, desc = {}", self.code(), self.root_cause())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause.as_std())
    }
}

/// Supply any subset of operation, code and cause, in any order.
#[derive(Debug, Default)]
pub struct Builder {
    op: Option<Op>,
    code: Option<Code>,
    cause: Option<Cause>,
}

impl Builder {
    pub fn op(mut self, op: impl Into<Op>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn code(mut self, code: Code) -> Self {
        self.code = Some(code);
        self
    }

    pub fn cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// `None` when no cause was supplied: there is nothing to report.
    pub fn build(self) -> Option<Error> {
        let cause = self.cause?;
        Some(Error {
            op: self.op,
            code: self.code,
            cause,
        })
    }
}

/// Wrap the error side of a `Result` in a taxonomy layer.
pub trait ResultExt<T> {
    fn op(self, op: impl Into<Op>) -> Result<T, Error>;
    fn code(self, code: Code) -> Result<T, Error>;
}

impl<T, E: Into<Cause>> ResultExt<T> for Result<T, E> {
    fn op(self, op: impl Into<Op>) -> Result<T, Error> {
        self.map_err(|e| Error::wrap(op, e))
    }

    fn code(self, code: Code) -> Result<T, Error> {
        self.map_err(|e| Error::new(e).with_code(code))
    }
}
