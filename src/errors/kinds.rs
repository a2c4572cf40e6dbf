//! Predefined detail-bearing error kinds.
//!
//! Each kind wraps a fixed [`Base`] error (its `source()`), so callers can
//! test "is this a not-found?" without caring about the payload.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::errors::code::Code;
use crate::errors::detail::{
    BadRequestInfo, DetailRecord, FieldViolationInfo, PreconditionFailure, PreconditionViolation,
    QuotaFailure, QuotaViolation, ResourceInfo,
};

/// The fixed base errors behind each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Base {
    #[error("not found")]
    NotFound,
    #[error("resource exhausted")]
    ResourceExhausted,
    #[error("failed precondition")]
    FailedPrecondition,
    #[error("bad request")]
    BadRequest,
}

/// A resource of `resource_type` identified by `id` does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    pub resource_type: String,
    pub id: String,
}

impl NotFound {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, type = {:?}, id = {:?}", Base::NotFound, self.resource_type, self.id)
    }
}

impl StdError for NotFound {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&Base::NotFound)
    }
}

/// A quota on `subject` ran out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceExhausted {
    pub subject: String,
    pub description: String,
}

impl ResourceExhausted {
    pub fn new(subject: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for ResourceExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, subject = {:?}, desc = {:?}",
            Base::ResourceExhausted,
            self.subject,
            self.description
        )
    }
}

impl StdError for ResourceExhausted {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&Base::ResourceExhausted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPrecondition {
    pub precondition_type: String,
    pub subject: String,
    pub description: String,
}

impl FailedPrecondition {
    pub fn new(
        precondition_type: impl Into<String>,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            precondition_type: precondition_type.into(),
            subject: subject.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for FailedPrecondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, type = {:?}, subject = {:?}, desc = {:?}",
            Base::FailedPrecondition,
            self.precondition_type,
            self.subject,
            self.description
        )
    }
}

impl StdError for FailedPrecondition {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&Base::FailedPrecondition)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub description: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            description: description.into(),
        }
    }
}

/// One or more request fields failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadRequest {
    pub field_violations: Vec<FieldViolation>,
}

impl BadRequest {
    pub fn new(violations: impl IntoIterator<Item = FieldViolation>) -> Self {
        Self {
            field_violations: violations.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.field_violations.is_empty()
    }
}

impl fmt::Display for BadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};", Base::BadRequest)?;
        for v in &self.field_violations {
            write!(f, " field = {:?}, desc = {:?};", v.field, v.description)?;
        }
        Ok(())
    }
}

impl StdError for BadRequest {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&Base::BadRequest)
    }
}

/// Closed set of detail-bearing kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Kind {
    #[error(transparent)]
    NotFound(#[from] NotFound),
    #[error(transparent)]
    ResourceExhausted(#[from] ResourceExhausted),
    #[error(transparent)]
    FailedPrecondition(#[from] FailedPrecondition),
    #[error(transparent)]
    BadRequest(#[from] BadRequest),
}

impl Kind {
    pub fn base(&self) -> Base {
        match self {
            Kind::NotFound(_) => Base::NotFound,
            Kind::ResourceExhausted(_) => Base::ResourceExhausted,
            Kind::FailedPrecondition(_) => Base::FailedPrecondition,
            Kind::BadRequest(_) => Base::BadRequest,
        }
    }

    /// The code a convenience constructor attaches to this kind.
    pub fn natural_code(&self) -> Code {
        match self {
            Kind::NotFound(_) => Code::NotFound,
            Kind::ResourceExhausted(_) => Code::ResourceExhausted,
            Kind::FailedPrecondition(_) => Code::FailedPrecondition,
            Kind::BadRequest(_) => Code::InvalidArgument,
        }
    }

    pub fn detail(&self) -> DetailRecord {
        match self {
            Kind::NotFound(e) => DetailRecord::ResourceInfo(ResourceInfo {
                resource_type: e.resource_type.clone(),
                resource_name: e.id.clone(),
                ..ResourceInfo::default()
            }),
            Kind::ResourceExhausted(e) => DetailRecord::QuotaFailure(QuotaFailure {
                violations: vec![QuotaViolation {
                    subject: e.subject.clone(),
                    description: e.description.clone(),
                }],
            }),
            Kind::FailedPrecondition(e) => DetailRecord::PreconditionFailure(PreconditionFailure {
                violations: vec![PreconditionViolation {
                    violation_type: e.precondition_type.clone(),
                    subject: e.subject.clone(),
                    description: e.description.clone(),
                }],
            }),
            Kind::BadRequest(e) => DetailRecord::BadRequest(BadRequestInfo {
                field_violations: e
                    .field_violations
                    .iter()
                    .map(|v| FieldViolationInfo {
                        field: v.field.clone(),
                        description: v.description.clone(),
                    })
                    .collect(),
            }),
        }
    }
}
