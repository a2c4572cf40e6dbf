//! RPC rendering of taxonomy errors (tonic status + google.rpc details).
//!
//! # Responsibilities
//! - Turn an [`Error`] into a `tonic::Status` with debug, request and kind
//!   details packed in `grpc-status-details-bin`
//! - Turn a status received from a peer back into an [`Error`]
//! - Read the request id a caller propagated in metadata

use std::collections::HashMap;

use tonic_types::{ErrorDetail, ErrorDetails, StatusExt};
use uuid::Uuid;

use crate::errors::code::Code;
use crate::errors::detail::{
    merge, BadRequestInfo, DebugInfo, DetailRecord, ErrorInfo, FieldViolationInfo, PreconditionFailure,
    PreconditionViolation, QuotaFailure, QuotaViolation, RequestInfo, ResourceInfo,
};
use crate::errors::error::Error;
use crate::http::X_REQUEST_ID;

impl Error {
    /// Render as an RPC status for the request `request_id`.
    pub fn to_status(&self, request_id: &str) -> tonic::Status {
        let code = self.canonical_code();
        let records = merge(
            [
                DetailRecord::DebugInfo(DebugInfo {
                    stack_entries: self.ops().into_iter().map(String::from).collect(),
                    detail: String::new(),
                }),
                DetailRecord::RequestInfo(RequestInfo {
                    request_id: request_id.to_string(),
                    serving_data: String::new(),
                }),
            ]
            .into_iter()
            .chain(self.details()),
        );

        let mut details = ErrorDetails::new();
        for record in records {
            pack(&mut details, record);
        }

        tonic::Status::with_error_details(code.into(), self.description(), details)
    }

    /// Adopt a status returned by a peer, keeping it as the cause.
    pub fn from_status(status: tonic::Status) -> Self {
        let code = Code::from(status.code());
        Error::new(status).with_code(code)
    }
}

/// Renders under a fresh request id. Handlers that have the caller's
/// request should use [`Error::to_status`] with [`request_id`] instead.
impl From<Error> for tonic::Status {
    fn from(err: Error) -> Self {
        err.to_status(&Uuid::new_v4().to_string())
    }
}

/// The caller's `x-request-id`, or a fresh one.
pub fn request_id<T>(request: &tonic::Request<T>) -> String {
    request
        .metadata()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn pack(details: &mut ErrorDetails, record: DetailRecord) {
    match record {
        DetailRecord::DebugInfo(info) => {
            details.set_debug_info(info.stack_entries, info.detail);
        }
        DetailRecord::RequestInfo(info) => {
            details.set_request_info(info.request_id, info.serving_data);
        }
        DetailRecord::ResourceInfo(info) => {
            details.set_resource_info(info.resource_type, info.resource_name, info.owner, info.description);
        }
        DetailRecord::QuotaFailure(info) => {
            for v in info.violations {
                details.add_quota_failure_violation(v.subject, v.description);
            }
        }
        DetailRecord::PreconditionFailure(info) => {
            for v in info.violations {
                details.add_precondition_failure_violation(v.violation_type, v.subject, v.description);
            }
        }
        DetailRecord::BadRequest(info) => {
            for v in info.field_violations {
                details.add_bad_request_violation(v.field, v.description);
            }
        }
        DetailRecord::ErrorInfo(info) => {
            let metadata: HashMap<String, String> = info.metadata.into_iter().collect();
            details.set_error_info(info.reason, info.domain, metadata);
        }
        // Unknown payloads cannot be packed as google.rpc messages.
        DetailRecord::Other { type_name, .. } => {
            tracing::debug!(type_name = %type_name, "Dropping unsupported RPC detail");
        }
    }
}

/// Detail records carried by a received status.
pub(crate) fn status_details(status: &tonic::Status) -> Vec<DetailRecord> {
    status
        .get_error_details_vec()
        .into_iter()
        .filter_map(|detail| match detail {
            ErrorDetail::DebugInfo(info) => Some(DetailRecord::DebugInfo(DebugInfo {
                stack_entries: info.stack_entries,
                detail: info.detail,
            })),
            ErrorDetail::RequestInfo(info) => Some(DetailRecord::RequestInfo(RequestInfo {
                request_id: info.request_id,
                serving_data: info.serving_data,
            })),
            ErrorDetail::ResourceInfo(info) => Some(DetailRecord::ResourceInfo(ResourceInfo {
                resource_type: info.resource_type,
                resource_name: info.resource_name,
                owner: info.owner,
                description: info.description,
            })),
            ErrorDetail::QuotaFailure(info) => Some(DetailRecord::QuotaFailure(QuotaFailure {
                violations: info
                    .violations
                    .into_iter()
                    .map(|v| QuotaViolation {
                        subject: v.subject,
                        description: v.description,
                    })
                    .collect(),
            })),
            ErrorDetail::PreconditionFailure(info) => Some(DetailRecord::PreconditionFailure(PreconditionFailure {
                violations: info
                    .violations
                    .into_iter()
                    .map(|v| PreconditionViolation {
                        violation_type: v.r#type,
                        subject: v.subject,
                        description: v.description,
                    })
                    .collect(),
            })),
            ErrorDetail::BadRequest(info) => Some(DetailRecord::BadRequest(BadRequestInfo {
                field_violations: info
                    .field_violations
                    .into_iter()
                    .map(|v| FieldViolationInfo {
                        field: v.field,
                        description: v.description,
                    })
                    .collect(),
            })),
            ErrorDetail::ErrorInfo(info) => Some(DetailRecord::ErrorInfo(ErrorInfo {
                reason: info.reason,
                domain: info.domain,
                metadata: info.metadata.into_iter().collect(),
            })),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Interruption;

    #[test]
    fn test_status_carries_code_message_and_details() {
        let err = Error::wrap("users.get", Error::not_found("user", "42"));
        let status = err.to_status("req-7");

        assert_eq!(status.code(), tonic::Code::NotFound);
        assert_eq!(status.message(), r#"not found, type = "user", id = "42""#);

        let details = status.get_error_details();
        let debug = details.debug_info().expect("debug info");
        assert_eq!(debug.stack_entries, vec!["users.get".to_string()]);
        let request = details.request_info().expect("request info");
        assert_eq!(request.request_id, "req-7");
        let resource = details.resource_info().expect("resource info");
        assert_eq!(resource.resource_type, "user");
        assert_eq!(resource.resource_name, "42");
    }

    #[test]
    fn test_deadline_without_code() {
        let status = Error::wrap("call", Interruption::DeadlineExceeded).to_status("r");
        assert_eq!(status.code(), tonic::Code::DeadlineExceeded);
    }

    #[test]
    fn test_from_status_keeps_remote_details() {
        let remote = Error::bad_request([crate::errors::FieldViolation::new("name", "required")])
            .with_op("users.create")
            .to_status("upstream-1");

        let err = Error::from_status(remote).with_op("gateway.create");
        assert_eq!(err.code(), Code::InvalidArgument);
        assert_eq!(err.ops(), vec!["gateway.create"]);

        let local = err.to_status("edge-1");
        let details = local.get_error_details();
        // The peer's request id is written after ours and wins the merge.
        assert_eq!(details.request_info().map(|r| r.request_id.clone()), Some("upstream-1".into()));
        let stack = details.debug_info().map(|d| d.stack_entries.clone()).unwrap_or_default();
        assert_eq!(stack, vec!["gateway.create".to_string(), "users.create".to_string()]);
        assert!(details.bad_request().is_some());
    }

    #[test]
    fn test_precondition_violation_survives_status() {
        let remote = Error::failed_precondition("CONFIG", "components.peer", "no peer configured")
            .with_op("rest.get_peer_user")
            .to_status("upstream-2");

        let err = Error::from_status(remote);
        assert_eq!(err.code(), Code::FailedPrecondition);
        let violation = err.details().into_iter().find_map(|record| match record {
            DetailRecord::PreconditionFailure(info) => info.violations.into_iter().next(),
            _ => None,
        });
        assert_eq!(
            violation,
            Some(PreconditionViolation {
                violation_type: "CONFIG".into(),
                subject: "components.peer".into(),
                description: "no peer configured".into(),
            })
        );
    }
}
