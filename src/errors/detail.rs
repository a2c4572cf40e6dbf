//! Structured detail records attached to errors.
//!
//! Payloads mirror the `google.rpc` error detail messages so the same record
//! can be packed into a gRPC status or rendered into the HTTP envelope as
//! `{"@type": "google.rpc.ResourceInfo", "value": "<json>"}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const DEBUG_INFO: &str = "google.rpc.DebugInfo";
const REQUEST_INFO: &str = "google.rpc.RequestInfo";
const RESOURCE_INFO: &str = "google.rpc.ResourceInfo";
const QUOTA_FAILURE: &str = "google.rpc.QuotaFailure";
const PRECONDITION_FAILURE: &str = "google.rpc.PreconditionFailure";
const BAD_REQUEST: &str = "google.rpc.BadRequest";
const ERROR_INFO: &str = "google.rpc.ErrorInfo";

fn is_empty(s: &str) -> bool {
    s.is_empty()
}

/// Operation chain of the failing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugInfo {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stack_entries: Vec<String>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
    #[serde(default, skip_serializing_if = "is_empty")]
    pub request_id: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub serving_data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    #[serde(default, skip_serializing_if = "is_empty")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub resource_name: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub owner: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaViolation {
    #[serde(default, skip_serializing_if = "is_empty")]
    pub subject: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaFailure {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<QuotaViolation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreconditionViolation {
    #[serde(rename = "type", default, skip_serializing_if = "is_empty")]
    pub violation_type: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub subject: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreconditionFailure {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<PreconditionViolation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolationInfo {
    #[serde(default, skip_serializing_if = "is_empty")]
    pub field: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadRequestInfo {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_violations: Vec<FieldViolationInfo>,
}

/// Generic detail; also the fallback synthesized from an error message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(default, skip_serializing_if = "is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub domain: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ErrorInfo {
    pub fn from_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            ..Self::default()
        }
    }
}

/// A typed detail payload.
///
/// `Other` keeps records of unrecognised type verbatim so that a decoded
/// envelope can be re-rendered without loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDetail", into = "RawDetail")]
pub enum DetailRecord {
    DebugInfo(DebugInfo),
    RequestInfo(RequestInfo),
    ResourceInfo(ResourceInfo),
    QuotaFailure(QuotaFailure),
    PreconditionFailure(PreconditionFailure),
    BadRequest(BadRequestInfo),
    ErrorInfo(ErrorInfo),
    Other { type_name: String, value: String },
}

impl DetailRecord {
    /// Fully-qualified message name used as `@type`.
    pub fn type_name(&self) -> &str {
        match self {
            DetailRecord::DebugInfo(_) => DEBUG_INFO,
            DetailRecord::RequestInfo(_) => REQUEST_INFO,
            DetailRecord::ResourceInfo(_) => RESOURCE_INFO,
            DetailRecord::QuotaFailure(_) => QUOTA_FAILURE,
            DetailRecord::PreconditionFailure(_) => PRECONDITION_FAILURE,
            DetailRecord::BadRequest(_) => BAD_REQUEST,
            DetailRecord::ErrorInfo(_) => ERROR_INFO,
            DetailRecord::Other { type_name, .. } => type_name,
        }
    }

    /// JSON encoding of the payload.
    pub fn value_json(&self) -> String {
        let encoded = match self {
            DetailRecord::DebugInfo(v) => serde_json::to_string(v),
            DetailRecord::RequestInfo(v) => serde_json::to_string(v),
            DetailRecord::ResourceInfo(v) => serde_json::to_string(v),
            DetailRecord::QuotaFailure(v) => serde_json::to_string(v),
            DetailRecord::PreconditionFailure(v) => serde_json::to_string(v),
            DetailRecord::BadRequest(v) => serde_json::to_string(v),
            DetailRecord::ErrorInfo(v) => serde_json::to_string(v),
            DetailRecord::Other { value, .. } => return value.clone(),
        };
        // Plain structs of strings cannot fail to serialize.
        encoded.unwrap_or_else(|_| "{}".to_string())
    }

    /// Rebuild a record from its `@type` and JSON value.
    pub fn decode(type_name: &str, value: &str) -> Self {
        let decoded = match type_name {
            DEBUG_INFO => serde_json::from_str(value).map(DetailRecord::DebugInfo),
            REQUEST_INFO => serde_json::from_str(value).map(DetailRecord::RequestInfo),
            RESOURCE_INFO => serde_json::from_str(value).map(DetailRecord::ResourceInfo),
            QUOTA_FAILURE => serde_json::from_str(value).map(DetailRecord::QuotaFailure),
            PRECONDITION_FAILURE => serde_json::from_str(value).map(DetailRecord::PreconditionFailure),
            BAD_REQUEST => serde_json::from_str(value).map(DetailRecord::BadRequest),
            ERROR_INFO => serde_json::from_str(value).map(DetailRecord::ErrorInfo),
            _ => return Self::other(type_name, value),
        };
        decoded.unwrap_or_else(|_| Self::other(type_name, value))
    }

    fn other(type_name: &str, value: &str) -> Self {
        DetailRecord::Other {
            type_name: type_name.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawDetail {
    #[serde(rename = "@type")]
    type_name: String,
    #[serde(default)]
    value: String,
}

impl From<RawDetail> for DetailRecord {
    fn from(raw: RawDetail) -> Self {
        DetailRecord::decode(&raw.type_name, &raw.value)
    }
}

impl From<DetailRecord> for RawDetail {
    fn from(record: DetailRecord) -> Self {
        RawDetail {
            type_name: record.type_name().to_string(),
            value: record.value_json(),
        }
    }
}

fn overwrite(target: &mut String, value: String) {
    if !value.is_empty() {
        *target = value;
    }
}

/// Collapse request-info and debug-info records into one of each.
///
/// The merged pair always leads the output (request info first); scalar
/// fields take the last non-empty value and stack entries accumulate. Every
/// other record is appended in order.
pub fn merge(records: impl IntoIterator<Item = DetailRecord>) -> Vec<DetailRecord> {
    let mut request = RequestInfo::default();
    let mut debug = DebugInfo::default();
    let mut rest = Vec::new();

    for record in records {
        match record {
            DetailRecord::RequestInfo(info) => {
                overwrite(&mut request.request_id, info.request_id);
                overwrite(&mut request.serving_data, info.serving_data);
            }
            DetailRecord::DebugInfo(info) => {
                debug.stack_entries.extend(info.stack_entries);
                overwrite(&mut debug.detail, info.detail);
            }
            other => rest.push(other),
        }
    }

    let mut merged = Vec::with_capacity(rest.len() + 2);
    merged.push(DetailRecord::RequestInfo(request));
    merged.push(DetailRecord::DebugInfo(debug));
    merged.extend(rest);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let record = DetailRecord::ResourceInfo(ResourceInfo {
            resource_type: "user".into(),
            resource_name: "42".into(),
            ..ResourceInfo::default()
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["@type"], "google.rpc.ResourceInfo");
        assert_eq!(json["value"], r#"{"resource_type":"user","resource_name":"42"}"#);
    }

    #[test]
    fn test_decode_keeps_unknown_types() {
        let json = r#"{"@type":"acme.v1.Extra","value":"{\"a\":1}"}"#;
        let record: DetailRecord = serde_json::from_str(json).unwrap();
        assert_eq!(
            record,
            DetailRecord::Other {
                type_name: "acme.v1.Extra".into(),
                value: r#"{"a":1}"#.into(),
            }
        );
        assert_eq!(serde_json::to_string(&record).unwrap(), json);
    }

    #[test]
    fn test_decode_bad_value_falls_back() {
        let record = DetailRecord::decode("google.rpc.ErrorInfo", "not json");
        assert_eq!(record.type_name(), "google.rpc.ErrorInfo");
        assert!(matches!(record, DetailRecord::Other { .. }));
    }

    #[test]
    fn test_merge_collapses_request_and_debug() {
        let merged = merge(vec![
            DetailRecord::DebugInfo(DebugInfo {
                stack_entries: vec!["outer".into()],
                detail: String::new(),
            }),
            DetailRecord::RequestInfo(RequestInfo {
                request_id: "req-1".into(),
                serving_data: "edge".into(),
            }),
            DetailRecord::ErrorInfo(ErrorInfo::from_reason("boom")),
            DetailRecord::DebugInfo(DebugInfo {
                stack_entries: vec!["inner".into()],
                detail: "remote".into(),
            }),
            DetailRecord::RequestInfo(RequestInfo {
                request_id: "req-2".into(),
                serving_data: String::new(),
            }),
        ]);

        assert_eq!(merged.len(), 3);
        assert_eq!(
            merged[0],
            DetailRecord::RequestInfo(RequestInfo {
                request_id: "req-2".into(),
                serving_data: "edge".into(),
            })
        );
        assert_eq!(
            merged[1],
            DetailRecord::DebugInfo(DebugInfo {
                stack_entries: vec!["outer".into(), "inner".into()],
                detail: "remote".into(),
            })
        );
        assert_eq!(merged[2], DetailRecord::ErrorInfo(ErrorInfo::from_reason("boom")));
    }
}
