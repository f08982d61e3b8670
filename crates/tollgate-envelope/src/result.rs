//! Result envelopes and persisted records.
//!
//! Every request resolves to exactly one [`ResultEnvelope`] on the
//! output channel — success, rejection, or structured error. There is
//! no unstructured failure surface at the boundary.

use crate::RequestEnvelope;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tollgate_types::{Method, RecordId, RequestId};

/// Terminal disposition of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The operation executed.
    Success,
    /// An entitlement check denied the request.
    Rejected,
    /// The request could not be processed (malformed, unmapped,
    /// storage failure, unrecognized method).
    Error,
}

/// Why a request was turned away short of execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    /// The permission policy denied the (role, category, action).
    Unauthorized,
    /// The body did not parse as a request envelope.
    InvalidFormat,
}

/// A persisted record, as created by an authorized POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Storage-assigned key.
    pub id: RecordId,
    /// Correlation id of the request that created the record.
    pub request_id: RequestId,
    /// Semantic category at creation time.
    pub item_type: String,
    /// Storage table the record lives in.
    pub table_name: String,
    /// Opaque content.
    pub payload: Option<Value>,
}

/// The envelope delivered to the output (and rejected) channels.
///
/// Construction is a pure function of its inputs: the same denied
/// envelope always produces an identical rejection shape, and each
/// error class has exactly one constructor here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// Correlation id. Absent only when the ingress body was
    /// unparseable beyond salvage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,

    /// Terminal disposition.
    pub status: Status,

    /// Human-readable detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Present on rejections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,

    /// Original method, echoed on rejections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,

    /// Original item type, echoed on rejections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    /// Derived table, echoed when it had been set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Query results, present on a successful GET.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Record>>,
}

impl ResultEnvelope {
    /// A successful mutation.
    #[must_use]
    pub fn success(request_id: RequestId, message: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id),
            status: Status::Success,
            message: Some(message.into()),
            reason: None,
            method: None,
            item_type: None,
            table: None,
            results: None,
        }
    }

    /// A successful query, carrying the matching records.
    #[must_use]
    pub fn success_with_results(request_id: RequestId, results: Vec<Record>) -> Self {
        Self {
            request_id: Some(request_id),
            status: Status::Success,
            message: None,
            reason: None,
            method: None,
            item_type: None,
            table: None,
            results: Some(results),
        }
    }

    /// An entitlement denial: `{status: rejected, reason: unauthorized}`
    /// plus the original envelope fields.
    #[must_use]
    pub fn rejected(envelope: &RequestEnvelope) -> Self {
        Self {
            request_id: Some(envelope.request_id.clone()),
            status: Status::Rejected,
            message: None,
            reason: Some(RejectReason::Unauthorized),
            method: Some(envelope.method.clone()),
            item_type: Some(envelope.item_type.clone()),
            table: envelope.table.clone(),
            results: None,
        }
    }

    /// An unparseable ingress body, with whatever correlation id could
    /// be salvaged.
    #[must_use]
    pub fn malformed(request_id: Option<RequestId>, detail: impl Into<String>) -> Self {
        Self {
            request_id,
            status: Status::Error,
            message: Some(detail.into()),
            reason: Some(RejectReason::InvalidFormat),
            method: None,
            item_type: None,
            table: None,
            results: None,
        }
    }

    /// An item type outside the fixed storage mapping.
    #[must_use]
    pub fn unmapped_category(envelope: &RequestEnvelope) -> Self {
        Self {
            request_id: Some(envelope.request_id.clone()),
            status: Status::Error,
            message: Some(format!(
                "no storage mapping for item type '{}'",
                envelope.item_type
            )),
            reason: None,
            method: Some(envelope.method.clone()),
            item_type: Some(envelope.item_type.clone()),
            table: None,
            results: None,
        }
    }

    /// Any executor-side failure (storage, missing record, missing
    /// record id, unrecognized method).
    #[must_use]
    pub fn error(request_id: RequestId, message: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id),
            status: Status::Error,
            message: Some(message.into()),
            reason: None,
            method: None,
            item_type: None,
            table: None,
            results: None,
        }
    }

    /// Serializes for the output consumer.
    ///
    /// # Errors
    ///
    /// Mirrors serde's signature; an envelope is always
    /// JSON-representable in practice.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_types::Category;

    fn denied_envelope() -> RequestEnvelope {
        RequestEnvelope::new("r1", "tok", Method::Post, "animals")
            .with_derived_table(Category::Animals)
    }

    #[test]
    fn rejection_echoes_original_fields() {
        let rejection = ResultEnvelope::rejected(&denied_envelope());
        assert_eq!(rejection.status, Status::Rejected);
        assert_eq!(rejection.reason, Some(RejectReason::Unauthorized));
        assert_eq!(rejection.method, Some(Method::Post));
        assert_eq!(rejection.item_type.as_deref(), Some("animals"));
        assert_eq!(rejection.table.as_deref(), Some("table1"));
    }

    #[test]
    fn rejection_is_idempotent_in_shape() {
        // Identical denied envelopes yield identical rejections.
        assert_eq!(
            ResultEnvelope::rejected(&denied_envelope()),
            ResultEnvelope::rejected(&denied_envelope())
        );
    }

    #[test]
    fn malformed_serializes_reason_as_kebab_case() {
        let result = ResultEnvelope::malformed(None, "expected value at line 1");
        let json = result.to_json().unwrap();
        assert!(json.contains("\"invalid-format\""));
        assert!(json.contains("\"error\""));
        assert!(!json.contains("request_id"));
    }

    #[test]
    fn success_with_results_carries_all_record_fields() {
        let record = Record {
            id: RecordId(1),
            request_id: RequestId::from("r0"),
            item_type: "animals".to_string(),
            table_name: "table1".to_string(),
            payload: Some(serde_json::json!("lynx")),
        };
        let result = ResultEnvelope::success_with_results(RequestId::from("r1"), vec![record]);
        let json = result.to_json().unwrap();
        for field in ["\"id\"", "\"request_id\"", "\"item_type\"", "\"table_name\"", "\"payload\""]
        {
            assert!(json.contains(field), "missing {field} in {json}");
        }
    }

    #[test]
    fn unmapped_category_names_the_offender() {
        let env = RequestEnvelope::new("r1", "tok", Method::Get, "minerals");
        let result = ResultEnvelope::unmapped_category(&env);
        assert_eq!(result.status, Status::Error);
        assert!(result.message.unwrap().contains("minerals"));
    }
}
