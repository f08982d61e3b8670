//! The request envelope — the unit of message passing throughout.

use crate::EnvelopeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tollgate_types::{Category, Method, RecordId, RequestId, UnmappedCategory};

/// One logical request travelling through the pipeline.
///
/// Parsed once at ingress ([`RequestEnvelope::from_json`]) and then
/// handed between services as a typed value. The entitlement engine
/// forwards it *unchanged* on pass; the only field any service ever
/// adds is `table`, derived server-side by the data router.
///
/// # Example
///
/// ```
/// use tollgate_envelope::RequestEnvelope;
///
/// let env = RequestEnvelope::from_json(
///     r#"{"request_id":"r1","token":"tok","method":"get","item_type":"animals"}"#,
/// ).unwrap();
/// assert_eq!(env.request_id.as_str(), "r1");
/// assert!(env.table.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Caller-supplied correlation id. Never generated here.
    pub request_id: RequestId,

    /// Opaque credential. Resolved to a role at every entitlement
    /// check; never logged or persisted alongside the decision.
    #[serde(default)]
    pub token: String,

    /// Request method, parsed case-insensitively.
    pub method: Method,

    /// Caller-supplied semantic category, kept as raw text until the
    /// data router maps it.
    pub item_type: String,

    /// Storage table, derived from `item_type` by the data router.
    ///
    /// `skip_deserializing`: a caller-supplied value is structurally
    /// ignored at the wire boundary, so the category-scoped check can
    /// only ever see a server-derived table.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Target record for PUT and DELETE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,

    /// Opaque content; required only for write actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl RequestEnvelope {
    /// Creates an envelope with the required fields; the rest default
    /// to `None`.
    #[must_use]
    pub fn new(
        request_id: impl Into<RequestId>,
        token: impl Into<String>,
        method: Method,
        item_type: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            token: token.into(),
            method,
            item_type: item_type.into(),
            table: None,
            record_id: None,
            payload: None,
        }
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Sets the PUT/DELETE target record.
    #[must_use]
    pub fn with_record_id(mut self, id: RecordId) -> Self {
        self.record_id = Some(id);
        self
    }

    /// Parses an ingress body.
    ///
    /// This is the only place wire bytes become an envelope. Anything
    /// unparseable (bad JSON or a missing required field) is
    /// [`EnvelopeError::Malformed`], a value to route rather than a
    /// fault to propagate.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Malformed`] with the parser detail and,
    /// when the body was valid JSON with a readable `request_id`, that
    /// id salvaged for correlation on the error result.
    pub fn from_json(body: &str) -> Result<Self, EnvelopeError> {
        serde_json::from_str(body).map_err(|e| EnvelopeError::Malformed {
            detail: e.to_string(),
            request_id: salvage_request_id(body),
        })
    }

    /// Serializes for the wire.
    ///
    /// # Errors
    ///
    /// Serialization of an envelope cannot realistically fail (all
    /// fields are JSON-representable); the `Result` mirrors serde's
    /// signature.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Resolves the caller-supplied item type to a category.
    ///
    /// # Errors
    ///
    /// Returns [`UnmappedCategory`] for item types outside the fixed
    /// mapping.
    pub fn category(&self) -> Result<Category, UnmappedCategory> {
        Category::parse(&self.item_type)
    }

    /// Returns a copy with `table` overwritten from the given category.
    ///
    /// Always overwrites, never preserves a pre-existing value, so a
    /// forged upstream `table` cannot survive into the category-scoped
    /// check even if one were injected on an internal queue.
    #[must_use]
    pub fn with_derived_table(mut self, category: Category) -> Self {
        self.table = Some(category.table().to_string());
        self
    }
}

/// Best-effort extraction of `request_id` from a body that failed
/// schema validation but may still be JSON.
fn salvage_request_id(body: &str) -> Option<RequestId> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("request_id")
        .and_then(Value::as_str)
        .map(RequestId::from)
}
