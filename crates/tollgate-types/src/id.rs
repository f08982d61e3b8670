//! Identifier types for Tollgate.
//!
//! Three distinct identities flow through the pipeline and must never be
//! conflated, so each gets its own newtype:
//!
//! - [`RequestId`] — caller-supplied correlation key (opaque string)
//! - [`DeliveryId`] — broker-assigned tag for one queue delivery
//! - [`RecordId`] — storage-assigned key for one persisted record

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-supplied correlation identifier.
///
/// The pipeline treats this as an opaque string: it is never generated,
/// parsed, or validated here. It exists so the original requester can
/// match a [`ResultEnvelope`] on the output channel back to the request
/// that produced it.
///
/// # Example
///
/// ```
/// use tollgate_types::RequestId;
///
/// let id = RequestId::new("req-2041");
/// assert_eq!(id.as_str(), "req-2041");
/// ```
///
/// [`ResultEnvelope`]: https://docs.rs/tollgate-envelope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Wraps a caller-supplied identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Broker-assigned tag for a single queue delivery.
///
/// A message that is redelivered (un-acked delivery dropped in
/// `OnComplete` ack mode) gets a fresh `DeliveryId` each time; the
/// [`RequestId`] stays the same. Delivery ids never leave the broker
/// layer; they exist for ack bookkeeping and log correlation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryId(pub Uuid);

#[allow(clippy::new_without_default)] // generated internally per delivery, explicit construction only
impl DeliveryId {
    /// Creates a new `DeliveryId` with a random UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dlv:{}", self.0)
    }
}

/// Storage-assigned key for a persisted record.
///
/// Assigned monotonically by the record store on insert. PUT and DELETE
/// target records by this key, never by "first match in the table".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Returns the inner key.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rec:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_is_opaque() {
        let id = RequestId::new("  anything goes, even spaces ");
        assert_eq!(id.as_str(), "  anything goes, even spaces ");
        assert_eq!(id.to_string(), "  anything goes, even spaces ");
    }

    #[test]
    fn request_id_round_trips_through_json() {
        let id = RequestId::new("req-7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"req-7\"");
        let back: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn delivery_ids_are_unique() {
        assert_ne!(DeliveryId::new(), DeliveryId::new());
    }

    #[test]
    fn record_id_display_and_order() {
        assert_eq!(RecordId(3).to_string(), "rec:3");
        assert!(RecordId(1) < RecordId(2));
    }
}
