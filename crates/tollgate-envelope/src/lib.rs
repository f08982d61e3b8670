//! Message types for the Tollgate pipeline.
//!
//! Every hop in the gateway exchanges one of two messages:
//!
//! | Type | Direction | Carries |
//! |------|-----------|---------|
//! | [`RequestEnvelope`] | ingress → checks → executor | one logical request |
//! | [`ResultEnvelope`] | any service → output / rejected | one terminal disposition |
//!
//! # Wire boundary
//!
//! The external wire format is UTF-8 JSON and exists only at the edges:
//! [`RequestEnvelope::from_json`] is the single ingress parse point, and
//! [`ResultEnvelope`] serializes for the output consumer. Between
//! services the envelopes travel as typed values, so a message cannot
//! become unparseable mid-pipeline.
//!
//! # Hardening
//!
//! The `table` field of [`RequestEnvelope`] is `skip_deserializing`: a
//! caller can write `"table": "table1"` into the ingress body and the
//! parsed envelope still has `table: None`. Only the data router ever
//! sets it, from the server-side category mapping — which is what the
//! category-scoped entitlement check then trusts.

mod error;
mod request;
mod result;

pub use error::EnvelopeError;
pub use request::RequestEnvelope;
pub use result::{Record, RejectReason, ResultEnvelope, Status};
