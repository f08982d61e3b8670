//! Envelope layer errors.
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`EnvelopeError::Malformed`] | `ENVELOPE_MALFORMED` | No |
//! | [`EnvelopeError::UnmappedCategory`] | `ENVELOPE_UNMAPPED_CATEGORY` | No |
//!
//! Both are caller mistakes: the same bytes will fail the same way on
//! retry. Neither is ever propagated as a fault — the services convert
//! them into structured error results on the output channel.

use thiserror::Error;
use tollgate_types::{ErrorCode, RequestId, UnmappedCategory};

/// Failure to turn wire bytes into a routable envelope.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvelopeError {
    /// The ingress body did not parse as a request envelope.
    #[error("malformed envelope: {detail}")]
    Malformed {
        /// Parser diagnostic, surfaced in the error result.
        detail: String,
        /// Correlation id salvaged from the body, when it was valid
        /// JSON with a readable `request_id`.
        request_id: Option<RequestId>,
    },

    /// The item type has no storage mapping.
    #[error(transparent)]
    UnmappedCategory(#[from] UnmappedCategory),
}

impl ErrorCode for EnvelopeError {
    fn code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "ENVELOPE_MALFORMED",
            Self::UnmappedCategory(_) => "ENVELOPE_UNMAPPED_CATEGORY",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
