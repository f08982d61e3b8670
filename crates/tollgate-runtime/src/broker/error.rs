//! Broker error types.

use thiserror::Error;
use tollgate_types::ErrorCode;

/// Errors raised by queue operations.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The consumer side of the queue is gone.
    #[error("queue '{queue}' is closed")]
    Closed { queue: &'static str },

    /// The queue is at capacity.
    #[error("queue '{queue}' is full")]
    Full { queue: &'static str },
}

impl ErrorCode for BrokerError {
    fn code(&self) -> &'static str {
        match self {
            BrokerError::Closed { .. } => "BROKER_QUEUE_CLOSED",
            BrokerError::Full { .. } => "BROKER_QUEUE_FULL",
        }
    }

    fn is_recoverable(&self) -> bool {
        // a full queue drains; a closed queue never reopens
        matches!(self, BrokerError::Full { .. })
    }
}
