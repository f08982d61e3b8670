//! Named, bounded, typed in-process queues.
//!
//! Every hand-off in the pipeline goes through a [`queue`]: a
//! `tokio::sync::mpsc` channel with a fixed name and depth. Consumers
//! receive [`Delivery`] wrappers whose acknowledgement timing is set
//! per queue by [`AckMode`]:
//!
//! | Mode         | Ack point                  | Guarantee       |
//! |--------------|----------------------------|-----------------|
//! | `Early`      | on receive                 | at-most-once    |
//! | `OnComplete` | explicit [`Delivery::ack`] | at-least-once   |
//!
//! Under `OnComplete`, a delivery dropped without ack is requeued onto
//! the same queue, so consumers must be idempotent for redelivered
//! messages. The requeue is budgeted: a message dropped un-acked more
//! than [`DEFAULT_MAX_REDELIVERIES`] times, or whose requeue finds the
//! channel full, is diverted to the queue's dead-letter sink instead of
//! cycling or vanishing (see [`QueueReceiver::with_dead_letter`]).

mod error;
mod queue;

pub use error::BrokerError;
pub use queue::{
    queue, AckMode, Delivery, QueueReceiver, QueueSender, DEFAULT_MAX_REDELIVERIES,
};

/// Queue names used by the gateway pipeline.
pub mod names {
    /// Raw JSON envelopes entering the gateway.
    pub const INGRESS: &str = "ingress";
    /// Parsed envelopes awaiting the coarse entitlement check.
    pub const COARSE_CHECK: &str = "coarse-check";
    /// Envelopes that passed the coarse check.
    pub const COARSE_PASS: &str = "coarse-pass";
    /// CRUD envelopes entering the data layer.
    pub const DATA_INGRESS: &str = "data-ingress";
    /// Table-bound envelopes awaiting the category-scoped check.
    pub const CATEGORY_CHECK: &str = "category-check";
    /// Envelopes cleared for execution.
    pub const CATEGORY_PASS: &str = "category-pass";
    /// Rejection notices for audit consumers.
    pub const REJECTED: &str = "rejected";
    /// Terminal results for the caller.
    pub const OUTPUT: &str = "output";
    /// Envelopes that exhausted their requeue budget.
    pub const DEAD_LETTER: &str = "dead-letter";
}
