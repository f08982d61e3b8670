//! Terminal result consumption.
//!
//! The output queue is the single place every request resolves, so the
//! sink offers two reads: [`recv`](OutputSink::recv) for a plain
//! drain, and [`wait_for`](OutputSink::wait_for) for callers tracking
//! one request among interleaved traffic. Results that arrive while
//! waiting for a different request are stashed, not dropped.

use crate::broker::{Delivery, QueueReceiver};
use std::collections::VecDeque;
use tollgate_envelope::ResultEnvelope;
use tollgate_types::RequestId;

/// Consumer over the output queue.
#[derive(Debug)]
pub struct OutputSink {
    rx: QueueReceiver<ResultEnvelope>,
    stash: VecDeque<ResultEnvelope>,
}

impl OutputSink {
    #[must_use]
    pub fn new(rx: QueueReceiver<ResultEnvelope>) -> Self {
        Self {
            rx,
            stash: VecDeque::new(),
        }
    }

    /// Receives the next result, oldest stashed first.
    ///
    /// Returns `None` once the queue is closed and the stash drained.
    pub async fn recv(&mut self) -> Option<ResultEnvelope> {
        if let Some(stashed) = self.stash.pop_front() {
            return Some(stashed);
        }
        // terminal channel: results are acked on receipt, the stash
        // keeps anything not yet claimed
        self.rx.recv().await.map(Delivery::ack)
    }

    /// Waits for the result of one request, stashing everything else.
    ///
    /// Returns `None` if the queue closes before that result arrives.
    pub async fn wait_for(&mut self, request_id: &RequestId) -> Option<ResultEnvelope> {
        if let Some(index) = self
            .stash
            .iter()
            .position(|r| r.request_id.as_ref() == Some(request_id))
        {
            return self.stash.remove(index);
        }

        loop {
            let result = self.rx.recv().await?.ack();
            if result.request_id.as_ref() == Some(request_id) {
                return Some(result);
            }
            self.stash.push_back(result);
        }
    }

    /// Number of results received but not yet claimed.
    #[must_use]
    pub fn stashed(&self) -> usize {
        self.stash.len()
    }
}
