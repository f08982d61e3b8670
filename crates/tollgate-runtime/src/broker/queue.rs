//! Queue construction and delivery acknowledgement.

use super::error::BrokerError;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tollgate_types::DeliveryId;
use tracing::{debug, warn};

/// Requeue budget before an unacked message is diverted to the
/// dead-letter sink, or dropped when the queue has none attached.
pub const DEFAULT_MAX_REDELIVERIES: u32 = 5;

/// When a message is considered consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AckMode {
    /// Acknowledged on receive. A consumer that dies mid-processing
    /// loses the message (at-most-once).
    Early,
    /// Acknowledged explicitly after processing. A delivery dropped
    /// without ack is requeued (at-least-once).
    OnComplete,
}

impl AckMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AckMode::Early => "early",
            AckMode::OnComplete => "on-complete",
        }
    }
}

impl std::str::FromStr for AckMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "early" => Ok(AckMode::Early),
            "on-complete" | "oncomplete" => Ok(AckMode::OnComplete),
            other => Err(format!("unknown ack mode: {other}")),
        }
    }
}

/// A message in the channel, tagged with how often it has been
/// requeued. The counter travels with the body so a poison message
/// cannot cycle forever.
#[derive(Debug)]
struct Queued<T> {
    body: T,
    redeliveries: u32,
}

/// Creates a named bounded queue.
///
/// The receiver holds only a weak handle back into the channel for
/// redelivery, so the queue still closes once every [`QueueSender`]
/// is dropped.
#[must_use]
pub fn queue<T: Send + 'static>(
    name: &'static str,
    depth: usize,
    mode: AckMode,
) -> (QueueSender<T>, QueueReceiver<T>) {
    let (tx, rx) = mpsc::channel(depth);
    let requeue = tx.downgrade();
    (
        QueueSender { name, tx },
        QueueReceiver {
            name,
            rx,
            mode,
            requeue,
            dead_letter: None,
            max_redeliveries: DEFAULT_MAX_REDELIVERIES,
        },
    )
}

/// Producer half of a named queue.
#[derive(Debug)]
pub struct QueueSender<T> {
    name: &'static str,
    tx: mpsc::Sender<Queued<T>>,
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send + 'static> QueueSender<T> {
    /// Queue name, for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Publishes a message, waiting for capacity.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Closed`] if the consumer side is gone.
    pub async fn send(&self, message: T) -> Result<(), BrokerError> {
        self.tx
            .send(Queued {
                body: message,
                redeliveries: 0,
            })
            .await
            .map_err(|_| BrokerError::Closed { queue: self.name })?;
        debug!(queue = self.name, "message published");
        Ok(())
    }

    /// Publishes without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Full`] when at capacity and
    /// [`BrokerError::Closed`] when the consumer side is gone.
    pub fn try_send(&self, message: T) -> Result<(), BrokerError> {
        self.tx
            .try_send(Queued {
                body: message,
                redeliveries: 0,
            })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => BrokerError::Full { queue: self.name },
                mpsc::error::TrySendError::Closed(_) => BrokerError::Closed { queue: self.name },
            })
    }
}

/// Consumer half of a named queue.
#[derive(Debug)]
pub struct QueueReceiver<T> {
    name: &'static str,
    rx: mpsc::Receiver<Queued<T>>,
    mode: AckMode,
    requeue: mpsc::WeakSender<Queued<T>>,
    dead_letter: Option<mpsc::Sender<Queued<T>>>,
    max_redeliveries: u32,
}

impl<T: Send + 'static> QueueReceiver<T> {
    /// Queue name, for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Attaches a dead-letter sink.
    ///
    /// Messages that exhaust their requeue budget, and messages whose
    /// requeue finds the channel full or closed, are diverted to
    /// `sink` instead of being dropped.
    #[must_use]
    pub fn with_dead_letter(mut self, sink: &QueueSender<T>) -> Self {
        self.dead_letter = Some(sink.tx.clone());
        self
    }

    /// Overrides [`DEFAULT_MAX_REDELIVERIES`] for this queue.
    #[must_use]
    pub fn with_max_redeliveries(mut self, cap: u32) -> Self {
        self.max_redeliveries = cap;
        self
    }

    /// Receives the next delivery.
    ///
    /// Returns `None` once every sender is dropped and the buffer is
    /// drained.
    pub async fn recv(&mut self) -> Option<Delivery<T>> {
        let queued = self.rx.recv().await?;
        Some(self.deliver(queued))
    }

    /// Receives without waiting. Returns `None` when the queue is empty.
    pub fn try_recv(&mut self) -> Option<Delivery<T>> {
        let queued = self.rx.try_recv().ok()?;
        Some(self.deliver(queued))
    }

    fn deliver(&self, queued: Queued<T>) -> Delivery<T> {
        let (requeue, dead_letter) = match self.mode {
            AckMode::Early => (None, None),
            AckMode::OnComplete => (Some(self.requeue.clone()), self.dead_letter.clone()),
        };
        Delivery {
            id: DeliveryId::new(),
            queue: self.name,
            body: Some(queued.body),
            redeliveries: queued.redeliveries,
            requeue,
            dead_letter,
            max_redeliveries: self.max_redeliveries,
        }
    }
}

/// A single received message plus its acknowledgement state.
///
/// Under [`AckMode::OnComplete`], dropping a `Delivery` without calling
/// [`ack`](Delivery::ack) puts the body back on its queue for another
/// attempt, up to the queue's requeue budget; past the budget the body
/// goes to the dead-letter sink when one is attached. Under
/// [`AckMode::Early`] the drop is final.
#[derive(Debug)]
pub struct Delivery<T> {
    id: DeliveryId,
    queue: &'static str,
    body: Option<T>,
    redeliveries: u32,
    requeue: Option<mpsc::WeakSender<Queued<T>>>,
    dead_letter: Option<mpsc::Sender<Queued<T>>>,
    max_redeliveries: u32,
}

impl<T: Send + 'static> Delivery<T> {
    /// Unique id for this delivery attempt. Redeliveries get a new id.
    #[must_use]
    pub fn id(&self) -> DeliveryId {
        self.id
    }

    /// How many times this message was requeued before this delivery.
    /// Zero for a first attempt.
    #[must_use]
    pub fn redeliveries(&self) -> u32 {
        self.redeliveries
    }

    /// Borrows the message body.
    #[must_use]
    pub fn body(&self) -> &T {
        // body is only None after ack, which consumes self
        self.body.as_ref().expect("delivery body taken")
    }

    /// Acknowledges the delivery and takes ownership of the body.
    pub fn ack(mut self) -> T {
        self.requeue = None;
        self.dead_letter = None;
        // see body(): Some until consumed here
        self.body.take().expect("delivery body taken")
    }
}

impl<T> Drop for Delivery<T> {
    fn drop(&mut self) {
        let Some(body) = self.body.take() else { return };
        let Some(requeue) = self.requeue.take() else {
            return;
        };
        let mut queued = Queued {
            body,
            redeliveries: self.redeliveries + 1,
        };
        if self.redeliveries < self.max_redeliveries {
            if let Some(tx) = requeue.upgrade() {
                match tx.try_send(queued) {
                    Ok(()) => {
                        warn!(
                            queue = self.queue,
                            delivery = %self.id,
                            redeliveries = self.redeliveries + 1,
                            "unacked delivery requeued"
                        );
                        return;
                    }
                    Err(err) => queued = err.into_inner(),
                }
            }
        }
        // budget exhausted, or the queue could not take the body back
        if let Some(tx) = self.dead_letter.take() {
            if tx.try_send(queued).is_ok() {
                warn!(
                    queue = self.queue,
                    delivery = %self.id,
                    redeliveries = self.redeliveries,
                    "delivery diverted to dead-letter sink"
                );
                return;
            }
        }
        warn!(
            queue = self.queue,
            delivery = %self.id,
            "unacked delivery dropped, no dead-letter sink could take it"
        );
    }
}
