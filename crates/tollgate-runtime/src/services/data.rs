//! Table derivation and CRUD execution.
//!
//! The data service owns both data-layer hops:
//!
//! 1. `route_ingress`: maps `item_type` to its storage table and stamps
//!    the envelope with it. The table a caller may have written is
//!    overwritten unconditionally; an item type with no mapping ends
//!    the request with an error result.
//! 2. `execute_passed`: runs envelopes cleared by the category-scoped
//!    check against the [`RecordStore`] and publishes exactly one
//!    result per envelope.
//!
//! Replay safety: POST is keyed on `request_id`. A redelivered insert
//! finds the record it already created and reports success without
//! inserting twice, which is what lets the broker run at-least-once.

use crate::broker::{QueueReceiver, QueueSender};
use crate::storage::{NewRecord, RecordStore, StorageError};
use std::sync::Arc;
use tokio::sync::broadcast;
use tollgate_envelope::{RequestEnvelope, ResultEnvelope};
use tracing::{debug, warn};

/// Data router and executor over a pluggable store.
#[derive(Debug)]
pub struct DataService<S> {
    store: Arc<S>,
    category_check: QueueSender<RequestEnvelope>,
    output: QueueSender<ResultEnvelope>,
}

impl<S> Clone for DataService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            category_check: self.category_check.clone(),
            output: self.output.clone(),
        }
    }
}

impl<S: RecordStore> DataService<S> {
    #[must_use]
    pub fn new(
        store: Arc<S>,
        category_check: QueueSender<RequestEnvelope>,
        output: QueueSender<ResultEnvelope>,
    ) -> Self {
        Self {
            store,
            category_check,
            output,
        }
    }

    /// Consumes CRUD envelopes and stamps their storage table.
    pub async fn route_ingress(
        self,
        mut ingress_rx: QueueReceiver<RequestEnvelope>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    debug!("data router shutting down");
                    break;
                }
                delivery = ingress_rx.recv() => {
                    let Some(delivery) = delivery else { break };
                    let envelope = delivery.body();
                    match envelope.category() {
                        Ok(category) => {
                            let stamped = envelope.clone().with_derived_table(category);
                            debug!(
                                request_id = %stamped.request_id,
                                table = category.table(),
                                "table derived"
                            );
                            if let Err(err) = self.category_check.send(stamped).await {
                                warn!(error = %err, "category-check queue unavailable, stopping");
                                break;
                            }
                        }
                        Err(unmapped) => {
                            warn!(
                                request_id = %envelope.request_id,
                                error = %unmapped,
                                "unmapped item type"
                            );
                            let notice = ResultEnvelope::unmapped_category(envelope);
                            if let Err(err) = self.output.send(notice).await {
                                warn!(error = %err, "output queue unavailable, stopping");
                                break;
                            }
                        }
                    }
                    delivery.ack();
                }
            }
        }
    }

    /// Consumes envelopes cleared by the category-scoped check and
    /// executes them.
    ///
    /// The delivery is acked only after the result has been published,
    /// so a crash between store write and publish leads to redelivery,
    /// not a lost result.
    pub async fn execute_passed(
        self,
        mut pass_rx: QueueReceiver<RequestEnvelope>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    debug!("data executor shutting down");
                    break;
                }
                delivery = pass_rx.recv() => {
                    let Some(delivery) = delivery else { break };
                    let result = self.execute(delivery.body()).await;
                    if let Err(err) = self.output.send(result).await {
                        warn!(error = %err, "output queue unavailable, stopping");
                        break;
                    }
                    delivery.ack();
                }
            }
        }
    }

    /// Executes one cleared envelope against the store.
    ///
    /// Always returns a result envelope; storage failures are folded
    /// into an error result rather than surfaced to the loop.
    pub async fn execute(&self, envelope: &RequestEnvelope) -> ResultEnvelope {
        use tollgate_types::Method;

        let request_id = envelope.request_id.clone();
        let Some(table) = envelope.table.as_deref() else {
            // the router always stamps a table before the check tier
            warn!(request_id = %request_id, "envelope reached executor without a table");
            return ResultEnvelope::error(request_id, "no storage table derived");
        };

        let outcome = match &envelope.method {
            Method::Post => self.execute_post(envelope, table).await,
            Method::Get => self.execute_get(envelope, table).await,
            Method::Put => self.execute_put(envelope, table).await,
            Method::Delete => self.execute_delete(envelope, table).await,
            Method::Other(name) => {
                return ResultEnvelope::error(
                    request_id,
                    format!("unrecognized method '{name}', no operation performed"),
                );
            }
        };

        match outcome {
            Ok(result) => result,
            Err(err) => {
                warn!(request_id = %request_id, error = %err, "storage operation failed");
                ResultEnvelope::error(request_id, format!("storage operation failed: {err}"))
            }
        }
    }

    async fn execute_post(
        &self,
        envelope: &RequestEnvelope,
        table: &str,
    ) -> Result<ResultEnvelope, StorageError> {
        // replayed request_id: the record already exists, report the
        // original outcome instead of inserting twice
        if let Some(existing) = self.store.find_by_request_id(&envelope.request_id).await? {
            debug!(request_id = %envelope.request_id, record = %existing.id, "duplicate insert ignored");
            return Ok(ResultEnvelope::success(
                envelope.request_id.clone(),
                "Record inserted",
            ));
        }

        self.store
            .insert(NewRecord {
                request_id: envelope.request_id.clone(),
                item_type: envelope.item_type.clone(),
                table_name: table.to_string(),
                payload: envelope.payload.clone(),
            })
            .await?;
        Ok(ResultEnvelope::success(
            envelope.request_id.clone(),
            "Record inserted",
        ))
    }

    async fn execute_get(
        &self,
        envelope: &RequestEnvelope,
        table: &str,
    ) -> Result<ResultEnvelope, StorageError> {
        let records = self.store.query_table(table).await?;
        Ok(ResultEnvelope::success_with_results(
            envelope.request_id.clone(),
            records,
        ))
    }

    async fn execute_put(
        &self,
        envelope: &RequestEnvelope,
        table: &str,
    ) -> Result<ResultEnvelope, StorageError> {
        let Some(record_id) = envelope.record_id else {
            return Ok(ResultEnvelope::error(
                envelope.request_id.clone(),
                "record id required for update",
            ));
        };
        match self
            .store
            .update(table, record_id, envelope.payload.clone())
            .await?
        {
            Some(_) => Ok(ResultEnvelope::success(
                envelope.request_id.clone(),
                "record updated",
            )),
            None => Ok(ResultEnvelope::error(
                envelope.request_id.clone(),
                "no record found to update",
            )),
        }
    }

    async fn execute_delete(
        &self,
        envelope: &RequestEnvelope,
        table: &str,
    ) -> Result<ResultEnvelope, StorageError> {
        let Some(record_id) = envelope.record_id else {
            return Ok(ResultEnvelope::error(
                envelope.request_id.clone(),
                "record id required for delete",
            ));
        };
        match self.store.delete(table, record_id).await? {
            Some(_) => Ok(ResultEnvelope::success(
                envelope.request_id.clone(),
                "record deleted",
            )),
            None => Ok(ResultEnvelope::error(
                envelope.request_id.clone(),
                "no record found to delete",
            )),
        }
    }
}
