//! Ingress parsing and CRUD filtering.
//!
//! The controller owns the two routing hops that bracket the coarse
//! entitlement check:
//!
//! 1. `route_ingress`: raw JSON body in, parsed envelope out. A body
//!    that does not parse produces one malformed-result on the output
//!    queue, carrying whatever request id could be salvaged, and goes
//!    no further.
//! 2. `route_passed`: envelopes cleared by the coarse check. CRUD
//!    methods continue to the data layer; anything else is dropped
//!    with a trace and produces no output at all.

use crate::broker::{QueueReceiver, QueueSender};
use tokio::sync::broadcast;
use tollgate_envelope::{EnvelopeError, RequestEnvelope, ResultEnvelope};
use tracing::{debug, warn};

/// Routes raw bodies in and coarse-passed envelopes onward.
#[derive(Debug, Clone)]
pub struct ControllerRouter {
    coarse_check: QueueSender<RequestEnvelope>,
    data_ingress: QueueSender<RequestEnvelope>,
    output: QueueSender<ResultEnvelope>,
}

impl ControllerRouter {
    #[must_use]
    pub fn new(
        coarse_check: QueueSender<RequestEnvelope>,
        data_ingress: QueueSender<RequestEnvelope>,
        output: QueueSender<ResultEnvelope>,
    ) -> Self {
        Self {
            coarse_check,
            data_ingress,
            output,
        }
    }

    /// Consumes raw JSON bodies from the ingress queue.
    pub async fn route_ingress(
        self,
        mut ingress_rx: QueueReceiver<String>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    debug!("ingress router shutting down");
                    break;
                }
                delivery = ingress_rx.recv() => {
                    let Some(delivery) = delivery else { break };
                    match RequestEnvelope::from_json(delivery.body()) {
                        Ok(envelope) => {
                            debug!(request_id = %envelope.request_id, "envelope accepted");
                            if let Err(err) = self.coarse_check.send(envelope).await {
                                warn!(error = %err, "coarse-check queue unavailable, stopping");
                                break;
                            }
                        }
                        Err(EnvelopeError::Malformed { detail, request_id }) => {
                            warn!(detail = %detail, "malformed ingress body");
                            let notice = ResultEnvelope::malformed(request_id, detail);
                            if let Err(err) = self.output.send(notice).await {
                                warn!(error = %err, "output queue unavailable, stopping");
                                break;
                            }
                        }
                        Err(err) => {
                            // from_json only raises Malformed today
                            warn!(error = %err, "unexpected parse failure");
                            let notice = ResultEnvelope::malformed(None, err.to_string());
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

    /// Consumes envelopes that cleared the coarse check.
    ///
    /// Non-CRUD methods stop here: they were authorized under the
    /// conservative write rule but have no data-layer meaning, so they
    /// are discarded without an output result.
    pub async fn route_passed(
        self,
        mut pass_rx: QueueReceiver<RequestEnvelope>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    debug!("coarse-pass router shutting down");
                    break;
                }
                delivery = pass_rx.recv() => {
                    let Some(delivery) = delivery else { break };
                    let envelope = delivery.body();
                    if envelope.method.is_crud() {
                        if let Err(err) = self.data_ingress.send(envelope.clone()).await {
                            warn!(error = %err, "data-ingress queue unavailable, stopping");
                            break;
                        }
                    } else {
                        debug!(
                            request_id = %envelope.request_id,
                            method = envelope.method.as_str(),
                            "non-crud request dropped"
                        );
                    }
                    delivery.ack();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{queue, AckMode};
    use tollgate_envelope::{RejectReason, Status};
    use tollgate_types::Method;

    struct Wiring {
        router: ControllerRouter,
        coarse_check_rx: QueueReceiver<RequestEnvelope>,
        data_ingress_rx: QueueReceiver<RequestEnvelope>,
        output_rx: QueueReceiver<ResultEnvelope>,
    }

    fn wiring() -> Wiring {
        let (coarse_check_tx, coarse_check_rx) = queue("coarse-check", 8, AckMode::Early);
        let (data_ingress_tx, data_ingress_rx) = queue("data-ingress", 8, AckMode::Early);
        let (output_tx, output_rx) = queue("output", 8, AckMode::Early);
        Wiring {
            router: ControllerRouter::new(coarse_check_tx, data_ingress_tx, output_tx),
            coarse_check_rx,
            data_ingress_rx,
            output_rx,
        }
    }

    #[tokio::test]
    async fn valid_body_reaches_coarse_check() {
        let mut w = wiring();
        let (ingress_tx, ingress_rx) = queue("ingress", 8, AckMode::Early);
        let (shutdown_tx, _) = broadcast::channel(1);
        let task = tokio::spawn(w.router.route_ingress(ingress_rx, shutdown_tx.subscribe()));

        let body = r#"{"request_id":"r1","token":"token_app_1","method":"GET","item_type":"animals"}"#;
        ingress_tx.send(body.to_string()).await.unwrap();

        let envelope = w.coarse_check_rx.recv().await.unwrap().ack();
        assert_eq!(envelope.request_id.as_str(), "r1");
        assert_eq!(envelope.method, Method::Get);

        shutdown_tx.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn malformed_body_goes_to_output_only() {
        let mut w = wiring();
        let (ingress_tx, ingress_rx) = queue("ingress", 8, AckMode::Early);
        let (shutdown_tx, _) = broadcast::channel(1);
        let task = tokio::spawn(w.router.route_ingress(ingress_rx, shutdown_tx.subscribe()));

        ingress_tx.send("{not json".to_string()).await.unwrap();

        let notice = w.output_rx.recv().await.unwrap().ack();
        assert_eq!(notice.status, Status::Error);
        assert_eq!(notice.reason, Some(RejectReason::InvalidFormat));
        assert!(notice.request_id.is_none());

        // nothing leaked into the checked path
        assert!(w.coarse_check_rx.try_recv().is_none());

        shutdown_tx.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn schema_failure_salvages_request_id() {
        let mut w = wiring();
        let (ingress_tx, ingress_rx) = queue("ingress", 8, AckMode::Early);
        let (shutdown_tx, _) = broadcast::channel(1);
        let task = tokio::spawn(w.router.route_ingress(ingress_rx, shutdown_tx.subscribe()));

        // valid JSON, missing required fields
        ingress_tx
            .send(r#"{"request_id":"r9"}"#.to_string())
            .await
            .unwrap();

        let notice = w.output_rx.recv().await.unwrap().ack();
        assert_eq!(notice.request_id.map(|id| id.as_str().to_string()), Some("r9".into()));

        shutdown_tx.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn crud_envelope_continues_to_data_layer() {
        let mut w = wiring();
        let (pass_tx, pass_rx) = queue("coarse-pass", 8, AckMode::Early);
        let (shutdown_tx, _) = broadcast::channel(1);
        let task = tokio::spawn(w.router.route_passed(pass_rx, shutdown_tx.subscribe()));

        let envelope = RequestEnvelope::new("r1", "token_app_1", Method::Delete, "animals");
        pass_tx.send(envelope.clone()).await.unwrap();

        let forwarded = w.data_ingress_rx.recv().await.unwrap().ack();
        assert_eq!(forwarded, envelope);

        shutdown_tx.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn non_crud_envelope_is_dropped_silently() {
        let mut w = wiring();
        let (pass_tx, pass_rx) = queue("coarse-pass", 8, AckMode::Early);
        let (shutdown_tx, _) = broadcast::channel(1);
        let task = tokio::spawn(w.router.route_passed(pass_rx, shutdown_tx.subscribe()));

        let odd = RequestEnvelope::new("r1", "token_app_1", Method::Other("OPTIONS".into()), "animals");
        let crud = RequestEnvelope::new("r2", "token_app_1", Method::Get, "animals");
        pass_tx.send(odd).await.unwrap();
        pass_tx.send(crud.clone()).await.unwrap();

        // only the CRUD envelope comes through, and no output was produced
        let forwarded = w.data_ingress_rx.recv().await.unwrap().ack();
        assert_eq!(forwarded, crud);
        assert!(w.output_rx.try_recv().is_none());

        shutdown_tx.send(()).unwrap();
        task.await.unwrap();
    }
}
