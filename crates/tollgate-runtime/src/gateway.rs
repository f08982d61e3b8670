//! One-call pipeline assembly.
//!
//! [`Gateway::spawn`] creates every queue, spawns one task per
//! consumer loop, and hands back a [`GatewayHandle`] for submitting
//! bodies and draining results. The policy and resolver are injected,
//! so embedders can swap tokens and grants without touching the
//! pipeline; [`Gateway::policy_from_config`] covers the common case of
//! a policy file named in the config.

use crate::broker::{names, queue, AckMode, BrokerError, QueueReceiver, QueueSender};
use crate::config::GatewayConfig;
use crate::output::OutputSink;
use crate::services::{ControllerRouter, DataService, EntitlementEngine};
use crate::storage::RecordStore;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tollgate_auth::{PermissionPolicy, PolicyError, RoleResolver};
use tollgate_envelope::RequestEnvelope;
use tracing::info;

/// Pipeline assembler.
pub struct Gateway;

impl Gateway {
    /// Wires the full pipeline and spawns its tasks.
    ///
    /// Must be called from within a tokio runtime. Every queue gets
    /// the configured depth and ack mode.
    #[must_use]
    pub fn spawn<S: RecordStore>(
        config: &GatewayConfig,
        resolver: RoleResolver,
        policy: PermissionPolicy,
        store: Arc<S>,
    ) -> GatewayHandle {
        let depth = config.queue_depth;
        let mode = config.ack_mode;

        let (ingress_tx, ingress_rx) = queue(names::INGRESS, depth, mode);
        let (coarse_check_tx, coarse_check_rx) = queue(names::COARSE_CHECK, depth, mode);
        let (coarse_pass_tx, coarse_pass_rx) = queue(names::COARSE_PASS, depth, mode);
        let (data_ingress_tx, data_ingress_rx) = queue(names::DATA_INGRESS, depth, mode);
        let (category_check_tx, category_check_rx) = queue(names::CATEGORY_CHECK, depth, mode);
        let (category_pass_tx, category_pass_rx) = queue(names::CATEGORY_PASS, depth, mode);
        let (rejected_tx, rejected_rx) = queue(names::REJECTED, depth, mode);
        let (output_tx, output_rx) = queue(names::OUTPUT, depth, mode);
        // dead letters are inspected, never requeued
        let (dead_letter_tx, dead_letter_rx) =
            queue::<RequestEnvelope>(names::DEAD_LETTER, depth, AckMode::Early);

        let coarse_check_rx = coarse_check_rx.with_dead_letter(&dead_letter_tx);
        let coarse_pass_rx = coarse_pass_rx.with_dead_letter(&dead_letter_tx);
        let data_ingress_rx = data_ingress_rx.with_dead_letter(&dead_letter_tx);
        let category_check_rx = category_check_rx.with_dead_letter(&dead_letter_tx);
        let category_pass_rx = category_pass_rx.with_dead_letter(&dead_letter_tx);

        let (shutdown_tx, _) = broadcast::channel(1);

        let controller =
            ControllerRouter::new(coarse_check_tx, data_ingress_tx, output_tx.clone());
        let engine = EntitlementEngine::new(
            Arc::new(resolver),
            Arc::new(policy),
            rejected_tx,
            output_tx.clone(),
        );
        let data = DataService::new(store, category_check_tx, output_tx);

        let tasks = vec![
            tokio::spawn(
                controller
                    .clone()
                    .route_ingress(ingress_rx, shutdown_tx.subscribe()),
            ),
            tokio::spawn(controller.route_passed(coarse_pass_rx, shutdown_tx.subscribe())),
            tokio::spawn(engine.clone().serve(
                coarse_check_rx,
                coarse_pass_tx,
                shutdown_tx.subscribe(),
            )),
            tokio::spawn(engine.serve(
                category_check_rx,
                category_pass_tx,
                shutdown_tx.subscribe(),
            )),
            tokio::spawn(
                data.clone()
                    .route_ingress(data_ingress_rx, shutdown_tx.subscribe()),
            ),
            tokio::spawn(data.execute_passed(category_pass_rx, shutdown_tx.subscribe())),
        ];

        info!(
            queue_depth = depth,
            ack_mode = mode.as_str(),
            tasks = tasks.len(),
            "gateway started"
        );

        GatewayHandle {
            ingress: ingress_tx,
            output: OutputSink::new(output_rx),
            rejected: OutputSink::new(rejected_rx),
            dead_letter: dead_letter_rx,
            shutdown: shutdown_tx,
            tasks,
        }
    }

    /// Loads the policy named in the config, or the built-in reference
    /// policy when none is named.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when the named file cannot be read or
    /// does not validate.
    pub fn policy_from_config(config: &GatewayConfig) -> Result<PermissionPolicy, PolicyError> {
        match &config.policy_path {
            Some(path) => PermissionPolicy::from_file(path),
            None => Ok(PermissionPolicy::reference()),
        }
    }

    /// Builds the resolver from the config's token table, or the
    /// built-in reference tokens when none is configured.
    #[must_use]
    pub fn resolver_from_config(config: &GatewayConfig) -> RoleResolver {
        match &config.tokens {
            Some(tokens) => RoleResolver::with_mapping(tokens.clone()),
            None => RoleResolver::default(),
        }
    }
}

/// Running pipeline: submit side, result side, and shutdown.
///
/// The rejected sink must be drained (or the handle dropped) in
/// deployments that see sustained denials, as a full rejected queue
/// backpressures the entitlement tiers.
pub struct GatewayHandle {
    ingress: QueueSender<String>,
    output: OutputSink,
    rejected: OutputSink,
    dead_letter: QueueReceiver<RequestEnvelope>,
    shutdown: broadcast::Sender<()>,
    tasks: Vec<JoinHandle<()>>,
}

impl GatewayHandle {
    /// Submits a raw JSON body to the ingress queue.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Closed`] after shutdown.
    pub async fn submit(&self, body: impl Into<String>) -> Result<(), BrokerError> {
        self.ingress.send(body.into()).await
    }

    /// Terminal results, one per submitted request.
    pub fn output(&mut self) -> &mut OutputSink {
        &mut self.output
    }

    /// Rejection notices, for audit consumers.
    pub fn rejected(&mut self) -> &mut OutputSink {
        &mut self.rejected
    }

    /// Envelopes that exhausted their requeue budget on an internal
    /// hop. Empty in a healthy pipeline; populated when a consumer
    /// loop keeps crashing on the same message.
    pub fn dead_letter(&mut self) -> &mut QueueReceiver<RequestEnvelope> {
        &mut self.dead_letter
    }

    /// Signals every pipeline task to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(());
    }

    /// Stops the pipeline and waits for its tasks.
    pub async fn join(mut self) {
        self.shutdown();
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use tollgate_envelope::Status;
    use tollgate_types::RequestId;

    fn handle() -> GatewayHandle {
        Gateway::spawn(
            &GatewayConfig::default(),
            RoleResolver::default(),
            PermissionPolicy::reference(),
            Arc::new(MemoryStore::new()),
        )
    }

    #[tokio::test]
    async fn submitted_request_resolves_on_output() {
        let mut gateway = handle();
        gateway
            .submit(r#"{"request_id":"r1","token":"token_app_1","method":"GET","item_type":"plants"}"#)
            .await
            .unwrap();

        let result = gateway
            .output()
            .wait_for(&RequestId::from("r1"))
            .await
            .unwrap();
        assert_eq!(result.status, Status::Success);
        assert_eq!(result.results, Some(vec![]));

        gateway.join().await;
    }

    #[tokio::test]
    async fn healthy_pipeline_leaves_dead_letter_empty() {
        let mut gateway = handle();
        gateway
            .submit(r#"{"request_id":"r1","token":"token_app_1","method":"POST","item_type":"animals"}"#)
            .await
            .unwrap();
        gateway
            .output()
            .wait_for(&RequestId::from("r1"))
            .await
            .unwrap();

        assert!(gateway.dead_letter().try_recv().is_none());

        gateway.shutdown();
        // every hop acked, so nothing was diverted
        assert!(gateway.dead_letter().recv().await.is_none());
    }

    #[tokio::test]
    async fn policy_from_config_defaults_to_reference() {
        let policy = Gateway::policy_from_config(&GatewayConfig::default()).unwrap();
        assert_eq!(policy.role_count(), PermissionPolicy::reference().role_count());
    }

    #[tokio::test]
    async fn resolver_from_config_uses_token_table() {
        use std::collections::HashMap;
        use tollgate_types::Role;

        let config = GatewayConfig {
            tokens: Some(HashMap::from([("token_ops".to_string(), Role::Full)])),
            ..Default::default()
        };
        let resolver = Gateway::resolver_from_config(&config);
        assert_eq!(resolver.resolve("token_ops"), Role::Full);
        assert_eq!(resolver.resolve("token_app_1"), Role::Unknown);
    }

    #[tokio::test]
    async fn submit_after_join_fails() {
        let gateway = handle();
        let ingress = gateway.ingress.clone();
        gateway.join().await;

        // consumers are gone, the queue reports closed
        assert!(ingress.send("{}".to_string()).await.is_err());
    }
}
