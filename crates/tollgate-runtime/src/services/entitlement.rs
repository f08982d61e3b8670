//! Entitlement decision engine.
//!
//! One engine type serves both checkpoints. The tier is determined by
//! the envelope itself: before the data layer derives a table, the
//! coarse check asks "may this role perform this action anywhere"; once
//! a table is present, the check narrows to that table's category.
//!
//! ```text
//! envelope.table       check applied
//! ─────────────        ──────────────────────────────────
//! None                 policy.allows_any(role, action)
//! Some(known table)    policy.allows(role, category, action)
//! Some(unknown table)  deny
//! ```
//!
//! A denial publishes one rejection notice to the rejected queue and
//! the same notice to the output queue. The envelope itself is never
//! mutated here; passing envelopes move downstream unchanged.

use crate::broker::{QueueReceiver, QueueSender};
use std::sync::Arc;
use tokio::sync::broadcast;
use tollgate_auth::{PermissionPolicy, RoleResolver};
use tollgate_envelope::{RequestEnvelope, ResultEnvelope};
use tollgate_types::Category;
use tracing::{debug, warn};

/// Outcome of a single entitlement check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The envelope may continue downstream.
    Pass,
    /// The envelope is turned away.
    Deny,
}

/// Pass-or-deny gate over a check queue.
///
/// Cloneable so the same policy and resolver back both tiers.
#[derive(Debug, Clone)]
pub struct EntitlementEngine {
    resolver: Arc<RoleResolver>,
    policy: Arc<PermissionPolicy>,
    rejected: QueueSender<ResultEnvelope>,
    output: QueueSender<ResultEnvelope>,
}

impl EntitlementEngine {
    #[must_use]
    pub fn new(
        resolver: Arc<RoleResolver>,
        policy: Arc<PermissionPolicy>,
        rejected: QueueSender<ResultEnvelope>,
        output: QueueSender<ResultEnvelope>,
    ) -> Self {
        Self {
            resolver,
            policy,
            rejected,
            output,
        }
    }

    /// Decides whether an envelope passes.
    ///
    /// The role comes from the token alone; nothing else in the
    /// envelope is trusted for identity. Unknown tokens resolve to a
    /// role with no grants, so they fall out of the deny-by-default
    /// policy rather than being special-cased here.
    #[must_use]
    pub fn decide(&self, envelope: &RequestEnvelope) -> Decision {
        let role = self.resolver.resolve(&envelope.token);
        let action = envelope.method.action();

        let allowed = match envelope.table.as_deref() {
            Some(table) => match Category::from_table(table) {
                Some(category) => self.policy.allows(role, category, action),
                // a table we never derive has no grants
                None => false,
            },
            None => self.policy.allows_any(role, action),
        };

        debug!(
            request_id = %envelope.request_id,
            role = role.as_str(),
            action = action.as_str(),
            table = envelope.table.as_deref().unwrap_or("-"),
            allowed,
            "entitlement check"
        );

        if allowed {
            Decision::Pass
        } else {
            Decision::Deny
        }
    }

    /// Runs one checkpoint: consume from `check_rx`, forward passes to
    /// `pass_tx`, publish denials to the rejected and output queues.
    ///
    /// Returns when the shutdown broadcast fires or the check queue
    /// closes. Deliveries are acked only after their verdict has been
    /// published, so an engine that dies mid-request leaves the
    /// envelope eligible for redelivery.
    pub async fn serve(
        self,
        mut check_rx: QueueReceiver<RequestEnvelope>,
        pass_tx: QueueSender<RequestEnvelope>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    debug!(queue = check_rx.name(), "entitlement engine shutting down");
                    break;
                }
                delivery = check_rx.recv() => {
                    let Some(delivery) = delivery else { break };
                    match self.decide(delivery.body()) {
                        Decision::Pass => {
                            let envelope = delivery.body().clone();
                            if let Err(err) = pass_tx.send(envelope).await {
                                warn!(error = %err, "pass queue unavailable, stopping");
                                break;
                            }
                        }
                        Decision::Deny => {
                            let notice = ResultEnvelope::rejected(delivery.body());
                            if let Err(err) = self.rejected.send(notice.clone()).await {
                                warn!(error = %err, "rejected queue unavailable");
                            }
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{queue, AckMode};
    use tollgate_types::Method;

    fn engine() -> (
        EntitlementEngine,
        QueueReceiver<ResultEnvelope>,
        QueueReceiver<ResultEnvelope>,
    ) {
        let (rejected_tx, rejected_rx) = queue("rejected", 8, AckMode::Early);
        let (output_tx, output_rx) = queue("output", 8, AckMode::Early);
        let engine = EntitlementEngine::new(
            Arc::new(RoleResolver::default()),
            Arc::new(PermissionPolicy::reference()),
            rejected_tx,
            output_tx,
        );
        (engine, rejected_rx, output_rx)
    }

    #[tokio::test]
    async fn full_role_passes_coarse_tier() {
        let (engine, _r, _o) = engine();
        let envelope = RequestEnvelope::new("r1", "token_app_1", Method::Post, "animals");
        assert_eq!(engine.decide(&envelope), Decision::Pass);
    }

    #[tokio::test]
    async fn revoked_role_denied_at_coarse_tier() {
        let (engine, _r, _o) = engine();
        let envelope = RequestEnvelope::new("r1", "token_malicious", Method::Get, "plants");
        assert_eq!(engine.decide(&envelope), Decision::Deny);
    }

    #[tokio::test]
    async fn unknown_token_is_denied() {
        let (engine, _r, _o) = engine();
        let envelope = RequestEnvelope::new("r1", "token_forged", Method::Get, "plants");
        assert_eq!(engine.decide(&envelope), Decision::Deny);
    }

    #[tokio::test]
    async fn restricted_role_splits_on_derived_table() {
        let (engine, _r, _o) = engine();

        // plants are granted, animals are not
        let plants = RequestEnvelope::new("r1", "token_app_2", Method::Post, "plants")
            .with_derived_table(Category::Plants);
        let animals = RequestEnvelope::new("r2", "token_app_2", Method::Post, "animals")
            .with_derived_table(Category::Animals);

        assert_eq!(engine.decide(&plants), Decision::Pass);
        assert_eq!(engine.decide(&animals), Decision::Deny);
    }

    #[tokio::test]
    async fn coarse_tier_passes_before_category_is_known() {
        let (engine, _r, _o) = engine();

        // restricted writes pass the coarse tier even for an item type
        // that will later map to a forbidden table
        let envelope = RequestEnvelope::new("r1", "token_app_2", Method::Post, "animals");
        assert_eq!(engine.decide(&envelope), Decision::Pass);
    }

    #[tokio::test]
    async fn unknown_method_is_checked_as_write() {
        let (engine, _r, _o) = engine();

        // restricted has write on plants, so an unknown method passes
        // the same check a POST would
        let envelope = RequestEnvelope::new("r1", "token_app_2", Method::Other("PATCH".into()), "plants")
            .with_derived_table(Category::Plants);
        assert_eq!(engine.decide(&envelope), Decision::Pass);
    }

    #[tokio::test]
    async fn serve_forwards_pass_and_publishes_denial() {
        let (engine, mut rejected_rx, mut output_rx) = engine();
        let (check_tx, check_rx) = queue("coarse-check", 8, AckMode::Early);
        let (pass_tx, mut pass_rx) = queue("coarse-pass", 8, AckMode::Early);
        let (shutdown_tx, _) = broadcast::channel(1);

        let task = tokio::spawn(engine.serve(check_rx, pass_tx, shutdown_tx.subscribe()));

        let passing = RequestEnvelope::new("r1", "token_app_1", Method::Get, "animals");
        let denied = RequestEnvelope::new("r2", "token_malicious", Method::Get, "animals");
        check_tx.send(passing.clone()).await.unwrap();
        check_tx.send(denied.clone()).await.unwrap();

        let forwarded = pass_rx.recv().await.unwrap().ack();
        assert_eq!(forwarded, passing);

        let notice = output_rx.recv().await.unwrap().ack();
        assert_eq!(notice, ResultEnvelope::rejected(&denied));
        let audit = rejected_rx.recv().await.unwrap().ack();
        assert_eq!(audit, notice);

        shutdown_tx.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn serve_exits_when_check_queue_closes() {
        let (engine, _r, _o) = engine();
        let (check_tx, check_rx) = queue::<RequestEnvelope>("coarse-check", 8, AckMode::Early);
        let (pass_tx, _pass_rx) = queue("coarse-pass", 8, AckMode::Early);
        let (shutdown_tx, _) = broadcast::channel(1);

        let task = tokio::spawn(engine.serve(check_rx, pass_tx, shutdown_tx.subscribe()));
        drop(check_tx);
        task.await.unwrap();
    }
}
