//! The balancer — snapshots topology, builds proposals, hands them off.
//!
//! Each invocation acquires the topology read lock just long enough to copy
//! out the application metadata and partition configuration, validates the
//! copy, and dispatches a fully-formed request. The lock is never held
//! across the dispatch call.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{error, info};

use tessera_dispatch::{Dispatcher, Envelope, MessageKind};
use tessera_topology::{ClusterView, NodeAddr, PartitionConfig, PartitionId};

use crate::error::{PlacementError, PlacementResult};
use crate::proposal::{ConfigType, ConfigUpdateRequest};
use crate::selector::{pick_least_loaded, LoadMetric};

/// Process-wide placement switches, fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct BalancerConfig {
    /// When set, callers are expected not to invoke selection or dispatch;
    /// the balancer itself does not enforce this.
    pub balancing_disabled: bool,
}

/// The placement decision engine.
///
/// Holds shared read access to the cluster view, a dispatcher for outgoing
/// proposals, and its own random source for tie-breaking. Deterministic
/// tests construct it with [`Balancer::with_rng`] and a fixed source; the
/// default source is seeded from entropy.
pub struct Balancer {
    view: Arc<ClusterView>,
    dispatcher: Arc<dyn Dispatcher>,
    config: BalancerConfig,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl Balancer {
    pub fn new(
        view: Arc<ClusterView>,
        dispatcher: Arc<dyn Dispatcher>,
        config: BalancerConfig,
    ) -> Self {
        Self::with_rng(view, dispatcher, config, StdRng::from_entropy())
    }

    /// Construct with an explicit random source for the selection
    /// tie-break.
    pub fn with_rng(
        view: Arc<ClusterView>,
        dispatcher: Arc<dyn Dispatcher>,
        config: BalancerConfig,
        rng: impl RngCore + Send + 'static,
    ) -> Self {
        Self {
            view,
            dispatcher,
            config,
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Whether balancing is administratively disabled.
    pub fn is_disabled(&self) -> bool {
        self.config.balancing_disabled
    }

    /// Pick a placement target for `pc`: the least-loaded alive node that
    /// does not already serve the partition, or `None` if no such node
    /// exists (skip the partition on this pass).
    pub fn select_target(&self, pc: &PartitionConfig, metric: LoadMetric) -> Option<NodeAddr> {
        let nodes = self.view.nodes();
        let mut rng = self.rng.lock().expect("balancer rng lock");
        pick_least_loaded(&nodes, pc, metric, &mut **rng)
    }

    /// Dispatch `request` to `recipient` as a one-way proposal.
    ///
    /// The request must be fully populated; an empty app type means the
    /// snapshot was taken before the app's metadata finished initializing,
    /// and the resulting error is unrecoverable — the proposal is never
    /// sent and the caller must treat the process as compromised.
    pub fn send_proposal(
        &self,
        recipient: &str,
        request: ConfigUpdateRequest,
    ) -> PlacementResult<()> {
        if request.info.app_type.is_empty() {
            return Err(PlacementError::IncompleteAppInfo(request.config.pid));
        }

        info!(
            recipient,
            action = ?request.config_type,
            node = %request.node,
            pid = %request.config.pid,
            ballot = request.config.ballot,
            "sending configuration proposal"
        );

        let partition_key = request.config.pid.shard();
        let payload = serde_json::to_vec(&request)?;
        self.dispatcher.send(Envelope {
            recipient: recipient.to_string(),
            kind: MessageKind::ConfigProposal,
            payload,
            partition_key,
        });
        Ok(())
    }

    /// Build and dispatch a proposal for `pid` from the current topology
    /// snapshot.
    ///
    /// Invalid arguments (non-positive app id, negative partition index,
    /// the `Invalid` action, or an id/index the live tables no longer
    /// cover) are logged and dropped without any synchronous signal to the
    /// caller. Only the unrecoverable app-metadata invariant surfaces as
    /// an error.
    pub fn propose(
        &self,
        pid: PartitionId,
        recipient: &str,
        action: ConfigType,
        node: &str,
    ) -> PlacementResult<()> {
        // Cheap structural reject; the authoritative bounds check happens
        // under the lock in partition_snapshot.
        if pid.app_id <= 0 || pid.index < 0 || action == ConfigType::Invalid {
            error!(%pid, ?action, "rejecting proposal with invalid parameters");
            return Ok(());
        }

        let snapshot = match self.view.partition_snapshot(pid) {
            Ok(snapshot) => snapshot,
            Err(cause) => {
                error!(%pid, %cause, "rejecting proposal against stale partition id");
                return Ok(());
            }
        };

        self.send_proposal(
            recipient,
            ConfigUpdateRequest {
                config_type: action,
                node: node.to_string(),
                info: snapshot.info,
                config: snapshot.config,
            },
        )
    }
}
