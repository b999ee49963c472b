//! The reader/writer-locked cluster state view.
//!
//! One `RwLock` guards both the node table and the application table: any
//! number of placement decisions may read concurrently, while topology
//! mutation (driven by the reconfiguration state machine) takes the
//! exclusive lock. Read methods copy the requested records out and release
//! the lock before returning; no lock is ever held across a dispatch call
//! and no await point exists under it.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::error::{TopologyError, TopologyResult};
use crate::types::{AppInfo, AppState, NodeState, PartitionConfig, PartitionId};

/// Copy of one application's metadata plus one partition's configuration,
/// taken atomically under the read lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSnapshot {
    pub info: AppInfo,
    pub config: PartitionConfig,
}

#[derive(Debug, Default)]
struct ViewInner {
    nodes: HashMap<String, NodeState>,
    /// Application table; app id `n` lives at index `n - 1`.
    apps: Vec<AppState>,
}

impl ViewInner {
    fn app(&self, app_id: i32) -> TopologyResult<&AppState> {
        if app_id <= 0 || app_id as usize > self.apps.len() {
            return Err(TopologyError::AppOutOfRange {
                app_id,
                known: self.apps.len(),
            });
        }
        Ok(&self.apps[app_id as usize - 1])
    }

    fn app_mut(&mut self, app_id: i32) -> TopologyResult<&mut AppState> {
        let known = self.apps.len();
        if app_id <= 0 || app_id as usize > known {
            return Err(TopologyError::AppOutOfRange { app_id, known });
        }
        Ok(&mut self.apps[app_id as usize - 1])
    }
}

/// The authoritative in-memory cluster topology.
///
/// Owned by the meta server; mutated only through the write-side methods by
/// the reconfiguration driver. The placement engine uses the read side
/// exclusively.
#[derive(Debug, Default)]
pub struct ClusterView {
    inner: RwLock<ViewInner>,
}

impl ClusterView {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Read side ──────────────────────────────────────────────────

    /// Copy of all node records, taken under the shared lock.
    pub fn nodes(&self) -> Vec<NodeState> {
        let inner = self.inner.read().expect("cluster view lock");
        inner.nodes.values().cloned().collect()
    }

    /// Copy of a single node record.
    pub fn node(&self, addr: &str) -> Option<NodeState> {
        let inner = self.inner.read().expect("cluster view lock");
        inner.nodes.get(addr).cloned()
    }

    /// Number of registered nodes.
    pub fn node_count(&self) -> usize {
        let inner = self.inner.read().expect("cluster view lock");
        inner.nodes.len()
    }

    /// Number of applications in the table.
    pub fn app_count(&self) -> usize {
        let inner = self.inner.read().expect("cluster view lock");
        inner.apps.len()
    }

    /// Re-validate `pid` against the live tables and copy out the app info
    /// and partition configuration.
    ///
    /// The bounds check runs under the same lock acquisition as the copy,
    /// so a table that shrank since the caller computed `pid` is caught
    /// here. The ballot in the returned snapshot is the current one.
    pub fn partition_snapshot(&self, pid: PartitionId) -> TopologyResult<PartitionSnapshot> {
        let inner = self.inner.read().expect("cluster view lock");
        let app = inner.app(pid.app_id)?;
        if pid.index < 0 || pid.index >= app.info.partition_count {
            return Err(TopologyError::PartitionOutOfRange {
                pid,
                partition_count: app.info.partition_count,
            });
        }
        Ok(PartitionSnapshot {
            info: app.info.clone(),
            config: app.partitions[pid.index as usize].clone(),
        })
    }

    // ── Write side (reconfiguration driver only) ───────────────────

    /// Insert or replace a node record.
    pub fn upsert_node(&self, node: NodeState) {
        let mut inner = self.inner.write().expect("cluster view lock");
        debug!(address = %node.address, alive = node.alive, "node record updated");
        inner.nodes.insert(node.address.clone(), node);
    }

    /// Update a node's liveness flag. Returns false if the address is
    /// unknown.
    pub fn set_alive(&self, addr: &str, alive: bool) -> bool {
        let mut inner = self.inner.write().expect("cluster view lock");
        match inner.nodes.get_mut(addr) {
            Some(node) => {
                node.alive = alive;
                debug!(address = %addr, alive, "node liveness changed");
                true
            }
            None => {
                warn!(address = %addr, "liveness update for unknown node");
                false
            }
        }
    }

    /// Remove a node record. Returns whether it existed.
    pub fn remove_node(&self, addr: &str) -> bool {
        let mut inner = self.inner.write().expect("cluster view lock");
        let existed = inner.nodes.remove(addr).is_some();
        if existed {
            debug!(address = %addr, "node removed");
        }
        existed
    }

    /// Register an application and return its 1-based id.
    ///
    /// The partition sequence is created with fresh configurations (ballot
    /// zero, no replicas). An empty `app_type` is accepted on purpose: app
    /// records can exist before their metadata has fully synced, and the
    /// proposal sender refuses to dispatch while that is the case.
    pub fn create_app(&self, info: AppInfo) -> TopologyResult<i32> {
        if info.partition_count <= 0 {
            return Err(TopologyError::InvalidPartitionCount(info.partition_count));
        }
        let mut inner = self.inner.write().expect("cluster view lock");
        let app_id = inner.apps.len() as i32 + 1;
        debug!(app_id, app_type = %info.app_type, partitions = info.partition_count, "application registered");
        inner.apps.push(AppState::new(app_id, info));
        Ok(app_id)
    }

    /// Replace a partition's configuration.
    ///
    /// Enforces the fencing invariants the rest of the system relies on:
    /// the ballot never decreases, and the primary never appears among the
    /// secondaries.
    pub fn apply_partition_update(&self, config: PartitionConfig) -> TopologyResult<()> {
        if let Some(primary) = &config.primary {
            if config.secondaries.iter().any(|s| s == primary) {
                return Err(TopologyError::PrimaryInSecondaries(
                    primary.clone(),
                    config.pid,
                ));
            }
        }

        let mut inner = self.inner.write().expect("cluster view lock");
        let pid = config.pid;
        let app = inner.app_mut(pid.app_id)?;
        if pid.index < 0 || pid.index >= app.info.partition_count {
            return Err(TopologyError::PartitionOutOfRange {
                pid,
                partition_count: app.info.partition_count,
            });
        }

        let slot = &mut app.partitions[pid.index as usize];
        if config.ballot < slot.ballot {
            return Err(TopologyError::StaleBallot {
                pid,
                current: slot.ballot,
                incoming: config.ballot,
            });
        }
        debug!(%pid, ballot = config.ballot, "partition configuration updated");
        *slot = config;
        Ok(())
    }
}
