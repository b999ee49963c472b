//! Domain types for the cluster topology view.
//!
//! These types describe the placement-relevant state of the cluster: which
//! nodes exist and how loaded they are, which applications are deployed, and
//! how each partition's replicas are currently configured. All types are
//! serializable for use in proposal payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Network address of a replica server node (unique key).
pub type NodeAddr = String;

// ── Partition identity ─────────────────────────────────────────────

/// Global partition identifier: one shard of one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionId {
    /// 1-based id into the cluster-wide application table.
    pub app_id: i32,
    /// Index into the application's partition sequence.
    pub index: i32,
}

impl PartitionId {
    pub fn new(app_id: i32, index: i32) -> Self {
        Self { app_id, index }
    }

    /// Deterministic partitioning key for dispatch routing.
    ///
    /// Messages concerning one partition must all carry the same key so the
    /// dispatcher keeps them ordered relative to each other.
    pub fn shard(&self) -> u64 {
        fnv1a(&[self.app_id, self.index])
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app_id, self.index)
    }
}

/// FNV-1a 64-bit over a sequence of i32 fields.
fn fnv1a(fields: &[i32]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for field in fields {
        for byte in field.to_le_bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x100000001b3);
        }
    }
    hash
}

// ── Partition configuration ────────────────────────────────────────

/// Replica configuration of a single partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    pub pid: PartitionId,
    /// Fencing token: monotonically non-decreasing. Receivers reject
    /// proposals carrying a ballot older than the one they hold.
    pub ballot: i64,
    /// Current primary replica, if one is elected.
    pub primary: Option<NodeAddr>,
    /// Secondary replicas (unordered, duplicate-free, never the primary).
    pub secondaries: Vec<NodeAddr>,
}

impl PartitionConfig {
    /// A fresh configuration with no replicas assigned yet.
    pub fn new(pid: PartitionId) -> Self {
        Self {
            pid,
            ballot: 0,
            primary: None,
            secondaries: Vec::new(),
        }
    }

    /// Whether `addr` already serves this partition as primary or secondary.
    pub fn is_member(&self, addr: &str) -> bool {
        self.primary.as_deref() == Some(addr) || self.secondaries.iter().any(|s| s == addr)
    }
}

// ── Applications ───────────────────────────────────────────────────

/// Application metadata carried in every proposal that references the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Storage engine type. May be empty while the app record is still
    /// syncing; a proposal must never be dispatched in that state.
    pub app_type: String,
    /// Declared number of partitions, fixed at creation.
    pub partition_count: i32,
}

/// An application and the configurations of all its partitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub info: AppInfo,
    /// One entry per partition, indexed `0..partition_count`.
    pub partitions: Vec<PartitionConfig>,
}

impl AppState {
    /// Build an app with `partition_count` fresh partition configurations.
    pub fn new(app_id: i32, info: AppInfo) -> Self {
        let partitions = (0..info.partition_count)
            .map(|index| PartitionConfig::new(PartitionId::new(app_id, index)))
            .collect();
        Self { info, partitions }
    }
}

// ── Nodes ──────────────────────────────────────────────────────────

/// Placement-relevant state of a replica server node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    pub address: NodeAddr,
    /// Liveness as judged by failure detection. Dead nodes are never
    /// selected as placement targets.
    pub alive: bool,
    /// Number of partitions this node serves as primary.
    pub primary_count: u32,
    /// Number of partitions this node serves in any role.
    pub replica_count: u32,
}

impl NodeState {
    /// A freshly joined node with no replicas.
    pub fn new(address: impl Into<NodeAddr>) -> Self {
        Self {
            address: address.into(),
            alive: true,
            primary_count: 0,
            replica_count: 0,
        }
    }
}
