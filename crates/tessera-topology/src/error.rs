//! Topology view error types.

use thiserror::Error;

use crate::types::{NodeAddr, PartitionId};

/// Errors surfaced by the cluster topology view.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("app id {app_id} is out of range ({known} apps known)")]
    AppOutOfRange { app_id: i32, known: usize },

    #[error("partition index out of range for {pid} ({partition_count} partitions declared)")]
    PartitionOutOfRange {
        pid: PartitionId,
        partition_count: i32,
    },

    #[error("partition count must be positive, got {0}")]
    InvalidPartitionCount(i32),

    #[error("stale ballot {incoming} for {pid}, current is {current}")]
    StaleBallot {
        pid: PartitionId,
        current: i64,
        incoming: i64,
    },

    #[error("primary {0} listed among secondaries of {1}")]
    PrimaryInSecondaries(NodeAddr, PartitionId),
}

pub type TopologyResult<T> = Result<T, TopologyError>;
