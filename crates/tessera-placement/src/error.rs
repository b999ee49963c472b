//! Placement engine error types.

use thiserror::Error;

use tessera_topology::PartitionId;

/// Errors that can occur while building or sending a proposal.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// The app metadata for this partition was read before it finished
    /// initializing. A proposal built from it would be malformed, and the
    /// snapshot path that produced it cannot be trusted: callers must treat
    /// this as crash-and-restart, never as retryable.
    #[error("app info for {0} has an empty app type, refusing to send a malformed proposal")]
    IncompleteAppInfo(PartitionId),

    #[error("failed to encode proposal: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PlacementError {
    /// Whether this error signals a broken internal invariant rather than
    /// an operational failure.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, PlacementError::IncompleteAppInfo(_))
    }
}

pub type PlacementResult<T> = Result<T, PlacementError>;
