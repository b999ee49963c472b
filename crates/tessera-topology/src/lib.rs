//! tessera-topology — the cluster topology view for the Tessera meta server.
//!
//! Holds the authoritative mapping of node addresses to their liveness and
//! replica counts, and the table of applications with their partition
//! configurations, behind a single reader/writer lock.
//!
//! # Architecture
//!
//! The view is owned and mutated by the reconfiguration state machine; the
//! placement engine only reads it. Every read-side method copies the
//! requested records out under the shared lock and releases it before
//! returning, so callers can never hold the lock across a dispatch call.

pub mod error;
pub mod types;
pub mod view;

pub use error::{TopologyError, TopologyResult};
pub use types::*;
pub use view::{ClusterView, PartitionSnapshot};
