//! tessera-placement — the placement decision engine of the Tessera meta
//! server.
//!
//! Given the cluster topology view and a partition's current configuration,
//! the engine decides where to place or move a replica and issues a
//! configuration-change proposal to the chosen node:
//!
//! 1. The selector picks the least-loaded alive node that does not already
//!    serve the partition (ties broken uniformly at random).
//! 2. The balancer snapshots the application metadata and partition
//!    configuration under the topology read lock, validates it, and hands a
//!    fully-formed request to the dispatcher.
//!
//! The engine never mutates topology, never retries a send, and never holds
//! the topology lock across a dispatch call.

pub mod balancer;
pub mod error;
pub mod proposal;
pub mod selector;

pub use balancer::{Balancer, BalancerConfig};
pub use error::{PlacementError, PlacementResult};
pub use proposal::{ConfigType, ConfigUpdateRequest};
pub use selector::{pick_least_loaded, LoadMetric};
