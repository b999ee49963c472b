//! The configuration-update request produced by the placement engine.

use serde::{Deserialize, Serialize};

use tessera_topology::{AppInfo, NodeAddr, PartitionConfig};

/// Kind of configuration change being proposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigType {
    /// Unset sentinel; never valid in a dispatched proposal.
    #[default]
    Invalid,
    AssignPrimary,
    AddSecondary,
    UpgradeToPrimary,
    DowngradeToSecondary,
    Remove,
}

/// A proposal asking one node to change a partition's configuration.
///
/// Built fresh for every call from a topology snapshot and discarded after
/// dispatch; the ballot it carries is always the one observed in that
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdateRequest {
    pub config_type: ConfigType,
    /// The node whose role the proposal changes.
    pub node: NodeAddr,
    pub info: AppInfo,
    pub config: PartitionConfig,
}
