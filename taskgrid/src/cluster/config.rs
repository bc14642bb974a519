//! Cluster topology configuration.
//!
//! This module contains the [`ClusterConfig`] struct and related constants
//! for sizing the cluster.

// =============================================================================
// Configuration Constants
// =============================================================================

/// Default number of worker networks.
pub const DEFAULT_NETWORKS: usize = 3;

/// Default number of worker nodes per network.
pub const DEFAULT_NODES_PER_NETWORK: usize = 50;

// =============================================================================
// Cluster Configuration
// =============================================================================

/// Topology configuration for the cluster.
#[derive(Clone, Debug)]
pub struct ClusterConfig {
    /// Number of worker networks.
    pub networks: usize,

    /// Number of worker nodes in each network.
    pub nodes_per_network: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            networks: DEFAULT_NETWORKS,
            nodes_per_network: DEFAULT_NODES_PER_NETWORK,
        }
    }
}

impl From<&crate::config::ClusterSettings> for ClusterConfig {
    fn from(settings: &crate::config::ClusterSettings) -> Self {
        Self {
            networks: clamp_at_least_one("networks", settings.networks),
            nodes_per_network: clamp_at_least_one(
                "nodes_per_network",
                settings.nodes_per_network,
            ),
        }
    }
}

/// Clamps a topology dimension to at least 1 and logs a warning if clamped.
fn clamp_at_least_one(key: &str, value: usize) -> usize {
    if value == 0 {
        tracing::warn!(key = key, "Topology dimension is zero, clamping to 1");
        1
    } else {
        value
    }
}
