//! Default values and constants for all configuration settings.
//!
//! Contains the `DEFAULT_*` constants that are not already defined by the
//! cluster core, and the `ConfigFile::default()` implementation.

use super::settings::*;
use crate::cluster::{
    DEFAULT_FAILURE_PROBABILITY, DEFAULT_FAILURE_TICK_MS, DEFAULT_NETWORKS,
    DEFAULT_NODES_PER_NETWORK, DEFAULT_PROCESSING_ERROR_PROBABILITY, DEFAULT_PROCESSING_MAX_MS,
    DEFAULT_PROCESSING_MIN_MS, DEFAULT_RECOVERY_MAX_MS, DEFAULT_RECOVERY_MIN_MS,
};

/// Default number of tasks the CLI submits at startup.
pub const DEFAULT_TASKS: usize = 1_000;

/// Default directory for log files.
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "taskgrid.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            cluster: ClusterSettings::default(),
            simulation: SimulationSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            networks: DEFAULT_NETWORKS,
            nodes_per_network: DEFAULT_NODES_PER_NETWORK,
            tasks: DEFAULT_TASKS,
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: None,
            failure_probability: DEFAULT_FAILURE_PROBABILITY,
            processing_error_probability: DEFAULT_PROCESSING_ERROR_PROBABILITY,
            failure_tick_ms: DEFAULT_FAILURE_TICK_MS,
            recovery_min_ms: DEFAULT_RECOVERY_MIN_MS,
            recovery_max_ms: DEFAULT_RECOVERY_MAX_MS,
            processing_min_ms: DEFAULT_PROCESSING_MIN_MS,
            processing_max_ms: DEFAULT_PROCESSING_MAX_MS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: DEFAULT_LOG_DIRECTORY.to_string(),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_match_original_topology() {
        let config = ConfigFile::default();
        assert_eq!(config.cluster.networks, 3);
        assert_eq!(config.cluster.nodes_per_network, 50);
        assert_eq!(config.cluster.tasks, 1_000);
    }

    #[test]
    fn test_simulation_defaults() {
        let simulation = SimulationSettings::default();
        assert_eq!(simulation.seed, None);
        assert!(simulation.failure_probability > 0.0);
        assert!(simulation.recovery_min_ms <= simulation.recovery_max_ms);
        assert!(simulation.processing_min_ms <= simulation.processing_max_ms);
    }
}
