//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

/// Complete application configuration loaded from the INI file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// Cluster topology and task-source settings
    pub cluster: ClusterSettings,
    /// Simulation timing and failure settings
    pub simulation: SimulationSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Cluster topology and task-source configuration.
#[derive(Debug, Clone)]
pub struct ClusterSettings {
    /// Number of worker networks.
    pub networks: usize,
    /// Number of worker nodes per network.
    pub nodes_per_network: usize,
    /// Number of tasks the CLI submits at startup.
    pub tasks: usize,
}

/// Simulation timing and failure configuration.
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    /// RNG seed for reproducible runs. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Per-tick probability of a node failure, in `[0.0, 1.0]`.
    pub failure_probability: f64,
    /// Per-execution probability of a simulated processing error,
    /// in `[0.0, 1.0]`.
    pub processing_error_probability: f64,
    /// Interval between failure-loop ticks, in milliseconds.
    pub failure_tick_ms: u64,
    /// Minimum downtime before a failed node recovers, in milliseconds.
    pub recovery_min_ms: u64,
    /// Maximum downtime before a failed node recovers, in milliseconds.
    pub recovery_max_ms: u64,
    /// Minimum simulated task processing duration, in milliseconds.
    pub processing_min_ms: u64,
    /// Maximum simulated task processing duration, in milliseconds.
    pub processing_max_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingSettings {
    /// Directory for log files.
    pub directory: String,
    /// Log file name.
    pub file: String,
}
