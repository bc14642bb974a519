//! Configuration for TaskGrid.
//!
//! Startup configuration is consumed, not produced, by the core: the
//! cluster topology, the task count to submit, the simulation timings,
//! and logging output. Settings structs live in [`settings`], constants
//! in [`defaults`], INI parsing in [`parser`], and file loading in
//! [`file`].
//!
//! # Example
//!
//! ```ignore
//! use taskgrid::config::ConfigFile;
//!
//! let config = ConfigFile::load_from("taskgrid.ini".as_ref())?;
//! assert!(config.cluster.networks >= 1);
//! ```

mod defaults;
mod file;
mod parser;
mod settings;

pub use defaults::{
    DEFAULT_LOG_DIRECTORY, DEFAULT_LOG_FILE, DEFAULT_TASKS,
};
pub use file::ConfigFileError;
pub use settings::{ClusterSettings, ConfigFile, LoggingSettings, SimulationSettings};
