//! TaskGrid - simulated distributed task-dispatch cluster
//!
//! This library models a cluster of named worker groups ("networks") whose
//! worker nodes execute opaque tasks, fail and recover at random, and pull
//! backlog work from a shared queue. A round-robin dispatcher pushes each
//! submitted task toward one network and falls back to the shared backlog
//! when the targeted network has no available worker.
//!
//! # High-Level API
//!
//! ```ignore
//! use std::sync::Arc;
//! use taskgrid::cluster::{
//!     Cluster, ClusterConfig, SeededPolicy, SimulationConfig, TaskId, TracingEventSink,
//! };
//!
//! let policy = Arc::new(SeededPolicy::new(SimulationConfig::default()));
//! let cluster = Cluster::start(ClusterConfig::default(), policy, Arc::new(TracingEventSink));
//!
//! let tasks = (0..100).map(|i| TaskId::new(format!("task-{i}")));
//! cluster.dispatcher().distribute(tasks);
//!
//! // ... later ...
//! cluster.shutdown().await;
//! ```

pub mod cluster;
pub mod config;
pub mod logging;

/// Version of the TaskGrid library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
