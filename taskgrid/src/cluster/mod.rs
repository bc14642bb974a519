//! Cluster Simulation Framework
//!
//! This module provides the core of the task-dispatch simulation: worker
//! nodes grouped into named networks, a round-robin dispatcher, and a shared
//! backlog for tasks that could not be assigned immediately.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Dispatcher                             │
//! │  Round-robin over networks, falls back to the backlog       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Network-0            Network-1            Network-(k-1)     │
//! │  ┌──────────┐         ┌──────────┐         ┌──────────┐     │
//! │  │ Worker 0 │   ...   │ Worker 0 │   ...   │ Worker 0 │     │
//! │  │ Worker 1 │         │ Worker 1 │         │ Worker 1 │     │
//! │  └──────────┘         └──────────┘         └──────────┘     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                      Task Backlog (FIFO)                     │
//! │  Fed by the dispatcher and by failed executions; drained    │
//! │  by any worker that becomes idle (self-service pull)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Core Concepts
//!
//! - **Task**: an opaque identifier. Tasks have no internal structure and
//!   are never mutated.
//!
//! - **Worker**: processes at most one task at a time and independently
//!   simulates failure and recovery on a background loop. An idle worker
//!   unilaterally pulls the next backlog task without dispatcher
//!   involvement.
//!
//! - **Network**: a named, fixed, ordered group of workers. Purely a
//!   logical grouping; no real transport is involved.
//!
//! - **Dispatcher**: iterates submitted tasks in round-robin order over the
//!   networks. The cursor advances on every submission attempt, whether or
//!   not the assignment succeeded.
//!
//! # Determinism
//!
//! All randomized behavior (failure rolls, recovery downtime, processing
//! durations) flows through the [`SimulationPolicy`] trait so tests can
//! substitute scripted decisions for the seeded default.
//!
//! # Telemetry
//!
//! State transitions emit structured events via the [`EventSink`] trait.
//! The cluster emits exactly one event per transition: node failure, node
//! recovery, task start, task completion, task processing error (requeued),
//! task backlogged, and task picked up from the backlog.

mod config;
mod dispatcher;
mod network;
mod policy;
mod queue;
mod runtime;
mod task;
mod telemetry;
mod worker;

// Re-export public types

// Task identity
pub use task::TaskId;

// Shared backlog
pub use queue::TaskBacklog;

// Workers and networks
pub use network::Network;
pub use worker::{Worker, WorkerId};

// Dispatch
pub use dispatcher::Dispatcher;

// Cluster runtime
pub use runtime::Cluster;

// Simulation policy
pub use policy::{
    SeededPolicy, SimulationConfig, SimulationPolicy, DEFAULT_FAILURE_PROBABILITY,
    DEFAULT_FAILURE_TICK_MS, DEFAULT_PROCESSING_ERROR_PROBABILITY, DEFAULT_PROCESSING_MAX_MS,
    DEFAULT_PROCESSING_MIN_MS, DEFAULT_RECOVERY_MAX_MS, DEFAULT_RECOVERY_MIN_MS,
};

// Telemetry
pub use telemetry::{ClusterEvent, EventSink, NullEventSink, TracingEventSink};

// Configuration
pub use config::{ClusterConfig, DEFAULT_NETWORKS, DEFAULT_NODES_PER_NETWORK};
