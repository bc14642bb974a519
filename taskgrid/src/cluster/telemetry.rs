//! Telemetry for cluster observability.
//!
//! Workers and the dispatcher emit structured events via a sink abstraction.
//! The cluster doesn't know how events are consumed—this follows the
//! "emit, don't present" pattern: components focus on emitting structured
//! events, and consumers (logging, tests, UI) decide how to present or
//! aggregate them.
//!
//! The cluster emits exactly one event per state transition. The event
//! occurrences and their causal order relative to the transitions are part
//! of the core contract; the textual formatting is not.

use super::task::TaskId;
use super::worker::WorkerId;
use std::time::Duration;

// =============================================================================
// Cluster Events
// =============================================================================

/// Events emitted during cluster operation.
#[derive(Clone, Debug)]
pub enum ClusterEvent {
    // -------------------------------------------------------------------------
    // Node Lifecycle Events
    // -------------------------------------------------------------------------
    /// A worker node failed (simulated). Any in-flight task is abandoned.
    NodeFailed { worker: WorkerId },

    /// A worker node recovered from failure and is available again.
    NodeRecovered { worker: WorkerId },

    // -------------------------------------------------------------------------
    // Task Lifecycle Events
    // -------------------------------------------------------------------------
    /// A worker accepted a task and started executing it.
    TaskStarted { worker: WorkerId, task: TaskId },

    /// A worker finished executing a task normally.
    TaskCompleted {
        worker: WorkerId,
        task: TaskId,
        duration: Duration,
    },

    /// A task's execution hit a simulated processing error.
    ///
    /// The task has been returned to the backlog intact; it is not lost.
    TaskErrored { worker: WorkerId, task: TaskId },

    // -------------------------------------------------------------------------
    // Backlog Events
    // -------------------------------------------------------------------------
    /// The targeted network had no available worker; the task went to the
    /// backlog instead.
    TaskBacklogged {
        network: String,
        task: TaskId,
        backlog_depth: usize,
    },

    /// An idle worker picked a task up from the backlog (self-service pull).
    TaskDequeued {
        worker: WorkerId,
        task: TaskId,
        backlog_depth: usize,
    },
}

impl ClusterEvent {
    /// Returns the task associated with this event, if any.
    pub fn task(&self) -> Option<&TaskId> {
        match self {
            Self::TaskStarted { task, .. }
            | Self::TaskCompleted { task, .. }
            | Self::TaskErrored { task, .. }
            | Self::TaskBacklogged { task, .. }
            | Self::TaskDequeued { task, .. } => Some(task),
            Self::NodeFailed { .. } | Self::NodeRecovered { .. } => None,
        }
    }

    /// Returns the worker associated with this event, if any.
    pub fn worker(&self) -> Option<&WorkerId> {
        match self {
            Self::NodeFailed { worker }
            | Self::NodeRecovered { worker }
            | Self::TaskStarted { worker, .. }
            | Self::TaskCompleted { worker, .. }
            | Self::TaskErrored { worker, .. }
            | Self::TaskDequeued { worker, .. } => Some(worker),
            Self::TaskBacklogged { .. } => None,
        }
    }

    /// Returns a short name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NodeFailed { .. } => "node_failed",
            Self::NodeRecovered { .. } => "node_recovered",
            Self::TaskStarted { .. } => "task_started",
            Self::TaskCompleted { .. } => "task_completed",
            Self::TaskErrored { .. } => "task_errored",
            Self::TaskBacklogged { .. } => "task_backlogged",
            Self::TaskDequeued { .. } => "task_dequeued",
        }
    }
}

// =============================================================================
// Event Sink Trait
// =============================================================================

/// Sink for cluster events.
///
/// Implement this trait to receive events from the cluster. Common
/// implementations include logging and test recorders.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`) as events are
/// emitted from multiple tasks concurrently. `emit` should be fast and
/// non-blocking.
pub trait EventSink: Send + Sync {
    /// Called when a cluster event occurs.
    fn emit(&self, event: ClusterEvent);
}

// =============================================================================
// Built-in Sink Implementations
// =============================================================================

/// No-op sink for when telemetry is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: ClusterEvent) {
        // Intentionally empty
    }
}

/// Sink that logs events using the `tracing` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: ClusterEvent) {
        match &event {
            ClusterEvent::NodeFailed { worker } => {
                tracing::warn!(worker = %worker, "Node failed");
            }
            ClusterEvent::NodeRecovered { worker } => {
                tracing::info!(worker = %worker, "Node recovered");
            }
            ClusterEvent::TaskStarted { worker, task } => {
                tracing::info!(worker = %worker, task = %task, "Task started");
            }
            ClusterEvent::TaskCompleted {
                worker,
                task,
                duration,
            } => {
                tracing::info!(
                    worker = %worker,
                    task = %task,
                    duration_ms = duration.as_millis(),
                    "Task completed"
                );
            }
            ClusterEvent::TaskErrored { worker, task } => {
                tracing::warn!(worker = %worker, task = %task, "Task errored, requeued");
            }
            ClusterEvent::TaskBacklogged {
                network,
                task,
                backlog_depth,
            } => {
                tracing::warn!(
                    network = %network,
                    task = %task,
                    backlog_depth = backlog_depth,
                    "No available worker, task backlogged"
                );
            }
            ClusterEvent::TaskDequeued {
                worker,
                task,
                backlog_depth,
            } => {
                tracing::info!(
                    worker = %worker,
                    task = %task,
                    backlog_depth = backlog_depth,
                    "Task picked up from backlog"
                );
            }
        }
    }
}
