//! Worker nodes.
//!
//! A worker is an independent execution unit with availability/failure
//! state. It accepts at most one task at a time, simulates failure and
//! recovery on a background loop, and self-serves from the shared backlog
//! whenever it becomes idle.
//!
//! # State machine
//!
//! `Idle` (available, not failed) → `Busy` (unavailable, not failed) →
//! `Idle`; independently `Idle`/`Busy` → `Failed` → `Idle` after a
//! recovery delay, followed immediately by a self-service backlog pull.
//!
//! # Locking
//!
//! The worker owns a private mutex guarding `available`/`failed` and the
//! transition logic. [`Worker::try_assign`] is the only way a task enters
//! the worker, and it re-validates state atomically under that lock; the
//! dispatcher's availability scan is a best-effort snapshot taken without
//! the lock, so a worker can fail between the scan and the assignment.
//! That race is resolved here, not there.

use super::policy::SimulationPolicy;
use super::queue::TaskBacklog;
use super::task::TaskId;
use super::telemetry::{ClusterEvent, EventSink};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

// =============================================================================
// Worker Identity
// =============================================================================

/// Identity of a worker: its network name plus node index within it.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct WorkerId {
    network: String,
    node: usize,
}

impl WorkerId {
    /// Creates a worker identity from a network name and node index.
    pub fn new(network: impl Into<String>, node: usize) -> Self {
        Self {
            network: network.into(),
            node,
        }
    }

    /// Returns the name of the network this worker belongs to.
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Returns the node index within the network.
    pub fn node(&self) -> usize {
        self.node
    }
}

impl fmt::Debug for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkerId({}/node-{})", self.network, self.node)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/node-{}", self.network, self.node)
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Mutable worker state, guarded by the worker's private mutex.
struct WorkerState {
    /// True only when the worker holds no in-flight task.
    available: bool,

    /// True while the worker is down. A failed worker is never handed a
    /// task; both the dispatcher scan and the self-service pull check it.
    failed: bool,

    /// Abort handle for the in-flight execution, if any. Cancelled when
    /// the node fails so the abandoned execution stops instead of
    /// completing on a nominally dead node.
    in_flight: Option<CancellationToken>,
}

/// An independent execution unit that processes at most one task at a time.
pub struct Worker {
    id: WorkerId,
    state: Mutex<WorkerState>,
    backlog: Arc<TaskBacklog>,
    policy: Arc<dyn SimulationPolicy>,
    events: Arc<dyn EventSink>,
    shutdown: CancellationToken,
}

impl Worker {
    /// Creates an idle worker.
    ///
    /// The worker does nothing on its own until its background
    /// failure/recovery loop is spawned via [`Worker::run`] and tasks are
    /// offered through [`Worker::try_assign`].
    pub fn new(
        id: WorkerId,
        backlog: Arc<TaskBacklog>,
        policy: Arc<dyn SimulationPolicy>,
        events: Arc<dyn EventSink>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            id,
            state: Mutex::new(WorkerState {
                available: true,
                failed: false,
                in_flight: None,
            }),
            backlog,
            policy,
            events,
            shutdown,
        }
    }

    /// Returns this worker's identity.
    pub fn id(&self) -> &WorkerId {
        &self.id
    }

    /// Snapshot of whether this worker could accept a task right now.
    ///
    /// This is a best-effort read for availability scans; it can be stale
    /// by the time the caller acts on it. [`Worker::try_assign`]
    /// re-validates under the worker's lock.
    pub fn is_assignable(&self) -> bool {
        let state = self.state.lock();
        state.available && !state.failed
    }

    /// Offers a task to this worker.
    ///
    /// Under the worker's lock: succeeds only if the worker is available
    /// and not failed, in which case it transitions to busy and launches
    /// the asynchronous execution. Otherwise returns `false` with no state
    /// change and no side effect—callers must handle `false` by queuing
    /// the task themselves.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn try_assign(self: &Arc<Self>, task: TaskId) -> bool {
        let abort = {
            let mut state = self.state.lock();
            if !state.available || state.failed {
                return false;
            }
            state.available = false;
            let abort = self.shutdown.child_token();
            state.in_flight = Some(abort.clone());
            abort
        };

        // Emitted at the Busy transition, not inside the spawned future, so
        // the start event is causally ordered with the acceptance.
        self.events.emit(ClusterEvent::TaskStarted {
            worker: self.id.clone(),
            task: task.clone(),
        });

        let worker = Arc::clone(self);
        tokio::spawn(async move {
            worker.execute(task, abort).await;
        });
        true
    }

    /// Runs the background failure/recovery loop until shutdown.
    ///
    /// Roughly once per tick the worker rolls for failure. On failure it
    /// abandons any in-flight task (which is *not* requeued—only the
    /// processing-error path requeues), waits out a recovery delay, then
    /// becomes available again and immediately checks the backlog.
    pub async fn run(self: Arc<Self>) {
        loop {
            let tick = self.policy.failure_tick(&self.id);
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(tick) => {}
            }

            if !self.policy.should_fail(&self.id) {
                continue;
            }

            {
                let mut state = self.state.lock();
                if state.failed {
                    continue;
                }
                state.failed = true;
                if let Some(in_flight) = state.in_flight.take() {
                    in_flight.cancel();
                }
            }
            self.events.emit(ClusterEvent::NodeFailed {
                worker: self.id.clone(),
            });

            let downtime = self.policy.recovery_delay(&self.id);
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(downtime) => {}
            }

            {
                let mut state = self.state.lock();
                state.failed = false;
                state.available = true;
            }
            self.events.emit(ClusterEvent::NodeRecovered {
                worker: self.id.clone(),
            });
            self.service_backlog();
        }
    }

    /// Asynchronous execution of one accepted task.
    async fn execute(self: Arc<Self>, task: TaskId, abort: CancellationToken) {
        let started = Instant::now();

        let delay = self.policy.processing_delay(&self.id, &task);
        tokio::select! {
            _ = abort.cancelled() => {
                // Node failed mid-task (or the cluster is shutting down).
                // The task is abandoned, not requeued; recovery restores
                // availability.
                debug!(worker = %self.id, task = %task, "Execution abandoned");
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }

        if self.policy.processing_fails(&self.id, &task) {
            self.events.emit(ClusterEvent::TaskErrored {
                worker: self.id.clone(),
                task: task.clone(),
            });
            self.backlog.push(task);
        } else {
            self.events.emit(ClusterEvent::TaskCompleted {
                worker: self.id.clone(),
                task,
                duration: started.elapsed(),
            });
        }

        {
            let mut state = self.state.lock();
            state.in_flight = None;
            state.available = true;
        }
        self.service_backlog();
    }

    /// Self-service backlog pull: if idle and not failed, pop the next
    /// backlog task and attempt to take it.
    ///
    /// A popped task that loses the `try_assign` re-validation race is
    /// pushed back onto the backlog so it is never dropped.
    fn service_backlog(self: &Arc<Self>) {
        {
            let state = self.state.lock();
            if state.failed || !state.available {
                return;
            }
        }

        let Some(task) = self.backlog.pop() else {
            return;
        };
        self.events.emit(ClusterEvent::TaskDequeued {
            worker: self.id.clone(),
            task: task.clone(),
            backlog_depth: self.backlog.len(),
        });

        if !self.try_assign(task.clone()) {
            debug!(worker = %self.id, task = %task, "Lost assignment race, task returned to backlog");
            self.backlog.push(task);
        }
    }

    /// Forces the failed flag, bypassing the failure loop. Test hook.
    #[cfg(test)]
    pub(crate) fn force_failed(&self, failed: bool) {
        self.state.lock().failed = failed;
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("available", &state.available)
            .field("failed", &state.failed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::telemetry::NullEventSink;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Policy with fixed delays and no spontaneous failures.
    struct QuietPolicy {
        processing: Duration,
        error_once_for: StdMutex<Vec<String>>,
    }

    impl QuietPolicy {
        fn new(processing: Duration) -> Self {
            Self {
                processing,
                error_once_for: StdMutex::new(Vec::new()),
            }
        }

        fn with_error_for(processing: Duration, task: &str) -> Self {
            Self {
                processing,
                error_once_for: StdMutex::new(vec![task.to_string()]),
            }
        }
    }

    impl SimulationPolicy for QuietPolicy {
        fn failure_tick(&self, _worker: &WorkerId) -> Duration {
            Duration::from_secs(3600)
        }

        fn should_fail(&self, _worker: &WorkerId) -> bool {
            false
        }

        fn recovery_delay(&self, _worker: &WorkerId) -> Duration {
            Duration::ZERO
        }

        fn processing_delay(&self, _worker: &WorkerId, _task: &TaskId) -> Duration {
            self.processing
        }

        fn processing_fails(&self, _worker: &WorkerId, task: &TaskId) -> bool {
            let mut once = self.error_once_for.lock().unwrap();
            if let Some(pos) = once.iter().position(|t| t == task.as_str()) {
                once.remove(pos);
                return true;
            }
            false
        }
    }

    /// Sink that records every event in order.
    #[derive(Default)]
    struct RecordingSink {
        events: StdMutex<Vec<ClusterEvent>>,
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: ClusterEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl RecordingSink {
        fn types(&self) -> Vec<&'static str> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.event_type())
                .collect()
        }
    }

    fn make_worker(
        policy: Arc<dyn SimulationPolicy>,
        events: Arc<dyn EventSink>,
    ) -> (Arc<Worker>, Arc<TaskBacklog>) {
        let backlog = Arc::new(TaskBacklog::new());
        let worker = Arc::new(Worker::new(
            WorkerId::new("network-0", 0),
            Arc::clone(&backlog),
            policy,
            events,
            CancellationToken::new(),
        ));
        (worker, backlog)
    }

    async fn wait_until(mut check: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !check() {
            assert!(Instant::now() < deadline, "condition not met in time");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_try_assign_accepts_when_idle() {
        let policy = Arc::new(QuietPolicy::new(Duration::from_millis(10)));
        let sink = Arc::new(RecordingSink::default());
        let (worker, _backlog) = make_worker(policy, Arc::clone(&sink) as Arc<dyn EventSink>);

        assert!(worker.try_assign(TaskId::new("task-0")));
        assert!(!worker.is_assignable());

        wait_until(|| sink.types().contains(&"task_completed")).await;
        assert!(worker.is_assignable());
        assert_eq!(sink.types(), vec!["task_started", "task_completed"]);
    }

    #[tokio::test]
    async fn test_try_assign_rejects_when_busy() {
        let policy = Arc::new(QuietPolicy::new(Duration::from_millis(200)));
        let (worker, backlog) = make_worker(policy, Arc::new(NullEventSink));

        assert!(worker.try_assign(TaskId::new("task-0")));
        // Second assignment is rejected with no side effect
        assert!(!worker.try_assign(TaskId::new("task-1")));
        assert!(backlog.is_empty());
    }

    #[tokio::test]
    async fn test_try_assign_rejects_when_failed() {
        let policy = Arc::new(QuietPolicy::new(Duration::from_millis(10)));
        let (worker, _backlog) = make_worker(policy, Arc::new(NullEventSink));

        worker.force_failed(true);
        assert!(!worker.is_assignable());
        assert!(!worker.try_assign(TaskId::new("task-0")));

        worker.force_failed(false);
        assert!(worker.try_assign(TaskId::new("task-0")));
    }

    #[tokio::test]
    async fn test_processing_error_requeues_then_retries() {
        let policy = Arc::new(QuietPolicy::with_error_for(
            Duration::from_millis(5),
            "task-0",
        ));
        let sink = Arc::new(RecordingSink::default());
        let (worker, backlog) = make_worker(policy, Arc::clone(&sink) as Arc<dyn EventSink>);

        assert!(worker.try_assign(TaskId::new("task-0")));

        // Errors once, goes back to the backlog, gets self-serviced, completes
        wait_until(|| sink.types().contains(&"task_completed")).await;
        let types = sink.types();
        assert_eq!(
            types,
            vec![
                "task_started",
                "task_errored",
                "task_dequeued",
                "task_started",
                "task_completed",
            ]
        );
        assert!(backlog.is_empty());
    }

    #[tokio::test]
    async fn test_idle_worker_self_services_backlog() {
        let policy = Arc::new(QuietPolicy::new(Duration::from_millis(5)));
        let sink = Arc::new(RecordingSink::default());
        let (worker, backlog) = make_worker(policy, Arc::clone(&sink) as Arc<dyn EventSink>);

        backlog.push(TaskId::new("task-1"));
        assert!(worker.try_assign(TaskId::new("task-0")));

        // After completing task-0 the worker pulls task-1 on its own
        wait_until(|| {
            sink.types()
                .iter()
                .filter(|t| **t == "task_completed")
                .count()
                == 2
        })
        .await;
        assert!(backlog.is_empty());
    }

    #[tokio::test]
    async fn test_failure_loop_fails_and_recovers() {
        struct FailOncePolicy {
            fired: StdMutex<bool>,
        }

        impl SimulationPolicy for FailOncePolicy {
            fn failure_tick(&self, _worker: &WorkerId) -> Duration {
                Duration::from_millis(5)
            }

            fn should_fail(&self, _worker: &WorkerId) -> bool {
                let mut fired = self.fired.lock().unwrap();
                if *fired {
                    false
                } else {
                    *fired = true;
                    true
                }
            }

            fn recovery_delay(&self, _worker: &WorkerId) -> Duration {
                Duration::from_millis(20)
            }

            fn processing_delay(&self, _worker: &WorkerId, _task: &TaskId) -> Duration {
                Duration::ZERO
            }

            fn processing_fails(&self, _worker: &WorkerId, _task: &TaskId) -> bool {
                false
            }
        }

        let policy = Arc::new(FailOncePolicy {
            fired: StdMutex::new(false),
        });
        let sink = Arc::new(RecordingSink::default());
        let (worker, backlog) = make_worker(policy, Arc::clone(&sink) as Arc<dyn EventSink>);

        // A task waiting on the backlog is picked up right after recovery
        backlog.push(TaskId::new("task-0"));

        let loop_handle = tokio::spawn(Arc::clone(&worker).run());

        wait_until(|| sink.types().contains(&"task_completed")).await;
        let types = sink.types();
        let failed = types.iter().position(|t| *t == "node_failed").unwrap();
        let recovered = types.iter().position(|t| *t == "node_recovered").unwrap();
        let dequeued = types.iter().position(|t| *t == "task_dequeued").unwrap();
        assert!(failed < recovered);
        assert!(recovered < dequeued);

        worker.shutdown.cancel();
        let _ = loop_handle.await;
    }

    #[tokio::test]
    async fn test_failure_aborts_in_flight_task_without_requeue() {
        let policy = Arc::new(QuietPolicy::new(Duration::from_secs(60)));
        let sink = Arc::new(RecordingSink::default());
        let (worker, backlog) = make_worker(policy, Arc::clone(&sink) as Arc<dyn EventSink>);

        assert!(worker.try_assign(TaskId::new("task-0")));
        wait_until(|| sink.types().contains(&"task_started")).await;

        // Mimic what the failure loop does to the in-flight execution
        {
            let mut state = worker.state.lock();
            state.failed = true;
            if let Some(in_flight) = state.in_flight.take() {
                in_flight.cancel();
            }
        }

        // The abandoned task never completes, never errors, never requeues
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sink.types(), vec!["task_started"]);
        assert!(backlog.is_empty());
    }
}
