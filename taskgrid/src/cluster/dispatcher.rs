//! Round-robin task dispatching.
//!
//! The dispatcher owns the ordered list of networks and a round-robin
//! cursor. Each submitted task targets exactly one network; if that
//! network has no available worker the task goes to the shared backlog,
//! never to another network within the same submission. The cursor
//! advances on every submission attempt regardless of outcome, so the
//! target-network sequence is cyclic and deterministic.

use super::network::Network;
use super::queue::TaskBacklog;
use super::task::TaskId;
use super::telemetry::{ClusterEvent, EventSink};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Dispatcher state guarded by one mutex: the round-robin cursor and the
/// availability scan are serialized together.
struct DispatchState {
    cursor: usize,
}

/// Round-robin dispatcher over a fixed set of networks.
pub struct Dispatcher {
    networks: Vec<Network>,
    backlog: Arc<TaskBacklog>,
    events: Arc<dyn EventSink>,
    state: Mutex<DispatchState>,
}

impl Dispatcher {
    /// Creates a dispatcher over the given networks.
    ///
    /// At least one network is required; the round-robin cursor has no
    /// meaning over an empty set.
    pub fn new(networks: Vec<Network>, backlog: Arc<TaskBacklog>, events: Arc<dyn EventSink>) -> Self {
        assert!(!networks.is_empty(), "dispatcher requires at least one network");
        Self {
            networks,
            backlog,
            events,
            state: Mutex::new(DispatchState { cursor: 0 }),
        }
    }

    /// Returns the networks in dispatch order.
    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    /// Distributes tasks in submission order.
    ///
    /// For each task: pick the cursor's network, attempt assignment there,
    /// advance the cursor unconditionally, and on rejection push the task
    /// to the backlog and move on. There is no retry against a different
    /// network within the same submission.
    ///
    /// Must be called from within a Tokio runtime (accepted tasks spawn
    /// their executions).
    pub fn distribute<I>(&self, tasks: I)
    where
        I: IntoIterator<Item = TaskId>,
    {
        for task in tasks {
            let target = self.advance_cursor();
            if self.assign_to_network(target, task.clone()) {
                continue;
            }

            self.events.emit(ClusterEvent::TaskBacklogged {
                network: self.networks[target].name().to_string(),
                task: task.clone(),
                backlog_depth: self.backlog.len() + 1,
            });
            self.backlog.push(task);
        }
    }

    /// Attempts to assign one task to one network.
    ///
    /// Under the dispatcher's lock, scans the network's workers in fixed
    /// index order and offers the task to the *first* worker whose state
    /// snapshot reads available-and-not-failed. The snapshot is
    /// best-effort: the worker re-validates atomically under its own lock
    /// inside `try_assign`, so a worker that failed since the scan simply
    /// rejects.
    ///
    /// Returns true iff a worker accepted the task. The tie-break is
    /// deliberate and deterministic: lowest node index wins among
    /// currently-available workers.
    pub fn assign_to_network(&self, network_index: usize, task: TaskId) -> bool {
        let _scan = self.state.lock();
        let network = &self.networks[network_index];

        match network.workers().iter().find(|w| w.is_assignable()) {
            Some(worker) => {
                let accepted = worker.try_assign(task);
                if !accepted {
                    debug!(
                        network = network.name(),
                        worker = %worker.id(),
                        "Worker rejected assignment after scan"
                    );
                }
                accepted
            }
            None => false,
        }
    }

    /// Returns the current target and advances the cursor by one, modulo
    /// the network count.
    fn advance_cursor(&self) -> usize {
        let mut state = self.state.lock();
        let target = state.cursor;
        state.cursor = (state.cursor + 1) % self.networks.len();
        target
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("networks", &self.networks.len())
            .field("cursor", &self.state.lock().cursor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::telemetry::NullEventSink;
    use crate::cluster::worker::{Worker, WorkerId};
    use crate::cluster::{SimulationPolicy, TaskBacklog};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    struct SlowPolicy;

    impl SimulationPolicy for SlowPolicy {
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
            // Long enough that workers stay busy for the whole test
            Duration::from_secs(60)
        }

        fn processing_fails(&self, _worker: &WorkerId, _task: &TaskId) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: StdMutex<Vec<ClusterEvent>>,
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: ClusterEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn make_dispatcher(
        network_count: usize,
        nodes_per_network: usize,
        events: Arc<dyn EventSink>,
    ) -> (Dispatcher, Arc<TaskBacklog>) {
        let backlog = Arc::new(TaskBacklog::new());
        let policy: Arc<dyn SimulationPolicy> = Arc::new(SlowPolicy);
        let networks = (0..network_count)
            .map(|n| {
                let name = format!("network-{n}");
                let workers = (0..nodes_per_network)
                    .map(|node| {
                        Arc::new(Worker::new(
                            WorkerId::new(name.clone(), node),
                            Arc::clone(&backlog),
                            Arc::clone(&policy),
                            Arc::clone(&events),
                            CancellationToken::new(),
                        ))
                    })
                    .collect();
                Network::new(name, workers)
            })
            .collect();
        (
            Dispatcher::new(networks, Arc::clone(&backlog), events),
            backlog,
        )
    }

    #[tokio::test]
    async fn test_cursor_cycles_over_networks() {
        let sink = Arc::new(RecordingSink::default());
        let (dispatcher, _backlog) =
            make_dispatcher(3, 1, Arc::clone(&sink) as Arc<dyn EventSink>);

        // Six tasks over three one-worker networks: the second sweep finds
        // every worker busy, so each task is backlogged at its target.
        dispatcher.distribute((0..6).map(|i| TaskId::new(format!("task-{i}"))));

        let events = sink.events.lock().unwrap();
        let backlogged: Vec<String> = events
            .iter()
            .filter_map(|e| match e {
                ClusterEvent::TaskBacklogged { network, .. } => Some(network.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(backlogged, vec!["network-0", "network-1", "network-2"]);
    }

    #[tokio::test]
    async fn test_cursor_advances_on_failed_assignment() {
        let sink = Arc::new(RecordingSink::default());
        let (dispatcher, backlog) =
            make_dispatcher(2, 1, Arc::clone(&sink) as Arc<dyn EventSink>);

        // Fail every worker so no assignment can succeed
        for network in dispatcher.networks() {
            for worker in network.workers() {
                worker.force_failed(true);
            }
        }

        dispatcher.distribute((0..4).map(|i| TaskId::new(format!("task-{i}"))));

        // Cursor still cycled 0,1,0,1 even though every attempt failed
        let events = sink.events.lock().unwrap();
        let targets: Vec<String> = events
            .iter()
            .filter_map(|e| match e {
                ClusterEvent::TaskBacklogged { network, .. } => Some(network.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            targets,
            vec!["network-0", "network-1", "network-0", "network-1"]
        );
        assert_eq!(backlog.len(), 4);
    }

    #[tokio::test]
    async fn test_lowest_index_worker_wins() {
        let sink = Arc::new(RecordingSink::default());
        let (dispatcher, _backlog) =
            make_dispatcher(1, 3, Arc::clone(&sink) as Arc<dyn EventSink>);

        dispatcher.distribute((0..3).map(|i| TaskId::new(format!("task-{i}"))));

        let events = sink.events.lock().unwrap();
        let started: Vec<(String, usize)> = events
            .iter()
            .filter_map(|e| match e {
                ClusterEvent::TaskStarted { worker, task } => {
                    Some((task.as_str().to_string(), worker.node()))
                }
                _ => None,
            })
            .collect();
        // Each submission takes the lowest currently-available index
        assert_eq!(
            started,
            vec![
                ("task-0".to_string(), 0),
                ("task-1".to_string(), 1),
                ("task-2".to_string(), 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_workers_are_skipped_in_scan() {
        let sink = Arc::new(RecordingSink::default());
        let (dispatcher, _backlog) =
            make_dispatcher(1, 2, Arc::clone(&sink) as Arc<dyn EventSink>);

        dispatcher.networks()[0].workers()[0].force_failed(true);
        dispatcher.distribute([TaskId::new("task-0")]);

        let events = sink.events.lock().unwrap();
        let started: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                ClusterEvent::TaskStarted { worker, .. } => Some(worker.node()),
                _ => None,
            })
            .collect();
        assert_eq!(started, vec![1]);
    }

    #[tokio::test]
    async fn test_rejected_task_goes_to_backlog_not_another_network() {
        let sink = Arc::new(RecordingSink::default());
        let (dispatcher, backlog) =
            make_dispatcher(2, 1, Arc::clone(&sink) as Arc<dyn EventSink>);

        // Only network-0 is unavailable; network-1 is idle
        dispatcher.networks()[0].workers()[0].force_failed(true);

        dispatcher.distribute([TaskId::new("task-0")]);

        // task-0 targeted network-0, was rejected, and went to the
        // backlog even though network-1 had a free worker
        assert_eq!(backlog.len(), 1);
        let events = sink.events.lock().unwrap();
        assert!(events
            .iter()
            .all(|e| !matches!(e, ClusterEvent::TaskStarted { .. })));
    }

    #[test]
    #[should_panic(expected = "at least one network")]
    fn test_empty_network_set_is_rejected() {
        let backlog = Arc::new(TaskBacklog::new());
        let _ = Dispatcher::new(Vec::new(), backlog, Arc::new(NullEventSink));
    }
}
