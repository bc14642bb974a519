//! Cluster assembly and runtime.
//!
//! [`Cluster::start`] builds the networks and workers from configuration,
//! spawns every worker's background failure/recovery loop under a shared
//! cancellation token, and hands back the dispatcher and backlog. The
//! cluster has an explicit shutdown path: cancelling the token stops the
//! background loops and aborts in-flight executions, so the process (and
//! every test) can terminate deterministically.

use super::config::ClusterConfig;
use super::dispatcher::Dispatcher;
use super::network::Network;
use super::policy::SimulationPolicy;
use super::queue::TaskBacklog;
use super::telemetry::EventSink;
use super::worker::{Worker, WorkerId};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// A running cluster: networks of workers plus the dispatcher over them.
pub struct Cluster {
    dispatcher: Arc<Dispatcher>,
    backlog: Arc<TaskBacklog>,
    shutdown: CancellationToken,
    worker_loops: Vec<JoinHandle<()>>,
}

impl Cluster {
    /// Builds the cluster and spawns all worker background loops.
    ///
    /// Networks are named `network-0` through `network-(k-1)` and scanned
    /// by the dispatcher in that order.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        config: ClusterConfig,
        policy: Arc<dyn SimulationPolicy>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let backlog = Arc::new(TaskBacklog::new());
        let mut worker_loops = Vec::with_capacity(config.networks * config.nodes_per_network);

        let networks: Vec<Network> = (0..config.networks)
            .map(|n| {
                let name = format!("network-{n}");
                let workers = (0..config.nodes_per_network)
                    .map(|node| {
                        let worker = Arc::new(Worker::new(
                            WorkerId::new(name.clone(), node),
                            Arc::clone(&backlog),
                            Arc::clone(&policy),
                            Arc::clone(&events),
                            shutdown.clone(),
                        ));
                        worker_loops.push(tokio::spawn(Arc::clone(&worker).run()));
                        worker
                    })
                    .collect();
                Network::new(name, workers)
            })
            .collect();

        info!(
            networks = config.networks,
            nodes_per_network = config.nodes_per_network,
            "Cluster started"
        );

        let dispatcher = Arc::new(Dispatcher::new(networks, Arc::clone(&backlog), events));

        Self {
            dispatcher,
            backlog,
            shutdown,
            worker_loops,
        }
    }

    /// Returns the dispatcher over this cluster's networks.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Returns the shared task backlog.
    pub fn backlog(&self) -> &Arc<TaskBacklog> {
        &self.backlog
    }

    /// Returns a token that is cancelled when the cluster shuts down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Shuts the cluster down deterministically.
    ///
    /// Cancels the shared token (stopping every failure/recovery loop and
    /// aborting in-flight executions) and waits for the worker loops to
    /// finish.
    pub async fn shutdown(self) {
        info!("Cluster shutting down");
        self.shutdown.cancel();
        for handle in self.worker_loops {
            let _ = handle.await;
        }
    }
}

impl std::fmt::Debug for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cluster")
            .field("networks", &self.dispatcher.networks().len())
            .field("backlog_depth", &self.backlog.len())
            .finish_non_exhaustive()
    }
}
