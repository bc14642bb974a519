//! TaskGrid CLI - Command-line interface
//!
//! Boots the simulated task-dispatch cluster: loads configuration, starts
//! the worker networks, submits the configured batch of tasks through the
//! round-robin dispatcher, and runs until Ctrl-C (or a bounded duration).

mod error;

use clap::Parser;
use error::CliError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use taskgrid::cluster::{
    Cluster, ClusterConfig, SeededPolicy, SimulationConfig, TaskId, TracingEventSink,
};
use taskgrid::config::ConfigFile;
use taskgrid::logging;

#[derive(Parser)]
#[command(name = "taskgrid")]
#[command(about = "Simulated distributed task-dispatch cluster", long_about = None)]
#[command(version = taskgrid::VERSION)]
struct Args {
    /// Path to the INI configuration file
    #[arg(long, default_value = "taskgrid.ini")]
    config: PathBuf,

    /// Number of worker networks (overrides the config file)
    #[arg(long)]
    networks: Option<usize>,

    /// Number of worker nodes per network (overrides the config file)
    #[arg(long)]
    nodes_per_network: Option<usize>,

    /// Number of tasks to submit at startup (overrides the config file)
    #[arg(long)]
    tasks: Option<usize>,

    /// RNG seed for a reproducible run (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    run_for: Option<u64>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(err) = run(args).await {
        err.exit();
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let mut config = ConfigFile::load_from(&args.config).map_err(CliError::Config)?;

    // CLI flags override the config file
    if let Some(networks) = args.networks {
        config.cluster.networks = networks;
    }
    if let Some(nodes) = args.nodes_per_network {
        config.cluster.nodes_per_network = nodes;
    }
    if let Some(tasks) = args.tasks {
        config.cluster.tasks = tasks;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }

    let _logging_guard = logging::init_logging(&config.logging.directory, &config.logging.file)
        .map_err(CliError::LoggingInit)?;

    tracing::info!(
        version = taskgrid::VERSION,
        networks = config.cluster.networks,
        nodes_per_network = config.cluster.nodes_per_network,
        tasks = config.cluster.tasks,
        seed = ?config.simulation.seed,
        "TaskGrid starting"
    );

    let policy = Arc::new(SeededPolicy::new(SimulationConfig::from(&config.simulation)));
    let cluster = Cluster::start(
        ClusterConfig::from(&config.cluster),
        policy,
        Arc::new(TracingEventSink),
    );

    let tasks = (0..config.cluster.tasks).map(|i| TaskId::new(format!("task-{i}")));
    cluster.dispatcher().distribute(tasks);

    match args.run_for {
        Some(secs) => {
            tracing::info!(seconds = secs, "Running for a bounded duration");
            tokio::time::sleep(Duration::from_secs(secs)).await;
        }
        None => {
            tracing::info!("Running until Ctrl-C");
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "Failed to listen for Ctrl-C, shutting down");
            }
        }
    }

    tracing::info!(
        backlog_depth = cluster.backlog().len(),
        "Shutdown requested"
    );
    cluster.shutdown().await;
    Ok(())
}
