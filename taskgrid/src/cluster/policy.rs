//! Simulation policy: the injected source of time and randomness.
//!
//! Every randomized decision in the cluster (whether a node fails on a
//! given tick, how long it stays down, how long a task takes to process,
//! whether processing errors out) flows through the [`SimulationPolicy`]
//! trait. The production implementation is [`SeededPolicy`], a seedable
//! RNG-backed policy; tests substitute scripted implementations so
//! failure/recovery/duration sequences are deterministic rather than
//! probabilistic.
//!
//! Decisions are keyed by worker (and task) identity so a test can script
//! one specific node without touching the rest of the cluster.

use super::task::TaskId;
use super::worker::WorkerId;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

// =============================================================================
// Defaults
// =============================================================================

/// Probability that a worker fails on any given failure-loop tick.
pub const DEFAULT_FAILURE_PROBABILITY: f64 = 0.05;

/// Probability that a task execution hits a simulated processing error.
pub const DEFAULT_PROCESSING_ERROR_PROBABILITY: f64 = 0.01;

/// Interval between failure-loop ticks, in milliseconds.
pub const DEFAULT_FAILURE_TICK_MS: u64 = 1_000;

/// Minimum downtime before a failed worker recovers, in milliseconds.
pub const DEFAULT_RECOVERY_MIN_MS: u64 = 5_000;

/// Maximum downtime before a failed worker recovers, in milliseconds.
pub const DEFAULT_RECOVERY_MAX_MS: u64 = 10_000;

/// Minimum simulated task processing duration, in milliseconds.
pub const DEFAULT_PROCESSING_MIN_MS: u64 = 5_000;

/// Maximum simulated task processing duration, in milliseconds.
pub const DEFAULT_PROCESSING_MAX_MS: u64 = 10_000;

// =============================================================================
// Simulation Configuration
// =============================================================================

/// Configuration for the seeded simulation policy.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// RNG seed. `None` seeds from entropy (non-reproducible runs).
    pub seed: Option<u64>,

    /// Per-tick probability of a node failure, in `[0.0, 1.0]`.
    pub failure_probability: f64,

    /// Per-execution probability of a simulated processing error,
    /// in `[0.0, 1.0]`.
    pub processing_error_probability: f64,

    /// Interval between failure-loop ticks.
    pub failure_tick: Duration,

    /// Downtime range for a failed worker.
    pub recovery_delay: (Duration, Duration),

    /// Simulated processing duration range.
    pub processing_delay: (Duration, Duration),
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            failure_probability: DEFAULT_FAILURE_PROBABILITY,
            processing_error_probability: DEFAULT_PROCESSING_ERROR_PROBABILITY,
            failure_tick: Duration::from_millis(DEFAULT_FAILURE_TICK_MS),
            recovery_delay: (
                Duration::from_millis(DEFAULT_RECOVERY_MIN_MS),
                Duration::from_millis(DEFAULT_RECOVERY_MAX_MS),
            ),
            processing_delay: (
                Duration::from_millis(DEFAULT_PROCESSING_MIN_MS),
                Duration::from_millis(DEFAULT_PROCESSING_MAX_MS),
            ),
        }
    }
}

impl From<&crate::config::SimulationSettings> for SimulationConfig {
    fn from(settings: &crate::config::SimulationSettings) -> Self {
        Self {
            seed: settings.seed,
            failure_probability: settings.failure_probability,
            processing_error_probability: settings.processing_error_probability,
            failure_tick: Duration::from_millis(settings.failure_tick_ms),
            recovery_delay: (
                Duration::from_millis(settings.recovery_min_ms),
                Duration::from_millis(settings.recovery_max_ms),
            ),
            processing_delay: (
                Duration::from_millis(settings.processing_min_ms),
                Duration::from_millis(settings.processing_max_ms),
            ),
        }
    }
}

// =============================================================================
// Simulation Policy Trait
// =============================================================================

/// Source of all randomized timing and failure decisions.
///
/// # Thread Safety
///
/// Implementations must be thread-safe; decisions are requested
/// concurrently from every worker's background loop and execution path.
pub trait SimulationPolicy: Send + Sync + 'static {
    /// Interval the failure loop sleeps between failure rolls.
    fn failure_tick(&self, worker: &WorkerId) -> Duration;

    /// Rolls whether the given worker fails on this tick.
    fn should_fail(&self, worker: &WorkerId) -> bool;

    /// Downtime before the given worker recovers from a failure.
    fn recovery_delay(&self, worker: &WorkerId) -> Duration;

    /// Simulated processing duration for a task on the given worker.
    fn processing_delay(&self, worker: &WorkerId, task: &TaskId) -> Duration;

    /// Rolls whether this execution hits a simulated processing error.
    fn processing_fails(&self, worker: &WorkerId, task: &TaskId) -> bool;
}

// =============================================================================
// Seeded Policy
// =============================================================================

/// RNG-backed policy with an optionally fixed seed.
///
/// With a fixed seed the decision *sequence* is reproducible; the
/// interleaving across workers still depends on scheduling, which is why
/// tests prefer scripted [`SimulationPolicy`] implementations for exact
/// scenarios.
pub struct SeededPolicy {
    config: SimulationConfig,
    rng: Mutex<StdRng>,
}

impl SeededPolicy {
    /// Creates a policy from the given configuration.
    ///
    /// Probabilities are clamped to `[0.0, 1.0]`.
    pub fn new(mut config: SimulationConfig) -> Self {
        config.failure_probability = config.failure_probability.clamp(0.0, 1.0);
        config.processing_error_probability = config.processing_error_probability.clamp(0.0, 1.0);

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    fn delay_in(&self, (min, max): (Duration, Duration)) -> Duration {
        let min_ms = min.as_millis() as u64;
        let max_ms = max.as_millis() as u64;
        if min_ms >= max_ms {
            return min;
        }
        let ms = self.rng.lock().gen_range(min_ms..=max_ms);
        Duration::from_millis(ms)
    }

    fn roll(&self, probability: f64) -> bool {
        if probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.rng.lock().gen_bool(probability)
    }
}

impl SimulationPolicy for SeededPolicy {
    fn failure_tick(&self, _worker: &WorkerId) -> Duration {
        self.config.failure_tick
    }

    fn should_fail(&self, _worker: &WorkerId) -> bool {
        self.roll(self.config.failure_probability)
    }

    fn recovery_delay(&self, _worker: &WorkerId) -> Duration {
        self.delay_in(self.config.recovery_delay)
    }

    fn processing_delay(&self, _worker: &WorkerId, _task: &TaskId) -> Duration {
        self.delay_in(self.config.processing_delay)
    }

    fn processing_fails(&self, _worker: &WorkerId, _task: &TaskId) -> bool {
        self.roll(self.config.processing_error_probability)
    }
}

impl std::fmt::Debug for SeededPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
