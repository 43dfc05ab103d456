//! # Generation Schedulers
//!
//! Three ways to run the same two-phase step. All of them produce
//! bit-identical generations.
//!
//! | Strategy              | Counting phase                         | Fence                 |
//! |-----------------------|----------------------------------------|-----------------------|
//! | `Sequential`          | caller thread, every cell in turn      | none needed           |
//! | `BurstParallel`       | n² fresh tasks per tick                | join on all n² tasks  |
//! | `BarrierSynchronized` | n² persistent workers, one per cell    | `Barrier::wait_then`  |
//!
//! Every strategy follows the same order: all counts for generation K are
//! complete before the rule engine reads them, and generation K+1 is fully
//! installed before any count for K+1 starts.

mod barrier_sync;
mod burst;
mod pool;
mod sequential;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::error::LifeResult;
use crate::grid::{NeighborCounts, Population, PopulationSnapshot};
use crate::rules::{self, NeighborFn};
use crate::sync::DoubleBufferedPopulation;

pub use barrier_sync::BarrierScheduler;
pub use burst::BurstParallelScheduler;
pub use pool::WorkerPool;
pub use sequential::SequentialScheduler;

/// Default stack size for per-cell worker threads (128 KiB).
pub const DEFAULT_WORKER_STACK_SIZE: usize = 128 * 1024;

/// Execution strategy for the counting phase.
///
/// Deserializes from any name [`FromStr`] accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Strategy {
    /// Single thread, no concurrency.
    Sequential,
    /// One short-lived unit of work per cell, every tick.
    BurstParallel,
    /// One persistent worker per cell, synchronized by a barrier.
    BarrierSynchronized,
}

impl Strategy {
    /// All strategies, in increasing order of concurrency.
    pub const ALL: [Self; 3] = [
        Self::Sequential,
        Self::BurstParallel,
        Self::BarrierSynchronized,
    ];

    /// Stable kebab-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::BurstParallel => "burst-parallel",
            Self::BarrierSynchronized => "barrier-synchronized",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognized strategy or executor name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} `{name}`")]
pub struct UnknownName {
    /// What was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub name: String,
}

/// Lowercases and strips separators so "With Barrier", "with_barrier" and
/// "with-barrier" all compare equal.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for Strategy {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "sequential" | "seq" => Ok(Self::Sequential),
            "burstparallel" | "parallel" | "burst" => Ok(Self::BurstParallel),
            "barriersynchronized" | "barrier" | "withbarrier" => Ok(Self::BarrierSynchronized),
            _ => Err(UnknownName {
                kind: "strategy",
                name: s.to_owned(),
            }),
        }
    }
}

/// How the burst-parallel strategy runs its n² units of work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum BurstExecutor {
    /// n² boxed tasks per tick on a bounded, long-lived thread pool.
    #[default]
    Pool,
    /// n² scoped OS threads created and joined every tick.
    ScopedThreads,
}

impl BurstExecutor {
    /// Stable kebab-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pool => "pool",
            Self::ScopedThreads => "scoped-threads",
        }
    }
}

impl fmt::Display for BurstExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BurstExecutor {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pool" => Ok(Self::Pool),
            "scopedthreads" | "threads" => Ok(Self::ScopedThreads),
            _ => Err(UnknownName {
                kind: "executor",
                name: s.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for Strategy {
    type Error = UnknownName;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl TryFrom<String> for BurstExecutor {
    type Error = UnknownName;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

/// Thread-level knobs for the concurrent strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerOptions {
    /// Executor for the burst-parallel strategy.
    pub executor: BurstExecutor,
    /// Pool size; `None` uses the available parallelism.
    pub pool_threads: Option<usize>,
    /// Stack size for per-cell threads.
    pub stack_size: usize,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            executor: BurstExecutor::Pool,
            pool_threads: None,
            stack_size: DEFAULT_WORKER_STACK_SIZE,
        }
    }
}

/// A tick driver for one simulation run.
pub trait Scheduler: Send {
    /// Which strategy this scheduler implements.
    fn strategy(&self) -> Strategy;

    /// The most recently committed generation.
    fn snapshot(&self) -> PopulationSnapshot;

    /// Advances exactly one generation.
    ///
    /// # Errors
    ///
    /// Fails if a counting unit fails or the scheduler was shut down.
    fn step(&mut self) -> LifeResult<PopulationSnapshot>;

    /// Stops and joins every background worker. Idempotent.
    fn shutdown(&mut self);

    /// Worker threads currently alive for this run.
    fn live_workers(&self) -> usize {
        0
    }
}

/// Grids shared by the counting phase and the rule pass.
pub(crate) struct GenerationState {
    pub(crate) buffers: DoubleBufferedPopulation,
    pub(crate) counts: NeighborCounts,
    pub(crate) counter: NeighborFn,
}

impl GenerationState {
    pub(crate) fn new(initial: Population, counter: NeighborFn) -> Self {
        let dimension = initial.dimension();
        Self {
            buffers: DoubleBufferedPopulation::new(initial),
            counts: NeighborCounts::new(dimension),
            counter,
        }
    }

    pub(crate) fn dimension(&self) -> usize {
        self.buffers.dimension()
    }

    /// Rule pass: builds the next generation from the completed counts in
    /// the back buffer and swaps it in.
    pub(crate) fn advance(&self) -> PopulationSnapshot {
        let mut next = self.buffers.write_handle();
        {
            let current = self.buffers.read_handle();
            rules::next_generation(&current, &self.counts, &mut next);
        }
        let published = next.commit();
        tracing::debug!(
            generation = published.generation(),
            live = published.live_count(),
            "generation committed"
        );
        published
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str_accepts_aliases() {
        assert_eq!("Sequential".parse(), Ok(Strategy::Sequential));
        assert_eq!("Parallel".parse(), Ok(Strategy::BurstParallel));
        assert_eq!("burst_parallel".parse(), Ok(Strategy::BurstParallel));
        assert_eq!("With Barrier".parse(), Ok(Strategy::BarrierSynchronized));
        assert!("threads".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_strategy_names_round_trip() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.name().parse(), Ok(strategy));
        }
    }

    #[test]
    fn test_executor_from_str() {
        assert_eq!("pool".parse(), Ok(BurstExecutor::Pool));
        assert_eq!("Scoped Threads".parse(), Ok(BurstExecutor::ScopedThreads));
        let err = "fibers".parse::<BurstExecutor>().unwrap_err();
        assert_eq!(err.to_string(), "unknown executor `fibers`");
        for executor in [BurstExecutor::Pool, BurstExecutor::ScopedThreads] {
            assert_eq!(executor.name().parse(), Ok(executor));
        }
    }

    fn from_name<'de, T: Deserialize<'de>>(name: &'de str) -> Result<T, serde::de::value::Error> {
        T::deserialize(serde::de::value::StrDeserializer::new(name))
    }

    #[test]
    fn test_deserialize_uses_from_str_names() {
        assert_eq!(from_name::<Strategy>("With Barrier"), Ok(Strategy::BarrierSynchronized));
        assert_eq!(from_name::<Strategy>("burst"), Ok(Strategy::BurstParallel));
        assert_eq!(from_name::<BurstExecutor>("Scoped Threads"), Ok(BurstExecutor::ScopedThreads));

        let err = from_name::<Strategy>("quantum").unwrap_err();
        assert_eq!(err.to_string(), "unknown strategy `quantum`");
    }
}
