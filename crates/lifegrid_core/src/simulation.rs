//! # Simulation Handle
//!
//! The surface the outside world drives: build a run once, call
//! [`SimulationHandle::tick`] on whatever cadence the caller owns, and
//! [`SimulationHandle::shutdown`] when the run is abandoned.
//!
//! ```rust
//! use lifegrid_core::{initialize, Strategy};
//!
//! let blinker = [(2, 1), (2, 2), (2, 3)];
//! let mut sim = initialize(5, blinker, Strategy::BarrierSynchronized).unwrap();
//! sim.tick().unwrap();
//! let back = sim.tick().unwrap();
//! assert_eq!(back.live_cells(), blinker.into_iter().collect());
//! sim.shutdown();
//! ```

use crate::error::{LifeError, LifeResult};
use crate::grid::{Population, PopulationSnapshot};
use crate::rules::{self, NeighborFn};
use crate::scheduler::{
    BarrierScheduler, BurstExecutor, BurstParallelScheduler, Scheduler, SequentialScheduler, Strategy,
    WorkerOptions,
};
use crate::traits::Renderer;

/// Starts a run with default options and no renderer.
///
/// Cells outside `[0, n)` are dropped.
///
/// # Errors
///
/// Returns [`LifeError::InvalidDimension`] if `n` is zero and
/// [`LifeError::Spawn`] if worker threads cannot be started.
pub fn initialize<I>(n: usize, cells: I, strategy: Strategy) -> LifeResult<SimulationHandle>
where
    I: IntoIterator<Item = (usize, usize)>,
{
    SimulationBuilder::new(n, strategy).cells(cells).build()
}

/// Configures a run before any threads start.
pub struct SimulationBuilder {
    dimension: usize,
    strategy: Strategy,
    cells: Vec<(usize, usize)>,
    options: WorkerOptions,
    counter: NeighborFn,
    renderer: Option<Box<dyn Renderer>>,
}

impl SimulationBuilder {
    /// A builder for an n×n run with no live cells.
    #[must_use]
    pub fn new(dimension: usize, strategy: Strategy) -> Self {
        Self {
            dimension,
            strategy,
            cells: Vec::new(),
            options: WorkerOptions::default(),
            counter: rules::count_neighbors,
            renderer: None,
        }
    }

    /// Adds initial live cells.
    #[must_use]
    pub fn cells<I>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        self.cells.extend(cells);
        self
    }

    /// Installs the sink that receives every completed generation.
    #[must_use]
    pub fn renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Selects how the burst-parallel strategy runs its per-cell work.
    #[must_use]
    pub fn executor(mut self, executor: BurstExecutor) -> Self {
        self.options.executor = executor;
        self
    }

    /// Fixes the burst-parallel pool size.
    #[must_use]
    pub fn pool_threads(mut self, threads: usize) -> Self {
        self.options.pool_threads = Some(threads);
        self
    }

    /// Stack size for per-cell threads.
    #[must_use]
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.options.stack_size = bytes;
        self
    }

    /// Replaces the neighbor-count kernel.
    #[must_use]
    pub fn neighbor_fn(mut self, counter: NeighborFn) -> Self {
        self.counter = counter;
        self
    }

    /// Builds the initial population and starts the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::InvalidDimension`] if the dimension is zero and
    /// [`LifeError::Spawn`] if worker threads cannot be started.
    pub fn build(self) -> LifeResult<SimulationHandle> {
        if self.dimension == 0 {
            return Err(LifeError::InvalidDimension(self.dimension));
        }

        let initial = Population::from_cells(self.dimension, self.cells);
        let live = initial.live_count();
        let scheduler: Box<dyn Scheduler> = match self.strategy {
            Strategy::Sequential => Box::new(SequentialScheduler::new(initial, self.counter)),
            Strategy::BurstParallel => Box::new(BurstParallelScheduler::new(initial, self.counter, self.options)?),
            Strategy::BarrierSynchronized => Box::new(BarrierScheduler::new(initial, self.counter, self.options)?),
        };

        tracing::info!(
            strategy = %self.strategy,
            dimension = self.dimension,
            live,
            workers = scheduler.live_workers(),
            "simulation initialized"
        );

        Ok(SimulationHandle {
            scheduler,
            renderer: self.renderer,
            shut_down: false,
        })
    }
}

/// A running simulation.
///
/// Dropping the handle shuts the run down.
pub struct SimulationHandle {
    scheduler: Box<dyn Scheduler>,
    renderer: Option<Box<dyn Renderer>>,
    shut_down: bool,
}

impl SimulationHandle {
    /// Advances exactly one generation, publishes it to the renderer and
    /// returns it.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::InvalidState`] after [`shutdown`](Self::shutdown)
    /// and [`LifeError::WorkerFailed`] if a neighbor count failed; a failed
    /// tick publishes nothing.
    pub fn tick(&mut self) -> LifeResult<PopulationSnapshot> {
        if self.shut_down {
            return Err(LifeError::InvalidState("simulation has been shut down"));
        }

        let snapshot = self.scheduler.step()?;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.publish(&snapshot);
        }
        Ok(snapshot)
    }

    /// Stops and joins every background worker. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.scheduler.shutdown();
        tracing::info!(
            strategy = %self.scheduler.strategy(),
            generation = self.generation(),
            "simulation shut down"
        );
    }

    /// The most recently committed generation.
    #[must_use]
    pub fn snapshot(&self) -> PopulationSnapshot {
        self.scheduler.snapshot()
    }

    /// Number of committed generations.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.snapshot().generation()
    }

    /// Strategy this run uses.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.scheduler.strategy()
    }

    /// Worker threads currently alive for this run.
    #[must_use]
    pub fn live_workers(&self) -> usize {
        self.scheduler.live_workers()
    }

    /// True once [`shutdown`](Self::shutdown) has run.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            initialize(0, std::iter::empty(), Strategy::Sequential),
            Err(LifeError::InvalidDimension(0))
        ));
    }

    #[test]
    fn test_out_of_bounds_cells_dropped() {
        let sim = initialize(3, [(0, 0), (3, 1), (1, 7)], Strategy::Sequential).unwrap();
        assert_eq!(sim.snapshot().live_cells(), [(0, 0)].into_iter().collect());
        assert_eq!(sim.generation(), 0);
    }

    #[test]
    fn test_renderer_sees_every_generation_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut sim = SimulationBuilder::new(5, Strategy::BurstParallel)
            .cells([(2, 1), (2, 2), (2, 3)])
            .pool_threads(2)
            .renderer(Box::new(move |snap: &PopulationSnapshot| {
                sink.lock().unwrap().push(snap.generation());
            }))
            .build()
            .unwrap();

        for _ in 0..3 {
            sim.tick().unwrap();
        }
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_tick_after_shutdown_is_invalid() {
        for strategy in Strategy::ALL {
            let mut sim = initialize(4, [(1, 1)], strategy).unwrap();
            sim.tick().unwrap();
            sim.shutdown();
            sim.shutdown();
            assert!(sim.is_shut_down());
            assert_eq!(sim.live_workers(), 0);
            assert!(matches!(sim.tick(), Err(LifeError::InvalidState(_))));
        }
    }
}
