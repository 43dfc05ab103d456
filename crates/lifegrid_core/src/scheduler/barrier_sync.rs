//! # Barrier-Synchronized Scheduler
//!
//! One persistent worker per cell plus the coordinator, all meeting at a
//! single barrier of n² + 1 parties once per generation.
//!
//! ```text
//! worker (x, y), forever:              coordinator, per tick():
//!   snap = front buffer                  wait_then(|| {
//!   counts[x][y] = count(snap, x, y)         rule pass → gen K+1
//!   barrier.wait()  ───────────────────►     swap front buffer
//!                                         })   // release
//! ```
//!
//! Release happens only after the commit closure returns, so a worker that
//! leaves the barrier always reads the generation the coordinator just
//! installed. Workers count generation K+1 while the coordinator is between
//! ticks; the next `tick()` only has to wait for the stragglers.
//!
//! ## Failure and Shutdown
//!
//! A worker that panics while counting breaks the barrier with
//! [`BreakReason::WorkerFailed`] and exits. Every other waiter, the
//! coordinator included, is released with an error instead of hanging.
//! Shutdown breaks the barrier with [`BreakReason::Shutdown`] and joins
//! every worker.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::{BreakReason, LifeError, LifeResult};
use crate::grid::{Population, PopulationSnapshot};
use crate::rules::NeighborFn;
use crate::sync::Barrier;

use super::{GenerationState, Scheduler, Strategy, WorkerOptions};

/// Persistent per-cell workers with a phase barrier.
pub struct BarrierScheduler {
    state: Arc<GenerationState>,
    barrier: Arc<Barrier>,
    workers: Vec<JoinHandle<()>>,
    live: Arc<AtomicUsize>,
    stopped: bool,
}

impl BarrierScheduler {
    /// Creates the scheduler and starts its n² workers. The workers begin
    /// counting the initial generation immediately.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::Spawn`] if any worker thread cannot be started.
    /// Workers already running are stopped and joined first.
    pub fn new(initial: Population, counter: NeighborFn, options: WorkerOptions) -> LifeResult<Self> {
        let n = initial.dimension();
        let mut scheduler = Self {
            state: Arc::new(GenerationState::new(initial, counter)),
            barrier: Arc::new(Barrier::new(n * n + 1)),
            workers: Vec::with_capacity(n * n),
            live: Arc::new(AtomicUsize::new(0)),
            stopped: false,
        };

        for x in 0..n {
            for y in 0..n {
                let state = Arc::clone(&scheduler.state);
                let barrier = Arc::clone(&scheduler.barrier);
                let live = Arc::clone(&scheduler.live);
                live.fetch_add(1, Ordering::AcqRel);

                let spawned = thread::Builder::new()
                    .name(format!("lifegrid-cell-{x}-{y}"))
                    .stack_size(options.stack_size)
                    .spawn(move || run_cell_worker(&state, &barrier, &live, x, y));

                match spawned {
                    Ok(handle) => scheduler.workers.push(handle),
                    Err(err) => {
                        scheduler.live.fetch_sub(1, Ordering::AcqRel);
                        tracing::error!(x, y, error = %err, "failed to start cell worker");
                        scheduler.shutdown();
                        return Err(LifeError::Spawn(err.to_string()));
                    }
                }
            }
        }

        tracing::debug!(workers = n * n, parties = n * n + 1, "cell workers started");
        Ok(scheduler)
    }

    /// The barrier shared with the workers.
    #[must_use]
    pub fn barrier(&self) -> &Barrier {
        &self.barrier
    }
}

impl Scheduler for BarrierScheduler {
    fn strategy(&self) -> Strategy {
        Strategy::BarrierSynchronized
    }

    fn snapshot(&self) -> PopulationSnapshot {
        self.state.buffers.read_handle()
    }

    fn step(&mut self) -> LifeResult<PopulationSnapshot> {
        if self.stopped {
            return Err(LifeError::InvalidState("simulation has been shut down"));
        }

        let state = &self.state;
        self.barrier.wait_then(|| state.advance()).map_err(|err| {
            let err = match err {
                LifeError::BarrierBroken(reason) => LifeError::from(reason),
                other => other,
            };
            tracing::warn!(error = %err, "barrier tick abandoned");
            err
        })
    }

    fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.barrier.break_with(BreakReason::Shutdown);

        let workers = self.workers.len();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("cell worker exited by panic");
            }
        }
        tracing::info!(workers, "barrier-synchronized scheduler shut down");
    }

    fn live_workers(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

impl Drop for BarrierScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_cell_worker(state: &GenerationState, barrier: &Barrier, live: &AtomicUsize, x: usize, y: usize) {
    struct LiveGuard<'a>(&'a AtomicUsize);
    impl Drop for LiveGuard<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::AcqRel);
        }
    }

    let _guard = LiveGuard(live);
    let counter = state.counter;

    loop {
        let snapshot = state.buffers.read_handle();
        let counted = panic::catch_unwind(AssertUnwindSafe(|| counter(&snapshot, x, y)));
        drop(snapshot);

        match counted {
            Ok(count) => state.counts.set(x, y, count),
            Err(_) => {
                tracing::error!(x, y, "neighbor count panicked");
                barrier.break_with(BreakReason::WorkerFailed { x, y });
                return;
            }
        }

        if barrier.wait().is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::count_neighbors;
    use crate::scheduler::SequentialScheduler;

    fn fail_at_center(population: &Population, x: usize, y: usize) -> u8 {
        assert!(!(x == 1 && y == 1), "injected count failure");
        count_neighbors(population, x, y)
    }

    #[test]
    fn test_blinker_oscillates() {
        let blinker = Population::from_cells(5, [(2, 1), (2, 2), (2, 3)]);
        let mut scheduler =
            BarrierScheduler::new(blinker.clone(), count_neighbors, WorkerOptions::default()).unwrap();
        assert_eq!(scheduler.live_workers(), 25);

        let first = scheduler.step().unwrap();
        assert_eq!(first.generation(), 1);
        assert_eq!(first.live_cells(), [(1, 2), (2, 2), (3, 2)].into_iter().collect());
        let second = scheduler.step().unwrap();
        assert_eq!(*second.population().as_ref(), blinker);
    }

    #[test]
    fn test_matches_sequential() {
        let cells = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2), (4, 4), (5, 4), (6, 4)];
        let mut reference = SequentialScheduler::new(Population::from_cells(8, cells), count_neighbors);
        let mut scheduler =
            BarrierScheduler::new(Population::from_cells(8, cells), count_neighbors, WorkerOptions::default())
                .unwrap();

        for _ in 0..12 {
            let expected = reference.step().unwrap();
            let actual = scheduler.step().unwrap();
            assert_eq!(actual.generation(), expected.generation());
            assert_eq!(actual.live_cells(), expected.live_cells());
        }
    }

    #[test]
    fn test_shutdown_joins_every_worker() {
        let mut scheduler =
            BarrierScheduler::new(Population::new(4), count_neighbors, WorkerOptions::default()).unwrap();
        scheduler.step().unwrap();
        scheduler.shutdown();
        assert_eq!(scheduler.live_workers(), 0);
        assert!(scheduler.barrier().is_broken());
        assert!(matches!(scheduler.step(), Err(LifeError::InvalidState(_))));
        scheduler.shutdown();
    }

    #[test]
    fn test_worker_failure_releases_coordinator() {
        let mut scheduler =
            BarrierScheduler::new(Population::new(3), fail_at_center, WorkerOptions::default()).unwrap();
        assert!(matches!(scheduler.step(), Err(LifeError::WorkerFailed { x: 1, y: 1 })));
        scheduler.shutdown();
        assert_eq!(scheduler.live_workers(), 0);
    }
}
