//! # Burst-Parallel Scheduler
//!
//! Fan out one unit of work per cell, join all of them, then apply the
//! rules.
//!
//! ```text
//! tick:
//!   snapshot = front buffer (gen K)
//!   for (x, y) in n×n:  spawn { counts[x][y] = count(snapshot, x, y) }
//!   join all n²
//!   rule pass → gen K+1
//! ```
//!
//! ## Cost
//!
//! Each tick creates and destroys n² units of concurrency: n² boxed jobs
//! and completion messages on the pool executor, or n² OS threads on the
//! scoped-thread executor. That overhead is what this strategy exists to
//! measure against the persistent-worker strategy; it is not optimized away.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crate::error::{LifeError, LifeResult};
use crate::grid::{Population, PopulationSnapshot};
use crate::rules::NeighborFn;

use super::pool::WorkerPool;
use super::{BurstExecutor, GenerationState, Scheduler, Strategy, WorkerOptions};

type CellReport = Result<(), (usize, usize)>;

enum Executor {
    Pool(WorkerPool),
    ScopedThreads { stack_size: usize },
}

/// Per-tick fan-out and join.
pub struct BurstParallelScheduler {
    state: Arc<GenerationState>,
    executor: Executor,
    stopped: bool,
}

impl BurstParallelScheduler {
    /// Creates a scheduler starting from `initial`.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::Spawn`] if the pool executor cannot start its
    /// threads.
    pub fn new(initial: Population, counter: NeighborFn, options: WorkerOptions) -> LifeResult<Self> {
        let executor = match options.executor {
            BurstExecutor::Pool => {
                let threads = options.pool_threads.unwrap_or_else(|| {
                    thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
                });
                Executor::Pool(WorkerPool::new(threads.max(1), "lifegrid-burst")?)
            }
            BurstExecutor::ScopedThreads => Executor::ScopedThreads {
                stack_size: options.stack_size,
            },
        };

        Ok(Self {
            state: Arc::new(GenerationState::new(initial, counter)),
            executor,
            stopped: false,
        })
    }

    fn count_on_pool(&self, pool: &WorkerPool, snapshot: &PopulationSnapshot) -> LifeResult<()> {
        let n = self.state.dimension();
        let cells = n * n;
        let (done_tx, done_rx) = crossbeam_channel::bounded::<CellReport>(cells);

        for x in 0..n {
            for y in 0..n {
                let snapshot = snapshot.clone();
                let state = Arc::clone(&self.state);
                let done_tx = done_tx.clone();
                pool.execute(move || {
                    let report = count_cell(&state, &snapshot, x, y);
                    // Released before reporting so the commit can recycle the old front.
                    drop(snapshot);
                    // The receiver outlives every job of its tick.
                    let _ = done_tx.send(report);
                })?;
            }
        }
        drop(done_tx);

        let mut first_failure = None;
        for _ in 0..cells {
            match done_rx.recv() {
                Ok(Ok(())) => {}
                Ok(Err(cell)) => {
                    first_failure.get_or_insert(cell);
                }
                Err(_) => return Err(LifeError::InvalidState("burst job dropped before completing")),
            }
        }
        first_failure.map_or(Ok(()), |(x, y)| Err(LifeError::WorkerFailed { x, y }))
    }

    fn count_on_threads(&self, stack_size: usize, snapshot: &PopulationSnapshot) -> LifeResult<()> {
        let n = self.state.dimension();
        let state = &*self.state;

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(n * n);
            let mut spawn_error = None;

            'spawn: for x in 0..n {
                for y in 0..n {
                    let spawned = thread::Builder::new()
                        .stack_size(stack_size)
                        .spawn_scoped(scope, move || count_cell(state, snapshot, x, y));
                    match spawned {
                        Ok(handle) => handles.push(((x, y), handle)),
                        Err(err) => {
                            spawn_error = Some(LifeError::Spawn(err.to_string()));
                            break 'spawn;
                        }
                    }
                }
            }

            let mut first_failure = None;
            for (cell, handle) in handles {
                // Joined explicitly so a panic is reported, not re-raised by the scope.
                if !matches!(handle.join(), Ok(Ok(()))) {
                    first_failure.get_or_insert(cell);
                }
            }

            if let Some(err) = spawn_error {
                return Err(err);
            }
            first_failure.map_or(Ok(()), |(x, y)| Err(LifeError::WorkerFailed { x, y }))
        })
    }
}

/// Counts one cell into the shared buffer, converting a panic into a
/// failure report.
fn count_cell(state: &GenerationState, snapshot: &PopulationSnapshot, x: usize, y: usize) -> CellReport {
    let counter = state.counter;
    match panic::catch_unwind(AssertUnwindSafe(|| counter(snapshot, x, y))) {
        Ok(count) => {
            state.counts.set(x, y, count);
            Ok(())
        }
        Err(_) => Err((x, y)),
    }
}

impl Scheduler for BurstParallelScheduler {
    fn strategy(&self) -> Strategy {
        Strategy::BurstParallel
    }

    fn snapshot(&self) -> PopulationSnapshot {
        self.state.buffers.read_handle()
    }

    fn step(&mut self) -> LifeResult<PopulationSnapshot> {
        if self.stopped {
            return Err(LifeError::InvalidState("simulation has been shut down"));
        }

        let snapshot = self.state.buffers.read_handle();
        let counted = match &self.executor {
            Executor::Pool(pool) => self.count_on_pool(pool, &snapshot),
            Executor::ScopedThreads { stack_size } => self.count_on_threads(*stack_size, &snapshot),
        };
        drop(snapshot);

        if let Err(err) = counted {
            tracing::warn!(error = %err, "burst tick abandoned");
            return Err(err);
        }
        Ok(self.state.advance())
    }

    fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Executor::Pool(pool) = &mut self.executor {
            pool.shutdown();
        }
        tracing::info!("burst-parallel scheduler shut down");
    }

    fn live_workers(&self) -> usize {
        match &self.executor {
            Executor::Pool(pool) => pool.live_workers(),
            Executor::ScopedThreads { .. } => 0,
        }
    }
}

impl Drop for BurstParallelScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::count_neighbors;

    fn blinker() -> Population {
        Population::from_cells(5, [(2, 1), (2, 2), (2, 3)])
    }

    #[test]
    fn test_pool_executor_blinker() {
        let mut scheduler =
            BurstParallelScheduler::new(blinker(), count_neighbors, WorkerOptions::default()).unwrap();
        let first = scheduler.step().unwrap();
        assert_eq!(first.live_cells(), [(1, 2), (2, 2), (3, 2)].into_iter().collect());
        let second = scheduler.step().unwrap();
        assert_eq!(*second.population().as_ref(), blinker());
    }

    #[test]
    fn test_scoped_thread_executor_blinker() {
        let options = WorkerOptions {
            executor: BurstExecutor::ScopedThreads,
            ..WorkerOptions::default()
        };
        let mut scheduler = BurstParallelScheduler::new(blinker(), count_neighbors, options).unwrap();
        scheduler.step().unwrap();
        let second = scheduler.step().unwrap();
        assert_eq!(*second.population().as_ref(), blinker());
    }

    #[test]
    fn test_pool_jobs_release_retired_generation() {
        let options = WorkerOptions {
            pool_threads: Some(4),
            ..WorkerOptions::default()
        };
        let mut scheduler = BurstParallelScheduler::new(blinker(), count_neighbors, options).unwrap();
        for _ in 0..20 {
            drop(scheduler.step().unwrap());
            assert!(scheduler.state.buffers.has_spare());
        }
        scheduler.shutdown();
    }

    #[test]
    fn test_shutdown_stops_pool() {
        let options = WorkerOptions {
            pool_threads: Some(2),
            ..WorkerOptions::default()
        };
        let mut scheduler = BurstParallelScheduler::new(blinker(), count_neighbors, options).unwrap();
        assert_eq!(scheduler.live_workers(), 2);
        scheduler.shutdown();
        assert_eq!(scheduler.live_workers(), 0);
        assert!(matches!(scheduler.step(), Err(LifeError::InvalidState(_))));
    }
}
