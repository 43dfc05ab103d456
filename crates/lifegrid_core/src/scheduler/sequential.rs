//! Single-threaded baseline: count every cell, apply the rules, publish.

use crate::error::{LifeError, LifeResult};
use crate::grid::{Population, PopulationSnapshot};
use crate::rules::{self, NeighborFn};

use super::{GenerationState, Scheduler, Strategy};

/// Runs both phases on the calling thread.
pub struct SequentialScheduler {
    state: GenerationState,
    stopped: bool,
}

impl SequentialScheduler {
    /// Creates a scheduler starting from `initial`.
    #[must_use]
    pub fn new(initial: Population, counter: NeighborFn) -> Self {
        Self {
            state: GenerationState::new(initial, counter),
            stopped: false,
        }
    }
}

impl Scheduler for SequentialScheduler {
    fn strategy(&self) -> Strategy {
        Strategy::Sequential
    }

    fn snapshot(&self) -> PopulationSnapshot {
        self.state.buffers.read_handle()
    }

    fn step(&mut self) -> LifeResult<PopulationSnapshot> {
        if self.stopped {
            return Err(LifeError::InvalidState("simulation has been shut down"));
        }
        let current = self.state.buffers.read_handle();
        rules::count_all(&current, &self.state.counts, self.state.counter);
        drop(current);
        Ok(self.state.advance())
    }

    fn shutdown(&mut self) {
        self.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::count_neighbors;

    #[test]
    fn test_block_is_still_life() {
        let block = [(1, 1), (1, 2), (2, 1), (2, 2)];
        let mut scheduler = SequentialScheduler::new(Population::from_cells(4, block), count_neighbors);
        for generation in 1..=3 {
            let snap = scheduler.step().unwrap();
            assert_eq!(snap.generation(), generation);
            assert_eq!(snap.live_cells(), block.into_iter().collect());
        }
    }

    #[test]
    fn test_step_after_shutdown_fails() {
        let mut scheduler = SequentialScheduler::new(Population::new(3), count_neighbors);
        scheduler.shutdown();
        scheduler.shutdown();
        assert!(matches!(scheduler.step(), Err(LifeError::InvalidState(_))));
    }
}
