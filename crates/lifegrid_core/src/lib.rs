//! # LIFEGRID Core Engine
//!
//! Conway's Game of Life on a clipped n×n grid, computed by three
//! interchangeable strategies that must agree bit for bit:
//! - **Sequential**: one thread, the correctness baseline
//! - **Burst-parallel**: n² units of work fanned out and joined every tick
//! - **Barrier-synchronized**: n² persistent workers meeting at one barrier
//!
//! ## Architecture Rules
//!
//! 1. **Counts complete before rules** - no cell of generation K+1 is
//!    derived until every neighbor count for K is in
//! 2. **Install before count** - generation K+1 is fully visible before
//!    any worker starts counting it
//! 3. **Swap, never patch** - a generation is replaced by one reference
//!    swap, never mutated while workers read it
//!
//! ## Example
//!
//! ```rust
//! use lifegrid_core::{initialize, Strategy};
//!
//! let mut sim = initialize(25, [(1, 1), (2, 2), (3, 0), (3, 1), (3, 2)], Strategy::Sequential).unwrap();
//! let next = sim.tick().unwrap();
//! assert_eq!(next.generation(), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod grid;
pub mod rules;
pub mod scheduler;
pub mod simulation;
pub mod sync;
pub mod traits;

pub use error::{BreakReason, LifeError, LifeResult};
pub use grid::{Cell, NeighborCounts, Population, PopulationSnapshot};
pub use rules::{count_neighbors, next_generation, next_state, NeighborFn};
pub use scheduler::{
    BarrierScheduler, BurstExecutor, BurstParallelScheduler, Scheduler, SequentialScheduler, Strategy,
    UnknownName, WorkerOptions, WorkerPool, DEFAULT_WORKER_STACK_SIZE,
};
pub use simulation::{initialize, SimulationBuilder, SimulationHandle};
pub use sync::{Barrier, BarrierWaitResult, DoubleBufferedPopulation, PopulationWriteHandle};
pub use traits::{CellSet, PatternProvider, Renderer};
