//! # Synchronization Primitives for Multi-threaded Generations
//!
//! No per-cell locks. No partially updated grids.
//!
//! ## The Problem
//!
//! ```text
//! Workers (n²):     READ gen K, WRITE NeighborCounts[x][y]
//! Coordinator (1):  READ NeighborCounts, WRITE gen K+1
//!
//! Without a fence:  coordinator reads half-written counts
//!                   workers read a half-built gen K+1
//! ```
//!
//! ## The Solution
//!
//! ```text
//! Cycle K:
//!   workers count from the front buffer (gen K)
//!   barrier: all n² counts written
//!   coordinator builds gen K+1 in the back buffer, swaps it in
//!   barrier release (only after the swap)
//! Cycle K+1:
//!   workers count from the new front buffer
//! ```

mod barrier;
mod double_buffer;

pub use barrier::{Barrier, BarrierWaitResult};
pub use double_buffer::{DoubleBufferedPopulation, PopulationWriteHandle};
