//! # Neighbor Counting and the Rule Engine
//!
//! Pure functions shared by every scheduler.
//!
//! ```text
//!   Population (gen K) ──count_neighbors──► NeighborCounts
//!                │                               │
//!                └──────────next_generation──────┘──► Population (gen K+1)
//! ```
//!
//! Edges are clipped: a neighbor outside `[0, n)` contributes nothing, so a
//! live cell at `(0, 0)` is never seen from row or column `n - 1`.

use crate::grid::{Cell, NeighborCounts, Population};

/// Signature of a neighbor-count kernel.
///
/// Schedulers accept any function with this shape so alternative kernels
/// (or deliberately failing ones) can be installed per run.
pub type NeighborFn = fn(&Population, usize, usize) -> u8;

/// Counts live cells in the Moore neighborhood of `(x, y)`.
///
/// Reads only; safe to call concurrently for distinct cells against the
/// same snapshot.
#[must_use]
pub fn count_neighbors(population: &Population, x: usize, y: usize) -> u8 {
    let n = population.dimension();
    let rows = x.saturating_sub(1)..=(x + 1).min(n - 1);
    let mut count = 0u8;
    for i in rows {
        for j in y.saturating_sub(1)..=(y + 1).min(n - 1) {
            if (i, j) != (x, y) && population.is_alive(i, j) {
                count += 1;
            }
        }
    }
    count
}

/// B3/S23: survival on 2 or 3 neighbors, birth on exactly 3.
#[inline]
#[must_use]
pub const fn next_state(current: Cell, neighbors: u8) -> Cell {
    match (current, neighbors) {
        (Cell::Alive, 2 | 3) | (Cell::Dead, 3) => Cell::Alive,
        _ => Cell::Dead,
    }
}

/// Builds generation K+1 into `next` from generation K and its counts.
///
/// `current` and `counts` are only read; `next` must be a buffer no worker
/// can observe.
///
/// # Panics
///
/// Panics if the three grids differ in dimension.
pub fn next_generation(current: &Population, counts: &NeighborCounts, next: &mut Population) {
    let n = current.dimension();
    assert_eq!(n, counts.dimension(), "count buffer dimension mismatch");
    assert_eq!(n, next.dimension(), "next buffer dimension mismatch");

    for x in 0..n {
        for y in 0..n {
            next.set(x, y, next_state(current.get(x, y), counts.get(x, y)));
        }
    }
}

/// Fills `counts` for every cell on the calling thread.
pub fn count_all(population: &Population, counts: &NeighborCounts, counter: NeighborFn) {
    let n = population.dimension();
    for x in 0..n {
        for y in 0..n {
            counts.set(x, y, counter(population, x, y));
        }
    }
}
