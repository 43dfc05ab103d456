//! # Population Grids
//!
//! Dense n×n storage for cell states and per-tick neighbor counts.
//!
//! ## Layout
//!
//! ```text
//! (x, y) -> cells[x * n + y]
//!
//!   x = row, y = column, both in [0, n)
//! ```
//!
//! A [`Population`] is never mutated while workers read it. Each generation
//! is written into a separate buffer and swapped in whole (see
//! [`crate::sync::DoubleBufferedPopulation`]).

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// State of a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, bytemuck::NoUninit)]
#[repr(u8)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Dead = 0,
    /// Live cell.
    Alive = 1,
}

impl Cell {
    /// Returns true if the cell is alive.
    #[inline]
    #[must_use]
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }

    /// Builds a cell from a boolean liveness flag.
    #[inline]
    #[must_use]
    pub const fn from_alive(alive: bool) -> Self {
        if alive {
            Self::Alive
        } else {
            Self::Dead
        }
    }
}

/// An n×n matrix of cells.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Population {
    dimension: usize,
    cells: Box<[Cell]>,
}

impl Population {
    /// Creates an all-dead population.
    ///
    /// # Panics
    ///
    /// Panics if `dimension` is zero.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        assert!(dimension > 0, "Population dimension must be greater than zero");
        Self {
            dimension,
            cells: vec![Cell::Dead; dimension * dimension].into_boxed_slice(),
        }
    }

    /// Creates a population with the given live cells.
    ///
    /// Coordinates outside `[0, dimension)` are dropped silently.
    ///
    /// # Panics
    ///
    /// Panics if `dimension` is zero.
    #[must_use]
    pub fn from_cells<I>(dimension: usize, live: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut population = Self::new(dimension);
        for (x, y) in live {
            if x < dimension && y < dimension {
                population.set(x, y, Cell::Alive);
            }
        }
        population
    }

    /// Side length of the grid.
    #[inline]
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Total number of cells (n²).
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.dimension && y < self.dimension,
            "cell ({x}, {y}) outside {n}×{n} grid",
            n = self.dimension
        );
        x * self.dimension + y
    }

    /// Returns the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[self.index(x, y)]
    }

    /// Returns true if the cell at `(x, y)` is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_alive()
    }

    /// Sets the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    ///
    /// Only buffers that no worker can observe are ever written.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        let idx = self.index(x, y);
        self.cells[idx] = cell;
    }

    /// Kills every cell.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Dead);
    }

    /// Number of live cells.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    /// Coordinates of every live cell, ordered by row then column.
    #[must_use]
    pub fn live_cells(&self) -> BTreeSet<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(i, _)| (i / self.dimension, i % self.dimension))
            .collect()
    }

    /// Raw cell bytes (`0` dead, `1` alive), row-major.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cells[..])
    }

    /// Iterates over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.dimension)
    }
}

impl fmt::Debug for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Population")
            .field("dimension", &self.dimension)
            .field("live", &self.live_count())
            .finish()
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                f.write_str(if cell.is_alive() { "O" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

/// Immutable view of a population at a generation boundary.
///
/// Cloning is a reference-count bump; the grid itself is shared.
#[derive(Clone, Debug)]
pub struct PopulationSnapshot {
    generation: u64,
    population: Arc<Population>,
}

impl PopulationSnapshot {
    /// Wraps a population as the snapshot for `generation`.
    #[must_use]
    pub fn new(generation: u64, population: Arc<Population>) -> Self {
        Self {
            generation,
            population,
        }
    }

    /// Generation number (0 = initial population).
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Shared handle to the underlying grid.
    #[inline]
    #[must_use]
    pub fn population(&self) -> &Arc<Population> {
        &self.population
    }

    pub(crate) fn into_population(self) -> Arc<Population> {
        self.population
    }
}

impl Deref for PopulationSnapshot {
    type Target = Population;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.population
    }
}

/// Per-tick scratch buffer of live-neighbor counts.
///
/// Each cell is written by exactly one unit of work per tick, so relaxed
/// atomic stores are enough; the join or barrier release that ends the
/// counting phase publishes them to the rule engine.
pub struct NeighborCounts {
    dimension: usize,
    counts: Box<[AtomicU8]>,
}

impl NeighborCounts {
    /// Creates a zeroed n×n count buffer.
    ///
    /// # Panics
    ///
    /// Panics if `dimension` is zero.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        assert!(dimension > 0, "NeighborCounts dimension must be greater than zero");
        Self {
            dimension,
            counts: (0..dimension * dimension).map(|_| AtomicU8::new(0)).collect(),
        }
    }

    /// Side length of the grid.
    #[inline]
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.dimension && y < self.dimension,
            "count ({x}, {y}) outside {n}×{n} grid",
            n = self.dimension
        );
        x * self.dimension + y
    }

    /// Records the count for `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn set(&self, x: usize, y: usize, count: u8) {
        debug_assert!(count <= 8);
        self.counts[self.index(x, y)].store(count, Ordering::Relaxed);
    }

    /// Reads the count for `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.counts[self.index(x, y)].load(Ordering::Relaxed)
    }
}

impl fmt::Debug for NeighborCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NeighborCounts")
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cells_clips_out_of_bounds() {
        let pop = Population::from_cells(4, [(0, 0), (3, 3), (4, 0), (0, 7), (2, 1)]);
        assert_eq!(pop.live_count(), 3);
        assert!(pop.is_alive(0, 0));
        assert!(pop.is_alive(3, 3));
        assert!(pop.is_alive(2, 1));
    }

    #[test]
    fn test_live_cells_are_row_major() {
        let pop = Population::from_cells(5, [(4, 0), (0, 4), (2, 2)]);
        let cells: Vec<_> = pop.live_cells().into_iter().collect();
        assert_eq!(cells, vec![(0, 4), (2, 2), (4, 0)]);
    }

    #[test]
    fn test_as_bytes_matches_cells() {
        let pop = Population::from_cells(3, [(0, 1), (2, 2)]);
        assert_eq!(pop.as_bytes(), &[0, 1, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_display_renders_rows() {
        let pop = Population::from_cells(3, [(1, 0), (1, 1), (1, 2)]);
        assert_eq!(pop.to_string(), "...\nOOO\n...\n");
    }

    #[test]
    fn test_snapshot_derefs_to_population() {
        let snap = PopulationSnapshot::new(7, Arc::new(Population::from_cells(2, [(1, 1)])));
        assert_eq!(snap.generation(), 7);
        assert!(snap.is_alive(1, 1));
        assert_eq!(snap.dimension(), 2);
    }

    #[test]
    fn test_neighbor_counts_round_trip() {
        let counts = NeighborCounts::new(3);
        counts.set(2, 1, 5);
        assert_eq!(counts.get(2, 1), 5);
        assert_eq!(counts.get(0, 0), 0);
    }

    #[test]
    #[should_panic(expected = "cell (0, 4) outside 4×4 grid")]
    fn test_get_past_last_column_panics() {
        // (0, 4) would otherwise land on (1, 0).
        let pop = Population::from_cells(4, [(1, 0)]);
        let _ = pop.get(0, 4);
    }

    #[test]
    #[should_panic(expected = "outside 3×3 grid")]
    fn test_set_out_of_bounds_panics() {
        let mut pop = Population::new(3);
        pop.set(3, 0, Cell::Alive);
    }

    #[test]
    #[should_panic(expected = "count (2, 3) outside 3×3 grid")]
    fn test_neighbor_count_out_of_bounds_panics() {
        let counts = NeighborCounts::new(3);
        counts.set(2, 3, 1);
    }

    #[test]
    #[should_panic(expected = "dimension must be greater than zero")]
    fn test_zero_dimension_panics() {
        let _ = Population::new(0);
    }
}
