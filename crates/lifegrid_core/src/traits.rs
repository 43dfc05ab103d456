//! # Collaborator Seams
//!
//! The core consumes two external collaborators through these traits:
//! something that supplies the starting cells, and something that shows
//! each finished generation.

use std::collections::BTreeSet;

use crate::grid::PopulationSnapshot;

/// Set of live-cell coordinates `(x = row, y = column)`.
pub type CellSet = BTreeSet<(usize, usize)>;

/// Supplies the initial live cells of a run.
pub trait PatternProvider {
    /// Live cells for the pattern called `name`, already clipped to an
    /// n×n grid.
    fn initial_cells(&mut self, name: &str, dimension: usize) -> CellSet;
}

/// Sink for completed generations.
///
/// Called once per generation from the thread that drives `tick()`; it
/// must return well within the tick interval.
pub trait Renderer: Send {
    /// Receives a finished generation.
    fn publish(&mut self, snapshot: &PopulationSnapshot);
}

impl<F> Renderer for F
where
    F: FnMut(&PopulationSnapshot) + Send,
{
    fn publish(&mut self, snapshot: &PopulationSnapshot) {
        self(snapshot);
    }
}
