//! # Double-Buffered Population
//!
//! Lock-free reads for counting workers, one writer for the next generation.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────────────────────┐
//!                    │    DoubleBufferedPopulation     │
//!                    │                                 │
//!                    │  ┌───────────┐  ┌───────────┐   │
//!                    │  │   Front   │  │   Back    │   │
//!                    │  │ (gen K,   │  │ (scratch, │   │
//!                    │  │  shared)  │  │  private) │   │
//!                    │  └─────┬─────┘  └─────┬─────┘   │
//!                    │        └──── swap ────┘         │
//!                    └─────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              ▼               ▼               ▼
//!      ┌──────────────┐ ┌────────────┐ ┌────────────┐
//!      │ ReadHandle   │ │WriteHandle │ │  commit()  │
//!      │ (workers)    │ │(rule pass) │ │  (swap)    │
//!      └──────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! ## Thread Safety
//!
//! - Read handles: cheap `Arc` clones of the front snapshot (many allowed)
//! - Write handle: exclusive ownership of the back buffer (one at a time)
//! - Commit: a single reference swap; readers see all of gen K or all of
//!   gen K+1, never a mix

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::grid::{Population, PopulationSnapshot};

/// Double-buffered population for lock-free generation handoff.
///
/// ## Usage
///
/// ```rust
/// use lifegrid_core::{DoubleBufferedPopulation, Population};
///
/// let buffers = DoubleBufferedPopulation::new(Population::from_cells(5, [(2, 2)]));
///
/// // Workers read the front buffer
/// let current = buffers.read_handle();
///
/// // The coordinator writes the back buffer, then swaps it in
/// let mut next = buffers.write_handle();
/// next.clear();
/// let published = next.commit();
///
/// assert_eq!(current.generation(), 0);
/// assert_eq!(published.generation(), 1);
/// assert_eq!(published.live_count(), 0);
/// ```
pub struct DoubleBufferedPopulation {
    /// Current generation, shared with readers.
    front: RwLock<PopulationSnapshot>,

    /// Recycled buffer for the next generation.
    back: Mutex<Option<Population>>,

    /// Whether a write handle is currently held.
    write_locked: AtomicBool,

    dimension: usize,
}

impl DoubleBufferedPopulation {
    /// Creates the buffers with `initial` as generation 0.
    #[must_use]
    pub fn new(initial: Population) -> Self {
        let dimension = initial.dimension();
        Self {
            front: RwLock::new(PopulationSnapshot::new(0, Arc::new(initial))),
            back: Mutex::new(Some(Population::new(dimension))),
            write_locked: AtomicBool::new(false),
            dimension,
        }
    }

    /// Side length of the grids.
    #[inline]
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the current generation number.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.front.read().generation()
    }

    /// Returns whether a write handle is currently active.
    #[inline]
    #[must_use]
    pub fn is_write_locked(&self) -> bool {
        self.write_locked.load(Ordering::Acquire)
    }

    /// Returns whether a retired buffer is waiting to be reused.
    #[cfg(test)]
    pub(crate) fn has_spare(&self) -> bool {
        self.back.lock().is_some()
    }

    /// Snapshot of the current (front) generation.
    #[must_use]
    pub fn read_handle(&self) -> PopulationSnapshot {
        self.front.read().clone()
    }

    /// Takes the back buffer for writing the next generation.
    ///
    /// The buffer's previous contents are unspecified; the rule pass
    /// overwrites every cell.
    ///
    /// # Panics
    ///
    /// Panics if a write handle is already held (only one allowed).
    #[must_use]
    pub fn write_handle(&self) -> PopulationWriteHandle<'_> {
        let was_locked = self.write_locked.swap(true, Ordering::AcqRel);
        assert!(!was_locked, "Double write handle! Only one write handle allowed at a time.");

        let buffer = self
            .back
            .lock()
            .take()
            .unwrap_or_else(|| Population::new(self.dimension));

        PopulationWriteHandle {
            owner: self,
            buffer: Some(buffer),
        }
    }

    /// Installs `next` as the front buffer and recycles the old front if
    /// no reader still holds it.
    fn swap_in(&self, next: Population) -> PopulationSnapshot {
        let (published, retired) = {
            let mut front = self.front.write();
            let published = PopulationSnapshot::new(front.generation() + 1, Arc::new(next));
            let retired = std::mem::replace(&mut *front, published.clone());
            (published, retired)
        };

        if let Ok(old) = Arc::try_unwrap(retired.into_population()) {
            *self.back.lock() = Some(old);
        }
        published
    }
}

impl std::fmt::Debug for DoubleBufferedPopulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoubleBufferedPopulation")
            .field("dimension", &self.dimension)
            .field("generation", &self.generation())
            .field("write_locked", &self.is_write_locked())
            .finish()
    }
}

/// Exclusive access to the back buffer.
///
/// Dropping the handle without [`commit`](Self::commit) discards the
/// write and returns the buffer for reuse.
pub struct PopulationWriteHandle<'a> {
    owner: &'a DoubleBufferedPopulation,
    buffer: Option<Population>,
}

impl PopulationWriteHandle<'_> {
    /// Publishes the written buffer as the next generation.
    #[must_use = "the published snapshot is the new generation"]
    pub fn commit(mut self) -> PopulationSnapshot {
        let next = self
            .buffer
            .take()
            .unwrap_or_else(|| Population::new(self.owner.dimension));
        self.owner.swap_in(next)
    }
}

impl Deref for PopulationWriteHandle<'_> {
    type Target = Population;

    #[inline]
    fn deref(&self) -> &Self::Target {
        // Only `commit` and `drop` take the buffer.
        self.buffer.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl DerefMut for PopulationWriteHandle<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buffer.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl Drop for PopulationWriteHandle<'_> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            *self.owner.back.lock() = Some(buffer);
        }
        self.owner.write_locked.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    #[test]
    fn test_double_buffer_creation() {
        let db = DoubleBufferedPopulation::new(Population::new(4));
        assert_eq!(db.generation(), 0);
        assert_eq!(db.dimension(), 4);
        assert!(!db.is_write_locked());
    }

    #[test]
    fn test_write_handle_locks() {
        let db = DoubleBufferedPopulation::new(Population::new(4));
        {
            let _write = db.write_handle();
            assert!(db.is_write_locked());
        }
        assert!(!db.is_write_locked());
    }

    #[test]
    fn test_commit_publishes_next_generation() {
        let db = DoubleBufferedPopulation::new(Population::from_cells(3, [(0, 0)]));
        let before = db.read_handle();

        let mut write = db.write_handle();
        write.clear();
        write.set(1, 1, Cell::Alive);
        let after = write.commit();

        assert_eq!(after.generation(), 1);
        assert!(after.is_alive(1, 1));
        assert!(!after.is_alive(0, 0));
        // Readers holding the old snapshot still see generation 0.
        assert_eq!(before.generation(), 0);
        assert!(before.is_alive(0, 0));
        assert_eq!(db.read_handle().generation(), 1);
        assert!(!db.is_write_locked());
    }

    #[test]
    fn test_dropped_write_is_discarded() {
        let db = DoubleBufferedPopulation::new(Population::from_cells(3, [(2, 2)]));
        {
            let mut write = db.write_handle();
            write.clear();
        }
        assert_eq!(db.generation(), 0);
        assert!(db.read_handle().is_alive(2, 2));
    }

    #[test]
    fn test_unshared_front_is_recycled() {
        let db = DoubleBufferedPopulation::new(Population::new(3));
        let _ = db.write_handle().commit();
        assert!(db.has_spare());

        let held = db.read_handle();
        let _ = db.write_handle().commit();
        // `held` pins the retired buffer; a fresh one is allocated next time.
        assert!(!db.has_spare());
        assert_eq!(held.generation(), 1);
        assert_eq!(db.write_handle().commit().generation(), 3);
    }

    #[test]
    #[should_panic(expected = "Double write handle")]
    fn test_double_write_panics() {
        let db = DoubleBufferedPopulation::new(Population::new(2));
        let _write1 = db.write_handle();
        let _write2 = db.write_handle();
    }
}
