//! # Core Error Types
//!
//! All errors that can occur while driving a simulation run.

use std::fmt;

use thiserror::Error;

/// Why a barrier stopped accepting participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BreakReason {
    /// The run is being torn down; waiters should leave their loops.
    Shutdown,
    /// A persistent worker failed while counting neighbors for `(x, y)`.
    WorkerFailed {
        /// Row of the failed worker's cell.
        x: usize,
        /// Column of the failed worker's cell.
        y: usize,
    },
    /// The coordinator's commit action panicked.
    CommitFailed,
}

impl fmt::Display for BreakReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => f.write_str("shutdown"),
            Self::WorkerFailed { x, y } => write!(f, "worker for cell ({x}, {y}) failed"),
            Self::CommitFailed => f.write_str("generation commit failed"),
        }
    }
}

/// Errors that can occur in the simulation core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifeError {
    /// Operation is not valid in the handle's current state (e.g. tick after shutdown).
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Grid dimension must be at least 1.
    #[error("invalid grid dimension: {0}")]
    InvalidDimension(usize),

    /// A neighbor-count unit of work failed; the tick was abandoned.
    #[error("neighbor count for cell ({x}, {y}) failed")]
    WorkerFailed {
        /// Row of the failed cell.
        x: usize,
        /// Column of the failed cell.
        y: usize,
    },

    /// The barrier was broken while the caller was waiting on it.
    #[error("barrier broken: {0}")]
    BarrierBroken(BreakReason),

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
}

impl From<BreakReason> for LifeError {
    fn from(reason: BreakReason) -> Self {
        match reason {
            BreakReason::WorkerFailed { x, y } => Self::WorkerFailed { x, y },
            BreakReason::Shutdown => Self::InvalidState("simulation has been shut down"),
            reason @ BreakReason::CommitFailed => Self::BarrierBroken(reason),
        }
    }
}

/// Result type for core operations.
pub type LifeResult<T> = Result<T, LifeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_break_reason_maps_to_worker_failure() {
        let err = LifeError::from(BreakReason::WorkerFailed { x: 3, y: 4 });
        assert_eq!(err, LifeError::WorkerFailed { x: 3, y: 4 });
        assert_eq!(err.to_string(), "neighbor count for cell (3, 4) failed");
    }

    #[test]
    fn test_shutdown_maps_to_invalid_state() {
        let err = LifeError::from(BreakReason::Shutdown);
        assert!(matches!(err, LifeError::InvalidState(_)));
    }
}
