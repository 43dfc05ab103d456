//! # Phase-Token Barrier
//!
//! Reusable N-party rendezvous.
//!
//! ## The Counter-Reset Race
//!
//! ```text
//! naive:  count += 1; if count == N { count = 0; notify_all } else { wait }
//!
//!   cycle K released ──► fast thread re-enters, count = 1 (cycle K+1)
//!                        slow thread wakes, still blocked on "count != 0"?
//!                        → missed wakeup or a second release for cycle K
//! ```
//!
//! Every arrival captures the phase it joined. It returns only once the
//! shared phase has moved past that value, and the phase moves exactly once
//! per cycle, under the same lock that resets the arrival count.
//!
//! ## Committed Release
//!
//! [`Barrier::wait_then`] lets one participant (the coordinator) run an
//! action after everyone else has arrived but *before* anyone is released.
//! Release therefore implies "the action is complete and visible".
//!
//! ## Breaking
//!
//! [`Barrier::break_with`] poisons the barrier permanently. Every blocked
//! and future waiter returns [`LifeError::BarrierBroken`] instead of
//! hanging. Used for shutdown and for worker failure.

use std::panic::{self, AssertUnwindSafe};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::error::{BreakReason, LifeError, LifeResult};

/// Outcome of a successful [`Barrier::wait`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarrierWaitResult {
    phase: u64,
    leader: bool,
}

impl BarrierWaitResult {
    /// The phase (cycle number) this wait completed.
    #[inline]
    #[must_use]
    pub const fn phase(&self) -> u64 {
        self.phase
    }

    /// True for exactly one participant per cycle: the one whose arrival
    /// released it (or the committer, for committed cycles).
    #[inline]
    #[must_use]
    pub const fn is_leader(&self) -> bool {
        self.leader
    }
}

struct BarrierState {
    /// Arrivals in the current phase.
    arrived: usize,
    /// Monotonic cycle token.
    phase: u64,
    /// A `wait_then` caller has arrived in the current phase.
    committer: bool,
    broken: Option<BreakReason>,
}

impl BarrierState {
    fn check(&self) -> LifeResult<()> {
        match self.broken {
            Some(reason) => Err(LifeError::BarrierBroken(reason)),
            None => Ok(()),
        }
    }

    /// Resets arrivals and advances the phase as one transition.
    fn release(&mut self) {
        self.arrived = 0;
        self.committer = false;
        self.phase = self.phase.wrapping_add(1);
    }
}

/// Reusable N-party barrier with phase tokens, committed release and
/// poisoning.
pub struct Barrier {
    parties: usize,
    state: Mutex<BarrierState>,
    cvar: Condvar,
}

impl Barrier {
    /// Creates a barrier for `parties` participants.
    ///
    /// # Panics
    ///
    /// Panics if `parties` is zero.
    #[must_use]
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "Barrier needs at least one participant");
        Self {
            parties,
            state: Mutex::new(BarrierState {
                arrived: 0,
                phase: 0,
                committer: false,
                broken: None,
            }),
            cvar: Condvar::new(),
        }
    }

    /// Number of participants per cycle.
    #[inline]
    #[must_use]
    pub const fn parties(&self) -> usize {
        self.parties
    }

    /// Number of completed cycles.
    #[must_use]
    pub fn phase(&self) -> u64 {
        self.state.lock().phase
    }

    /// Returns the break reason, if the barrier has been broken.
    #[must_use]
    pub fn broken_reason(&self) -> Option<BreakReason> {
        self.state.lock().broken
    }

    /// Returns true once [`Barrier::break_with`] has been called.
    #[must_use]
    pub fn is_broken(&self) -> bool {
        self.broken_reason().is_some()
    }

    /// Blocks until all participants of the current cycle have arrived.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::BarrierBroken`] if the barrier is broken before
    /// this caller's cycle is released.
    pub fn wait(&self) -> LifeResult<BarrierWaitResult> {
        let mut state = self.state.lock();
        state.check()?;

        let phase = state.phase;
        state.arrived += 1;

        if state.arrived == self.parties {
            if state.committer {
                // The committer releases this cycle once its action is done.
                self.cvar.notify_all();
            } else {
                state.release();
                self.cvar.notify_all();
                return Ok(BarrierWaitResult { phase, leader: true });
            }
        }

        self.await_release(&mut state, phase)?;
        Ok(BarrierWaitResult {
            phase,
            leader: false,
        })
    }

    /// Arrives as the cycle's committer.
    ///
    /// Blocks until the other `parties - 1` participants have arrived, runs
    /// `commit` while they are still held, then releases the cycle. At most
    /// one participant per cycle may use this method.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::BarrierBroken`] if the barrier is broken before
    /// every participant arrives, or if `commit` panics (the barrier is then
    /// broken with [`BreakReason::CommitFailed`]).
    ///
    /// # Panics
    ///
    /// Panics if another committer already arrived in the current cycle.
    pub fn wait_then<R>(&self, commit: impl FnOnce() -> R) -> LifeResult<R> {
        let mut state = self.state.lock();
        state.check()?;
        assert!(!state.committer, "Two committers in one barrier cycle!");

        state.committer = true;
        state.arrived += 1;

        while state.arrived < self.parties {
            if let Err(err) = state.check() {
                state.committer = false;
                return Err(err);
            }
            self.cvar.wait(&mut state);
        }

        // Everyone is parked on a phase that cannot advance without us.
        let outcome = MutexGuard::unlocked(&mut state, || {
            panic::catch_unwind(AssertUnwindSafe(commit))
        });

        match outcome {
            Ok(value) => {
                state.release();
                self.cvar.notify_all();
                Ok(value)
            }
            Err(_) => {
                tracing::warn!(phase = state.phase, "barrier commit action panicked");
                state.broken.get_or_insert(BreakReason::CommitFailed);
                self.cvar.notify_all();
                Err(LifeError::BarrierBroken(BreakReason::CommitFailed))
            }
        }
    }

    /// Breaks the barrier, releasing every waiter with an error.
    ///
    /// The first reason wins; later calls are no-ops. A broken barrier
    /// stays broken.
    pub fn break_with(&self, reason: BreakReason) {
        let mut state = self.state.lock();
        if state.broken.is_none() {
            state.broken = Some(reason);
            tracing::debug!(%reason, phase = state.phase, "barrier broken");
        }
        self.cvar.notify_all();
    }

    fn await_release(&self, state: &mut MutexGuard<'_, BarrierState>, phase: u64) -> LifeResult<()> {
        while state.phase == phase {
            state.check()?;
            self.cvar.wait(state);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Barrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Barrier")
            .field("parties", &self.parties)
            .field("arrived", &state.arrived)
            .field("phase", &state.phase)
            .field("broken", &state.broken)
            .finish()
    }
}
