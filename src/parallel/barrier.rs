//! Reusable sense-reversal barrier built from a mutex and a condition variable.
//!
//! Every thread remembers the round's sense before it blocks. The thread whose
//! arrival completes the round resets the arrival count, flips the sense and
//! wakes everybody; it is the round's leader. Because the flag flips instead of
//! being reset to a fixed value, a thread that loops straight back into `wait`
//! can never be mistaken for a straggler from the previous round.
//!
//! A thread that unwinds while holding an [`AbortOnPanic`] guard breaks the
//! barrier: every waiter wakes up and every later `wait` fails, so the survivors
//! can return instead of waiting for a thread that will never arrive.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;

use crate::error::ItmvError;

#[derive(Debug)]
struct BarrierState {
    /// Threads that have arrived in the current round
    arrived: usize,
    /// Flips once per completed round; false before the first round
    sense: bool,
    /// Completed rounds
    rounds: u64,
    /// Set once a participant has died; never cleared
    broken: bool,
}

/// Result of [`SenseBarrier::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    leader: bool,
}

impl BarrierWaitResult {
    /// True for exactly one thread per round: the one whose arrival completed it.
    pub fn is_leader(&self) -> bool {
        self.leader
    }
}

/// Barrier for a fixed set of `total` threads, reusable for any number of rounds.
#[derive(Debug)]
pub struct SenseBarrier {
    total: usize,
    state: Mutex<BarrierState>,
    cond: Condvar,
}

impl SenseBarrier {
    /// Prepare a barrier for exactly `total` participating threads.
    pub fn new(total: usize) -> Result<Self, ItmvError> {
        if total == 0 {
            return Err(ItmvError::EmptyBarrier);
        }
        Ok(Self {
            total,
            state: Mutex::new(BarrierState {
                arrived: 0,
                sense: false,
                rounds: 0,
                broken: false,
            }),
            cond: Condvar::new(),
        })
    }

    // Only the arrival-overflow assert can poison the lock; the counters stay coherent.
    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until all `total` threads have called `wait` for this round.
    ///
    /// Fails with [`ItmvError::BarrierBroken`] if the barrier was aborted before
    /// or while this thread waited.
    pub fn wait(&self) -> Result<BarrierWaitResult, ItmvError> {
        let mut state = self.lock();
        if state.broken {
            return Err(ItmvError::BarrierBroken);
        }
        let my_sense = state.sense;
        state.arrived += 1;
        assert!(
            state.arrived <= self.total,
            "barrier for {} threads saw {} arrivals in one round",
            self.total,
            state.arrived
        );
        if state.arrived == self.total {
            state.arrived = 0;
            state.sense = !my_sense;
            state.rounds += 1;
            drop(state);
            self.cond.notify_all();
            return Ok(BarrierWaitResult { leader: true });
        }
        let state = self
            .cond
            .wait_while(state, |s| s.sense == my_sense && !s.broken)
            .unwrap_or_else(PoisonError::into_inner);
        if state.sense == my_sense {
            return Err(ItmvError::BarrierBroken);
        }
        Ok(BarrierWaitResult { leader: false })
    }

    /// Break the barrier and wake every waiter.
    pub fn abort(&self) {
        self.lock().broken = true;
        self.cond.notify_all();
    }

    pub fn is_broken(&self) -> bool {
        self.lock().broken
    }

    /// Guard that aborts the barrier if the current thread unwinds past it.
    pub fn abort_on_panic(&self) -> AbortOnPanic<'_> {
        AbortOnPanic { barrier: self }
    }

    /// Number of participating threads.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Current round parity: false before the first round completes, then alternating.
    pub fn sense(&self) -> bool {
        self.lock().sense
    }

    /// Rounds completed so far.
    pub fn rounds(&self) -> u64 {
        self.lock().rounds
    }

    /// Tear the barrier down. Fails if a round was left half-finished.
    ///
    /// A broken barrier tears down without complaint; the failure was already
    /// reported to its waiters.
    pub fn destroy(self) -> Result<(), ItmvError> {
        let state = self.state.into_inner().unwrap_or_else(PoisonError::into_inner);
        if state.arrived != 0 && !state.broken {
            return Err(ItmvError::BarrierInUse { waiting: state.arrived });
        }
        Ok(())
    }
}

/// Returned by [`SenseBarrier::abort_on_panic`].
#[derive(Debug)]
pub struct AbortOnPanic<'a> {
    barrier: &'a SenseBarrier,
}

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.barrier.abort();
        }
    }
}
