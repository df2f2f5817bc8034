//! Loop state and the cancellation token

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Counters owned by the read loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopState {
    /// Complete ticks since the last flush or commit
    pub tick_index: u64,
    /// Failed reads since the streak was last reset
    pub timeout_streak: u32,
}

impl LoopState {
    /// Count one failed read.
    ///
    /// Returns true when the streak went past `threshold`; the streak is then
    /// reset to zero.
    pub fn record_timeout(&mut self, threshold: u32) -> bool {
        self.timeout_streak += 1;
        if self.timeout_streak > threshold {
            self.timeout_streak = 0;
            true
        } else {
            false
        }
    }

    /// Start a fresh tick epoch
    pub fn reset_tick(&mut self) {
        self.tick_index = 0;
    }
}

/// Exit request shared between the loop and whatever asks it to stop
/// (keyboard, signal handlers).
///
/// Writers only ever set it; the loop reads it once per tick boundary.
#[derive(Debug, Clone, Default)]
pub struct ExitFlag(Arc<AtomicBool>);

impl ExitFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to terminate
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
