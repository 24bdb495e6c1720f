//! Spin-before-yield policy for contended ring operations.

use std::hint;
use std::thread;

/// Consecutive contended attempts a producer makes before yielding its time slice.
pub const DEFAULT_PRODUCER_SPIN_THRESHOLD: u32 = 1000;

/// Consecutive contended attempts a consumer makes before yielding its time slice.
pub const DEFAULT_CONSUMER_SPIN_THRESHOLD: u32 = 1000;

/// Counts contended attempts within one operation.
///
/// Each contended attempt issues a spin hint; every `threshold`-th one yields to the
/// scheduler instead and starts the count over. Nothing here ever blocks.
pub(crate) struct SpinPolicy {
    threshold: u32,
    attempts: u32,
    yields: u32,
}

impl SpinPolicy {
    pub(crate) fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            attempts: 0,
            yields: 0,
        }
    }

    /// Records one failed attempt and backs off accordingly.
    pub(crate) fn contended(&mut self) {
        self.attempts += 1;
        if self.attempts >= self.threshold {
            self.attempts = 0;
            self.yields = self.yields.wrapping_add(1);
            log::trace!(
                "spin: yielding after {} contended attempts ({} yields so far)",
                self.threshold,
                self.yields
            );
            thread::yield_now();
        } else {
            hint::spin_loop();
        }
    }

    #[cfg(test)]
    pub(crate) fn yields(&self) -> u32 {
        self.yields
    }
}
