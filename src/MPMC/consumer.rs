// src/MPMC/consumer.rs

use crate::MPMC::Buffer::Ring;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A consumer for receiving values from a shared ring.
///
/// Cloning a consumer gives another handle to the same ring with its own counter.
pub struct Consumer<T> {
    ring: Arc<Ring<T>>,
    received: AtomicU64,
}

impl<T> Consumer<T> {
    pub(crate) fn new(ring: Arc<Ring<T>>) -> Self {
        Self {
            ring,
            received: AtomicU64::new(0),
        }
    }

    /// Receives a value from the ring if one is available.
    ///
    /// # Returns
    /// * `Some(value)` if a value was taken
    /// * `None` if the ring is empty; there is no blocking variant, callers pick
    ///   their own backoff
    pub fn receive(&self) -> Option<T> {
        let value = self.ring.dequeue()?;
        self.received.fetch_add(1, Ordering::Relaxed);
        Some(value)
    }

    /// Number of values this handle has received.
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// The ring this consumer reads from.
    pub fn ring(&self) -> &Arc<Ring<T>> {
        &self.ring
    }
}

impl<T> Clone for Consumer<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.ring))
    }
}
