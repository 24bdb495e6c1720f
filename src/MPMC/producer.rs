// In src/MPMC/producer.rs
use crate::MPMC::Buffer::{Full, Ring};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A producer for sending values into a shared ring.
///
/// Cloning a producer gives another handle to the same ring with its own counter,
/// so each producer thread usually owns one clone.
pub struct Producer<T> {
    ring: Arc<Ring<T>>,
    sent: AtomicU64,
}

impl<T> Producer<T> {
    pub(crate) fn new(ring: Arc<Ring<T>>) -> Self {
        Self {
            ring,
            sent: AtomicU64::new(0),
        }
    }

    /// Sends a value through the ring.
    ///
    /// # Returns
    /// * `Ok(index)` with the slot the value landed in
    /// * `Err(Full(value))` if every slot is occupied; the value is handed back so the
    ///   caller can apply its own backoff and retry
    pub fn send(&self, value: T) -> Result<usize, Full<T>> {
        let idx = self.ring.enqueue(value)?;
        self.sent.fetch_add(1, Ordering::Relaxed);
        Ok(idx)
    }

    /// Number of values this handle has sent.
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    /// The ring this producer writes to.
    pub fn ring(&self) -> &Arc<Ring<T>> {
        &self.ring
    }
}

impl<T> Clone for Producer<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.ring))
    }
}
