use std::marker::PhantomData;
use std::sync::atomic::Ordering::SeqCst;
use std::sync::atomic::AtomicUsize;

use crossbeam_epoch::{self as epoch, Guard};

use super::layout::Cursors;
use super::Buffer::{Full, Node, Ring};
use crate::Core::atomics::{new_slots, read_slot, EMPTY};
use crate::Core::rdcss::{self, is_descriptor, Outcome};
use crate::MPMC::spin::SpinPolicy;
use crate::MPMC::{RingBuilder, RingConfig};

/// What the producer found when the ring looked full.
enum FullCheck {
    /// Cursors or slots moved under us; look again.
    Retry,
    /// The slot after the last free one is still occupied.
    Full,
}

impl<T> Ring<T> {
    /// Creates a ring with room for `capacity` values, rounded up to a power of two,
    /// and the default spin thresholds.
    ///
    /// # Panics
    /// Panics if `capacity` is zero or larger than [`MAX_CAPACITY`](super::MAX_CAPACITY).
    /// Use [`RingBuilder`] to get these as errors instead.
    pub fn new(capacity: usize) -> Self {
        match RingBuilder::new().with_capacity(capacity).config() {
            Ok(config) => Self::with_config(config),
            Err(err) => panic!("Ring::new({capacity}): {err}"),
        }
    }

    pub(crate) fn with_config(config: RingConfig) -> Self {
        debug_assert!(config.capacity.is_power_of_two());
        Self {
            nodes: new_slots(config.capacity),
            cursors: Cursors::new(),
            capacity: config.capacity,
            mask: config.capacity - 1,
            config,
            _marker: PhantomData,
        }
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Settings the ring was built with.
    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    /// Logical position of the next value to dequeue.
    pub fn read_cursor(&self) -> usize {
        self.cursors.read.load(SeqCst)
    }

    /// Logical position of the next value to enqueue.
    pub fn write_cursor(&self) -> usize {
        self.cursors.write.load(SeqCst)
    }

    /// Number of values in the ring. A snapshot; stale as soon as it returns.
    pub fn len(&self) -> usize {
        let read = self.read_cursor();
        let write = self.write_cursor();
        write.wrapping_sub(read).min(self.capacity)
    }

    /// True when the slot the read cursor would consume holds nothing.
    pub fn is_empty(&self) -> bool {
        let read = self.read_cursor();
        let write = self.write_cursor();
        read == write && self.settled_slot(read) == EMPTY
    }

    /// True when the slot the write cursor would claim is still occupied.
    pub fn is_full(&self) -> bool {
        let read = self.read_cursor();
        let write = self.write_cursor();
        write.wrapping_sub(read) >= self.capacity && self.settled_slot(read) != EMPTY
    }

    /// Enqueue moves `value` into the slot at the write cursor.
    /// Returns the slot index on success, or the value back if the ring is full.
    pub fn enqueue(&self, value: T) -> Result<usize, Full<T>> {
        let node = Node::into_word(value);
        let guard = &epoch::pin();
        let mut spin = SpinPolicy::new(self.config.producer_spin_threshold);

        loop {
            let read = self.cursors.read.load(SeqCst);
            let write = self.cursors.write.load(SeqCst);
            let idx = write & self.mask;
            let current = read_slot(&self.nodes, idx);

            if is_descriptor(current) {
                // SAFETY: read from the slot under `guard`; the cursors outlive it.
                unsafe { rdcss::complete(current, guard) };
                spin.contended();
                continue;
            }

            if write.wrapping_sub(read) >= self.capacity {
                match self.check_full(read, guard) {
                    FullCheck::Retry => {
                        spin.contended();
                        continue;
                    }
                    FullCheck::Full => {
                        // SAFETY: the node was never published.
                        let value = unsafe { Node::<T>::into_value(node) };
                        return Err(Full(value));
                    }
                }
            }

            if current != EMPTY {
                // Someone filled `write` but has not moved the cursor yet
                self.advance(&self.cursors.write, write);
                spin.contended();
                continue;
            }

            // SAFETY: the control word is this ring's write cursor, which lives as long
            // as the slots any helper can reach.
            let outcome = unsafe {
                rdcss::rdcss_in(guard, &self.cursors.write, write, &self.nodes[idx], EMPTY, node)
            };
            match outcome {
                Outcome::Committed => {
                    self.advance(&self.cursors.write, write);
                    return Ok(idx);
                }
                Outcome::Aborted | Outcome::RolledBack => spin.contended(),
            }
        }
    }

    /// Dequeue takes the value at the read cursor.
    /// Returns None if the ring appears empty.
    pub fn dequeue(&self) -> Option<T> {
        let guard = &epoch::pin();
        let mut spin = SpinPolicy::new(self.config.consumer_spin_threshold);

        loop {
            let read = self.cursors.read.load(SeqCst);
            let write = self.cursors.write.load(SeqCst);
            let idx = read & self.mask;
            let current = read_slot(&self.nodes, idx);

            if is_descriptor(current) {
                // SAFETY: read from the slot under `guard`; the cursors outlive it.
                unsafe { rdcss::complete(current, guard) };
                spin.contended();
                continue;
            }

            if read == write {
                if current == EMPTY {
                    return None;
                }
                // A producer filled `write` but has not moved the cursor yet
                self.advance(&self.cursors.write, write);
                spin.contended();
                continue;
            }

            if current == EMPTY {
                // A consumer emptied `read` but has not moved the cursor yet
                self.advance(&self.cursors.read, read);
                spin.contended();
                continue;
            }

            // SAFETY: the control word is this ring's read cursor.
            let outcome = unsafe {
                rdcss::rdcss_in(guard, &self.cursors.read, read, &self.nodes[idx], current, EMPTY)
            };
            match outcome {
                Outcome::Committed => {
                    self.advance(&self.cursors.read, read);
                    // SAFETY: our commit swapped the node out of the ring; nobody else
                    // holds it, and other threads only ever compare its address.
                    return Some(unsafe { Node::<T>::into_value(current) });
                }
                Outcome::Aborted | Outcome::RolledBack => spin.contended(),
            }
        }
    }

    /// Moves `cursor` from `from` to the next position. Losing the CAS means another
    /// thread already did it.
    #[inline]
    fn advance(&self, cursor: &AtomicUsize, from: usize) {
        let _ = cursor.compare_exchange(from, from.wrapping_add(1), SeqCst, SeqCst);
    }

    /// The ring looks full from `read`. Either a consumer emptied the slot at `read`
    /// and has not advanced the cursor yet, or the ring really is full.
    fn check_full(&self, read: usize, guard: &Guard) -> FullCheck {
        let current = read_slot(&self.nodes, read & self.mask);
        if is_descriptor(current) {
            // SAFETY: read from the slot under `guard`.
            unsafe { rdcss::complete(current, guard) };
            return FullCheck::Retry;
        }
        if current == EMPTY {
            self.advance(&self.cursors.read, read);
            return FullCheck::Retry;
        }
        if self.cursors.read.load(SeqCst) != read {
            return FullCheck::Retry;
        }
        FullCheck::Full
    }

    /// Slot word for `cursor`, with any pending descriptor helped out of the way.
    fn settled_slot(&self, cursor: usize) -> usize {
        let guard = &epoch::pin();
        // SAFETY: slots only ever hold EMPTY, node words (8-byte aligned) and
        // descriptors installed against this ring's cursors.
        unsafe { rdcss::read_in(&self.nodes[cursor & self.mask], guard) }
    }
}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        let mut dropped = 0usize;
        for slot in self.nodes.iter_mut() {
            let word = *slot.get_mut();
            // Every RDCSS resolves before its owner returns, so no descriptor can be left.
            debug_assert!(!is_descriptor(word));
            if word != EMPTY && !is_descriptor(word) {
                // SAFETY: `&mut self` means no other thread can reach the slot.
                drop(unsafe { Node::<T>::into_value(word) });
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::debug!("ring: dropped {} undelivered values", dropped);
        }
    }
}
