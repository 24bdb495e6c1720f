// This is the fixed-capacity ring shared by every producer and consumer

use super::layout::Cursors;
use crate::MPMC::RingConfig;

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::AtomicUsize;

/// Largest slot count a ring accepts. Keeps `write - read` unambiguous.
pub const MAX_CAPACITY: usize = 1 << (usize::BITS - 2);

/// Heap cell for one value stored in the ring.
///
/// Slots hold the address of a node, so the node alignment is what makes the low
/// address bits free for descriptor tagging, whatever the alignment of `T`.
#[repr(align(8))]
pub(crate) struct Node<T> {
    pub(crate) value: T,
}

impl<T> Node<T> {
    /// Moves `value` to the heap and returns the node's address word.
    pub(crate) fn into_word(value: T) -> usize {
        Box::into_raw(Box::new(Node { value })) as usize
    }

    /// Takes back ownership of a node word and returns its value.
    ///
    /// # Safety
    /// `word` must come from [`Node::into_word`] for the same `T`, and the caller must
    /// be its only owner.
    pub(crate) unsafe fn into_value(word: usize) -> T {
        unsafe { Box::from_raw(word as *mut Node<T>) }.value
    }
}

/// A lock-free, multi-producer, multi-consumer (MPMC) ring of boxed values.
///
/// ### Concurrency Design:
/// - **Slots**: one address word per slot, either [`EMPTY`](crate::Core::EMPTY), the
///   address of a node, or a tagged RDCSS descriptor while a transition is in flight.
/// - **Producers (Enqueue)**: fill the slot at `write` with an RDCSS whose control word
///   is the write cursor, then advance the cursor.
/// - **Consumers (Dequeue)**: empty the slot at `read` with an RDCSS whose control word
///   is the read cursor, then advance the cursor.
/// - Anyone who finds a filled-but-not-advanced slot advances the cursor for the
///   thread that filled it, and anyone who finds a descriptor completes it.
pub struct Ring<T> {
    /// The slot array, `capacity` words long.
    pub(crate) nodes: Box<[AtomicUsize]>,

    /// Read and write cursors, cache padded.
    pub(crate) cursors: Cursors,

    /// The capacity of the ring (number of slots), always a power of two.
    pub(crate) capacity: usize,

    /// A bitmask used to wrap cursors around the ring.
    /// Calculated as `capacity - 1`.
    pub(crate) mask: usize,

    /// Spin thresholds, frozen at construction.
    pub(crate) config: RingConfig,

    pub(crate) _marker: PhantomData<T>,
}

// Values cross threads by ownership transfer through the slots.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

/// Returned by a producer when the ring has no free slot. Carries the value back.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// The value that could not be enqueued.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Full(..)")
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ring is full")
    }
}

impl<T> std::error::Error for Full<T> {}
