// Slot-level atomics over a contiguous array of address words.

use std::mem::size_of;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::{Acquire, SeqCst};

/// Marker stored in an unoccupied slot.
pub const EMPTY: usize = 0;

/// Allocates `len` slots, all empty.
pub fn new_slots(len: usize) -> Box<[AtomicUsize]> {
    (0..len).map(|_| AtomicUsize::new(EMPTY)).collect()
}

/// Address of slot `index`: the array base plus `index` slot strides.
///
/// Raw address arithmetic only; `index` is not checked against the array length.
#[inline]
pub fn slot_address(slots: &[AtomicUsize], index: usize) -> usize {
    (slots.as_ptr() as usize).wrapping_add(index.wrapping_mul(size_of::<AtomicUsize>()))
}

/// Current word in slot `index`. Inspection only, never a claim.
///
/// # Panics
/// Panics if `index` is out of bounds.
#[inline]
pub fn read_slot(slots: &[AtomicUsize], index: usize) -> usize {
    slots[index].load(Acquire)
}

/// Replaces slot `index` with `new` iff it currently holds `expected`.
///
/// Single attempt: never retries and never blocks.
///
/// # Panics
/// Panics if `index` is out of bounds.
#[inline]
pub fn cas_slot(slots: &[AtomicUsize], index: usize, expected: usize, new: usize) -> bool {
    slots[index]
        .compare_exchange(expected, new, SeqCst, SeqCst)
        .is_ok()
}

/// Claims slot `index` for `value` if nobody holds it yet.
///
/// Returns false, leaving the slot untouched, when it is already occupied.
#[inline]
pub fn set_slot_if_empty(slots: &[AtomicUsize], index: usize, value: usize) -> bool {
    cas_slot(slots, index, EMPTY, value)
}
