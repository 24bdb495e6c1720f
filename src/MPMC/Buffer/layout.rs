use crossbeam_utils::CachePadded;
use std::sync::atomic::AtomicUsize;

/// The read and write cursors of one ring.
///
/// Both are logical positions that only move forward (wrapping at `usize::MAX`);
/// the physical slot is `cursor & mask`. Each cursor sits on its own cache line so
/// producers bumping `write` do not invalidate the line consumers spin on.
#[repr(C)]
pub struct Cursors {
    /// The "read" cursor for consumers. Advanced once the slot it names has been emptied.
    pub read: CachePadded<AtomicUsize>,

    /// The "write" cursor for producers. Advanced once the slot it names has been filled.
    pub write: CachePadded<AtomicUsize>,
}

impl Cursors {
    pub fn new() -> Self {
        Self {
            read: CachePadded::new(AtomicUsize::new(0)),
            write: CachePadded::new(AtomicUsize::new(0)),
        }
    }
}

impl Default for Cursors {
    fn default() -> Self {
        Self::new()
    }
}
