//! Restricted double-compare single-swap (RDCSS).
//!
//! `RDCSS(a1, o1, a2, o2, n)` writes `n` to the data word `a2` only if `a2` holds `o2`
//! and, at one atomic instant, the control word `a1` holds `o1`. It is the two-word
//! building block of "A Practical Multi-Word Compare-and-Swap Operation" by Harris,
//! Fraser and Pratt.
//!
//! The operation runs in two phases:
//!
//! 1. **Install**: CAS `a2` from `o2` to the address of a freshly allocated descriptor,
//!    tagged with [`DESCRIPTOR_TAG`]. Failure ends the operation as [`Outcome::Aborted`].
//! 2. **Complete**: read `a1`, decide the outcome once in the descriptor's status word,
//!    then CAS `a2` from the tagged descriptor to `n` (committed) or back to `o2`
//!    (rolled back).
//!
//! Any thread that finds a tagged word in a data word runs phase 2 on the owner's
//! behalf before it touches that word, so a stalled owner never blocks anybody. Only
//! one completer wins the final CAS; the others count a contended resolution and move
//! on. Descriptors are reclaimed through `crossbeam-epoch`: the winner of the final CAS
//! retires the descriptor, and every thread that can dereference one is pinned.

use std::sync::atomic::Ordering::{Relaxed, SeqCst};
use std::sync::atomic::{AtomicU8, AtomicUsize};

use crossbeam_epoch::{self as epoch, Guard, Owned, Shared};

use super::tagged::{has_tag, tag, untag};

/// Tag marking a data word that holds a pending descriptor instead of real data.
pub const DESCRIPTOR_TAG: usize = 1;

// Must fit in the two free bits of a 32-bit word as well.
const _: () = assert!(DESCRIPTOR_TAG > 0 && DESCRIPTOR_TAG <= 3);

const UNDECIDED: u8 = 0;
const COMMITTED: u8 = 1;
const ROLLED_BACK: u8 = 2;

static CONTENDED_RESOLUTIONS: AtomicUsize = AtomicUsize::new(0);

/// Terminal state of one RDCSS invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The install CAS found something other than the expected data value.
    Aborted,
    /// The control word matched; the data word now holds the new value.
    Committed,
    /// The control word had moved; the data word was restored to its expected value.
    RolledBack,
}

impl Outcome {
    #[inline]
    pub fn is_committed(self) -> bool {
        self == Outcome::Committed
    }

    fn from_status(status: u8) -> Self {
        match status {
            COMMITTED => Outcome::Committed,
            ROLLED_BACK => Outcome::RolledBack,
            _ => unreachable!("descriptor status read before a decision: {status}"),
        }
    }
}

/// One in-flight RDCSS. Lives from install until the data word no longer refers to it.
#[repr(align(8))]
pub(crate) struct Descriptor {
    control: *const AtomicUsize,
    expected_control: usize,
    data: *const AtomicUsize,
    expected_data: usize,
    new: usize,
    status: AtomicU8,
}

impl Descriptor {
    /// Decides the outcome once. Every later caller gets the same answer.
    ///
    /// # Safety
    /// The control word must still be alive.
    unsafe fn decide(&self) -> Outcome {
        let status = self.status.load(SeqCst);
        if status != UNDECIDED {
            return Outcome::from_status(status);
        }
        let control = unsafe { &*self.control }.load(SeqCst);
        let verdict = if control == self.expected_control {
            COMMITTED
        } else {
            ROLLED_BACK
        };
        match self.status.compare_exchange(UNDECIDED, verdict, SeqCst, SeqCst) {
            Ok(_) => Outcome::from_status(verdict),
            Err(decided) => Outcome::from_status(decided),
        }
    }
}

/// True iff `word` is a tagged descriptor rather than real data.
#[inline]
pub fn is_descriptor(word: usize) -> bool {
    has_tag(word)
}

/// Number of descriptor resolutions, process-wide, that lost the final CAS because
/// another thread had already resolved the same descriptor.
pub fn contended_resolutions() -> usize {
    CONTENDED_RESOLUTIONS.load(Relaxed)
}

fn descriptor_word(desc: *const Descriptor) -> usize {
    match tag(desc as usize, DESCRIPTOR_TAG) {
        Ok(word) => word,
        // Descriptors are 8-byte aligned, so this is a broken allocator.
        Err(err) => panic!("cannot tag RDCSS descriptor: {err}"),
    }
}

/// Runs RDCSS and reports whether it committed.
///
/// # Safety
/// `control` must stay valid for as long as any thread may still access `data`: a
/// helper that finds this operation's descriptor in `data` reads `control` through it.
/// `expected_data` and `new` must be untagged words, and `data` must never hold a
/// tagged word other than a descriptor installed by this module: any tagged word found
/// there is dereferenced as one.
pub unsafe fn rdcss(
    control: &AtomicUsize,
    expected_control: usize,
    data: &AtomicUsize,
    expected_data: usize,
    new: usize,
) -> bool {
    unsafe { rdcss_outcome(control, expected_control, data, expected_data, new) }.is_committed()
}

/// Runs RDCSS and reports which terminal state it reached.
///
/// # Safety
/// Same contract as [`rdcss`].
pub unsafe fn rdcss_outcome(
    control: &AtomicUsize,
    expected_control: usize,
    data: &AtomicUsize,
    expected_data: usize,
    new: usize,
) -> Outcome {
    let guard = &epoch::pin();
    unsafe { rdcss_in(guard, control, expected_control, data, expected_data, new) }
}

/// Reads a data word, helping any pending descriptor out of the way first.
///
/// The returned word is never a descriptor.
///
/// # Safety
/// Same contract as [`rdcss`] for `data`: every tagged word it can hold is a
/// descriptor installed by this module whose control word is still alive.
///
/// ```compile_fail
/// use std::sync::atomic::AtomicUsize;
/// let data = AtomicUsize::new(0x41);
/// dmxp_lfring::Core::rdcss::read(&data);
/// ```
pub unsafe fn read(data: &AtomicUsize) -> usize {
    let guard = &epoch::pin();
    unsafe { read_in(data, guard) }
}

/// [`read`] under a caller-provided guard.
///
/// # Safety
/// Same contract as [`read`].
pub(crate) unsafe fn read_in(data: &AtomicUsize, guard: &Guard) -> usize {
    loop {
        let word = data.load(SeqCst);
        if !is_descriptor(word) {
            return word;
        }
        // SAFETY: `word` was just read from a data word while `guard` is pinned.
        unsafe { complete(word, guard) };
    }
}

/// [`rdcss_outcome`] under a caller-provided guard.
///
/// # Safety
/// Same contract as [`rdcss`].
pub(crate) unsafe fn rdcss_in(
    guard: &Guard,
    control: &AtomicUsize,
    expected_control: usize,
    data: &AtomicUsize,
    expected_data: usize,
    new: usize,
) -> Outcome {
    match install(guard, control, expected_control, data, expected_data, new) {
        // SAFETY: we installed `word` ourselves and are still pinned.
        Ok(word) => unsafe { complete(word, guard) },
        Err(observed) => {
            if is_descriptor(observed) {
                // SAFETY: `observed` came out of the data word while pinned.
                unsafe { complete(observed, guard) };
            }
            Outcome::Aborted
        }
    }
}

/// Phase 1. On success returns the tagged descriptor word now held by `data`; on
/// failure returns the word that was found there instead.
pub(crate) fn install(
    guard: &Guard,
    control: &AtomicUsize,
    expected_control: usize,
    data: &AtomicUsize,
    expected_data: usize,
    new: usize,
) -> Result<usize, usize> {
    debug_assert!(!is_descriptor(expected_data), "expected data word is tagged");
    debug_assert!(!is_descriptor(new), "new data word is tagged");

    let desc = Owned::new(Descriptor {
        control,
        expected_control,
        data,
        expected_data,
        new,
        status: AtomicU8::new(UNDECIDED),
    })
    .into_shared(guard);
    let word = descriptor_word(desc.as_raw());

    match data.compare_exchange(expected_data, word, SeqCst, SeqCst) {
        Ok(_) => Ok(word),
        Err(observed) => {
            // SAFETY: the descriptor was never published.
            drop(unsafe { desc.into_owned() });
            Err(observed)
        }
    }
}

/// Phase 2, run by the owner or by any helper.
///
/// # Safety
/// `word` must be a tagged descriptor word read from its data word while `guard` was
/// pinned, and the descriptor's control word must still be alive.
pub(crate) unsafe fn complete(word: usize, guard: &Guard) -> Outcome {
    let ptr = untag(word) as *const Descriptor;
    // SAFETY: the descriptor is retired only after it leaves its data word, and the
    // caller read it from there under `guard`, so it is not yet reclaimed.
    let desc = unsafe { &*ptr };
    let outcome = unsafe { desc.decide() };
    let target = match outcome {
        Outcome::Committed => desc.new,
        _ => desc.expected_data,
    };

    let data = unsafe { &*desc.data };
    match data.compare_exchange(word, target, SeqCst, SeqCst) {
        // SAFETY: this CAS removed the last reference; a descriptor word is never
        // reinstalled, so no one else can retire it.
        Ok(_) => unsafe { guard.defer_destroy(Shared::from(ptr)) },
        Err(_) => {
            CONTENDED_RESOLUTIONS.fetch_add(1, Relaxed);
            log::trace!(
                "rdcss: descriptor {:#x} already resolved ({:?})",
                word,
                outcome
            );
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_change_between_install_and_complete_rolls_back() {
        let control = AtomicUsize::new(7);
        let data = AtomicUsize::new(0x1000);
        let guard = &epoch::pin();

        let word = install(guard, &control, 7, &data, 0x1000, 0x2000).unwrap();
        assert!(is_descriptor(data.load(SeqCst)));

        control.store(8, SeqCst);
        let outcome = unsafe { complete(word, guard) };

        assert_eq!(outcome, Outcome::RolledBack);
        assert_eq!(data.load(SeqCst), 0x1000);
    }

    #[test]
    fn helper_completion_is_reported_to_owner() {
        let control = AtomicUsize::new(3);
        let data = AtomicUsize::new(0x40);
        let guard = &epoch::pin();
        let before = contended_resolutions();

        let word = install(guard, &control, 3, &data, 0x40, 0x80).unwrap();

        // A reader trips over the descriptor and finishes it.
        assert_eq!(unsafe { read_in(&data, guard) }, 0x80);

        // The owner's own completion agrees and loses the final CAS.
        let outcome = unsafe { complete(word, guard) };
        assert_eq!(outcome, Outcome::Committed);
        assert_eq!(data.load(SeqCst), 0x80);
        assert!(contended_resolutions() > before);
    }

    #[test]
    fn decision_is_sticky_after_control_moves() {
        let control = AtomicUsize::new(1);
        let data = AtomicUsize::new(0x10);
        let guard = &epoch::pin();

        let word = install(guard, &control, 1, &data, 0x10, 0x20).unwrap();
        let desc = unsafe { &*(untag(word) as *const Descriptor) };
        assert_eq!(unsafe { desc.decide() }, Outcome::Committed);

        // The control word moving after the decision cannot flip it.
        control.store(2, SeqCst);
        assert_eq!(unsafe { complete(word, guard) }, Outcome::Committed);
        assert_eq!(data.load(SeqCst), 0x20);
    }

    #[test]
    fn failed_install_leaves_data_untouched() {
        let control = AtomicUsize::new(0);
        let data = AtomicUsize::new(0x30);
        let guard = &epoch::pin();

        assert_eq!(install(guard, &control, 0, &data, 0x38, 0x40), Err(0x30));
        assert_eq!(data.load(SeqCst), 0x30);
    }

    #[test]
    fn aborted_install_helps_pending_descriptor() {
        let control = AtomicUsize::new(5);
        let data = AtomicUsize::new(0x100);
        let guard = &epoch::pin();

        let _pending = install(guard, &control, 5, &data, 0x100, 0x200).unwrap();

        let outcome = unsafe { rdcss_in(guard, &control, 5, &data, 0x100, 0x300) };
        assert_eq!(outcome, Outcome::Aborted);
        // The pending operation was finished on its owner's behalf.
        assert_eq!(data.load(SeqCst), 0x200);
    }
}
