//! Tagging of address words through their free low-order bits.
//!
//! An address word is a pointer value carried as `usize`, the way it sits inside an
//! `AtomicUsize` slot. Objects that get tagged must be aligned to at least the native
//! word size (see [`ArchConfig`](super::arch::ArchConfig)); ring nodes and RDCSS
//! descriptors are declared `#[repr(align(8))]` for that reason.

use super::arch::arch;
use super::error::TagError;

/// Stores `value` in the low-order bits of `word`.
///
/// Fails with [`TagError::InvalidTag`] if `value` exceeds the maximum tag, and with
/// [`TagError::Misaligned`] if `word` already has a low-order bit set. Never allocates.
#[inline]
pub fn tag(word: usize, value: usize) -> Result<usize, TagError> {
    let arch = arch();
    if value > arch.max_tag {
        return Err(TagError::InvalidTag {
            tag: value,
            max: arch.max_tag,
        });
    }
    if word & arch.max_tag != 0 {
        return Err(TagError::Misaligned {
            address: word,
            align: arch.word_size,
        });
    }
    Ok(word | value)
}

/// Low-order bits of `word`, whether or not a tag was ever written there.
#[inline]
pub fn get_tag(word: usize) -> usize {
    word & arch().max_tag
}

/// `word` with every tag bit cleared.
#[inline]
pub fn untag(word: usize) -> usize {
    word & arch().address_mask
}

/// True iff any tag bit is set.
#[inline]
pub fn has_tag(word: usize) -> bool {
    get_tag(word) != 0
}

/// [`tag`] for raw pointers.
#[inline]
pub fn tag_ptr<T>(ptr: *mut T, value: usize) -> Result<*mut T, TagError> {
    tag(ptr as usize, value).map(|word| word as *mut T)
}

/// [`untag`] for raw pointers.
#[inline]
pub fn untag_ptr<T>(ptr: *mut T) -> *mut T {
    untag(ptr as usize) as *mut T
}
