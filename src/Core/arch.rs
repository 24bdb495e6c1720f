// Architecture-derived constants, resolved once per process.

use lazy_static::lazy_static;

use super::error::ConfigError;

/// Word-level layout of the target, as far as pointer tagging is concerned.
///
/// Heap objects that get tagged are aligned to at least `word_size` bytes, which
/// leaves the low `log2(word_size)` bits of their address free. Those bits carry
/// the tag, so a tag value can range over `0..=max_tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchConfig {
    /// Native address width: 32 or 64.
    pub address_bits: u32,
    /// Native word size in bytes (4 or 8).
    pub word_size: usize,
    /// Largest tag that fits in the low-order bits (3 or 7).
    pub max_tag: usize,
    /// Complement of the tag bits; `word & address_mask` is the clean address.
    pub address_mask: usize,
}

// Only 32- and 64-bit targets leave two or three free low bits in an aligned word.
const _: () = assert!(usize::BITS == 32 || usize::BITS == 64);

impl ArchConfig {
    /// Layout of the running target.
    pub fn detect() -> Self {
        Self::layout(usize::BITS)
    }

    /// Layout for an explicit address width.
    ///
    /// Fails with [`ConfigError::UnsupportedAddressWidth`] unless `address_bits` is 32 or 64.
    pub fn for_address_bits(address_bits: u32) -> Result<Self, ConfigError> {
        match address_bits {
            32 | 64 => Ok(Self::layout(address_bits)),
            bits => Err(ConfigError::UnsupportedAddressWidth { bits }),
        }
    }

    fn layout(address_bits: u32) -> Self {
        let word_size = (address_bits >> 3) as usize;
        let max_tag = word_size - 1;
        Self {
            address_bits,
            word_size,
            max_tag,
            address_mask: !max_tag,
        }
    }
}

lazy_static! {
    static ref ARCH: ArchConfig = {
        let config = ArchConfig::detect();
        log::debug!(
            "arch: {}-bit addresses, word size {}, max tag {}, mask {:#x}",
            config.address_bits,
            config.word_size,
            config.max_tag,
            config.address_mask
        );
        config
    };
}

/// Process-wide architecture configuration. Read-only.
#[inline]
pub fn arch() -> &'static ArchConfig {
    &ARCH
}

/// Rounds `v` up to the next power of two; powers of two pass through unchanged.
///
/// `0` rounds to `1`, the smallest power of two. Values above the largest
/// representable power of two wrap to `0`, matching the classic bit-smearing
/// formulation.
pub fn round_up_power_of_two(v: usize) -> usize {
    if v <= 1 {
        return 1;
    }
    let mut v = v - 1;
    let mut shift = 1;
    while shift < usize::BITS {
        v |= v >> shift;
        shift <<= 1;
    }
    v.wrapping_add(1)
}
