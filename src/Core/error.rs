use thiserror::Error;

/// Errors from the pointer-tagging primitives.
///
/// Both variants are programming errors on the caller's side: the core never
/// clamps or truncates a tag to make it fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TagError {
    /// The requested tag does not fit in the free low-order bits.
    #[error("pointer: invalid tag {tag} (max {max})")]
    InvalidTag { tag: usize, max: usize },

    /// The address already has low-order bits set, so the tag would not round-trip.
    #[error("pointer: invalid address {address:#x} (not aligned to {align} bytes)")]
    Misaligned { address: usize, align: usize },
}

/// Which side of the ring a setting applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Producer,
    Consumer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Producer => f.write_str("producer"),
            Role::Consumer => f.write_str("consumer"),
        }
    }
}

/// Rejected ring or architecture configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("ring capacity must be greater than zero")]
    ZeroCapacity,

    #[error("ring capacity {requested} exceeds the maximum of {max} slots")]
    CapacityTooLarge { requested: usize, max: usize },

    #[error("{role} spin threshold must be a positive number of attempts")]
    ZeroSpinThreshold { role: Role },

    #[error("unsupported address width: {bits} bits (expected 32 or 64)")]
    UnsupportedAddressWidth { bits: u32 },
}
