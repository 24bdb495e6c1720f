//! Lock-free multi-producer multi-consumer ring buffer.
//!
//! `Core` holds the atomic coordination primitives (pointer tagging, slot CAS and the
//! RDCSS descriptor protocol). `MPMC` builds the fixed-capacity ring on top of them.

// Module naming follows project convention (MPMC = Multi-Producer Multi-Consumer)
#[allow(non_snake_case)]
pub mod Core;

#[allow(non_snake_case)]
pub mod MPMC;

#[allow(non_snake_case)]
mod Debug {
    pub mod StructDebug;
}

pub use Core::error::{ConfigError, TagError};
pub use MPMC::Buffer::{Full, Ring};
pub use MPMC::{Consumer, Producer, RingBuilder};
