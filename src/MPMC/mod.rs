mod builder;
mod consumer;
mod debug;
mod producer;
pub mod spin;

pub use builder::{RingBuilder, RingConfig};
pub use consumer::Consumer;
pub use producer::Producer;

pub mod Buffer {
    pub mod Buffer;
    pub mod Buffer_impl;
    pub mod layout;
    pub use Buffer::{Full, Ring, MAX_CAPACITY}; // re-export for stable path
}
