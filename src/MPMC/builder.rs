use super::spin::{DEFAULT_CONSUMER_SPIN_THRESHOLD, DEFAULT_PRODUCER_SPIN_THRESHOLD};
use super::Buffer::{Ring, MAX_CAPACITY};
use super::{Consumer, Producer};
use crate::Core::arch::round_up_power_of_two;
use crate::Core::error::{ConfigError, Role};
use std::sync::Arc;

/// Validated ring settings. Immutable once the ring is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingConfig {
    /// Slot count, already rounded up to a power of two.
    pub capacity: usize,
    pub producer_spin_threshold: u32,
    pub consumer_spin_threshold: u32,
}

pub struct RingBuilder {
    capacity: usize,
    producer_spin_threshold: u32,
    consumer_spin_threshold: u32,
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self {
            capacity: 1024, // 1024 slots
            producer_spin_threshold: DEFAULT_PRODUCER_SPIN_THRESHOLD,
            consumer_spin_threshold: DEFAULT_CONSUMER_SPIN_THRESHOLD,
        }
    }
}

impl RingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested slot count. Rounded up to the next power of two when built.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_producer_spin_threshold(mut self, attempts: u32) -> Self {
        self.producer_spin_threshold = attempts;
        self
    }

    pub fn with_consumer_spin_threshold(mut self, attempts: u32) -> Self {
        self.consumer_spin_threshold = attempts;
        self
    }

    pub fn config(&self) -> Result<RingConfig, ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                requested: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        if self.producer_spin_threshold == 0 {
            return Err(ConfigError::ZeroSpinThreshold {
                role: Role::Producer,
            });
        }
        if self.consumer_spin_threshold == 0 {
            return Err(ConfigError::ZeroSpinThreshold {
                role: Role::Consumer,
            });
        }
        Ok(RingConfig {
            capacity: round_up_power_of_two(self.capacity),
            producer_spin_threshold: self.producer_spin_threshold,
            consumer_spin_threshold: self.consumer_spin_threshold,
        })
    }

    pub fn build<T>(self) -> Result<Ring<T>, ConfigError> {
        let config = self.config()?;
        log::debug!(
            "ring: requested {} slots, built {} (producer spin {}, consumer spin {})",
            self.capacity,
            config.capacity,
            config.producer_spin_threshold,
            config.consumer_spin_threshold
        );
        Ok(Ring::with_config(config))
    }

    /// Builds a ring and hands out one producer and one consumer for it.
    /// Clone either handle for more producers or consumers.
    pub fn build_channel<T>(self) -> Result<(Producer<T>, Consumer<T>), ConfigError> {
        let ring = Arc::new(self.build()?);
        Ok((Producer::new(Arc::clone(&ring)), Consumer::new(ring)))
    }
}
