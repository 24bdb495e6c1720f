use crate::MPMC::Buffer::Ring;
use crate::MPMC::{Consumer, Producer};
use std::fmt;

/// Debug function for Ring
///
/// Shows:
/// - Slot array location
/// - Capacity and spin thresholds
/// - Cursor snapshot
///
/// Slot contents are never dereferenced.
pub fn debug_ring<T>(ring: &Ring<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Ring")
        .field("nodes", &format_args!("{:p}", ring.nodes.as_ptr()))
        .field("capacity", &ring.capacity())
        .field("read", &ring.read_cursor())
        .field("write", &ring.write_cursor())
        .field("producer_spin_threshold", &ring.config().producer_spin_threshold)
        .field("consumer_spin_threshold", &ring.config().consumer_spin_threshold)
        .finish()
}

/// Debug function for Producer
pub fn debug_producer<T>(producer: &Producer<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Producer")
        .field("ring", &format_args!("Ring({:p})", producer.ring().nodes.as_ptr()))
        .field("sent", &producer.sent())
        .finish()
}

/// Debug function for Consumer
pub fn debug_consumer<T>(consumer: &Consumer<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Consumer")
        .field("ring", &format_args!("Ring({:p})", consumer.ring().nodes.as_ptr()))
        .field("received", &consumer.received())
        .finish()
}
