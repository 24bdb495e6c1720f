use dmxp_lfring::Core::error::Role;
use dmxp_lfring::MPMC::spin::{DEFAULT_CONSUMER_SPIN_THRESHOLD, DEFAULT_PRODUCER_SPIN_THRESHOLD};
use dmxp_lfring::MPMC::Buffer::MAX_CAPACITY;
use dmxp_lfring::MPMC::RingConfig;
use dmxp_lfring::{ConfigError, Full, RingBuilder};
use std::sync::Arc;

#[test]
fn defaults() {
    let config = RingBuilder::new().config().unwrap();
    assert_eq!(
        config,
        RingConfig {
            capacity: 1024,
            producer_spin_threshold: DEFAULT_PRODUCER_SPIN_THRESHOLD,
            consumer_spin_threshold: DEFAULT_CONSUMER_SPIN_THRESHOLD,
        }
    );
    assert_eq!(DEFAULT_PRODUCER_SPIN_THRESHOLD, 1000);
    assert_eq!(DEFAULT_CONSUMER_SPIN_THRESHOLD, 1000);
}

#[test]
fn capacity_is_rounded_and_thresholds_kept() {
    let ring = RingBuilder::new()
        .with_capacity(100)
        .with_producer_spin_threshold(7)
        .with_consumer_spin_threshold(9)
        .build::<String>()
        .unwrap();

    assert_eq!(ring.capacity(), 128);
    assert_eq!(ring.config().capacity, 128);
    assert_eq!(ring.config().producer_spin_threshold, 7);
    assert_eq!(ring.config().consumer_spin_threshold, 9);
}

#[test]
fn zero_capacity_is_rejected() {
    let err = RingBuilder::new().with_capacity(0).build::<u8>().unwrap_err();
    assert_eq!(err, ConfigError::ZeroCapacity);
    assert_eq!(err.to_string(), "ring capacity must be greater than zero");
}

#[test]
fn oversized_capacity_is_rejected() {
    let err = RingBuilder::new()
        .with_capacity(MAX_CAPACITY + 1)
        .config()
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::CapacityTooLarge {
            requested: MAX_CAPACITY + 1,
            max: MAX_CAPACITY,
        }
    );
    assert!(err.to_string().contains("exceeds the maximum"));

    // The largest accepted capacity is exactly the limit, which is a power of two.
    let config = RingBuilder::new().with_capacity(MAX_CAPACITY).config().unwrap();
    assert_eq!(config.capacity, MAX_CAPACITY);
}

#[test]
fn zero_spin_thresholds_are_rejected() {
    let err = RingBuilder::new()
        .with_producer_spin_threshold(0)
        .config()
        .unwrap_err();
    assert_eq!(err, ConfigError::ZeroSpinThreshold { role: Role::Producer });
    assert_eq!(
        err.to_string(),
        "producer spin threshold must be a positive number of attempts"
    );

    let err = RingBuilder::new()
        .with_consumer_spin_threshold(0)
        .config()
        .unwrap_err();
    assert_eq!(err, ConfigError::ZeroSpinThreshold { role: Role::Consumer });
    assert!(err.to_string().starts_with("consumer"));
}

#[test]
fn channel_handles_share_one_ring() {
    let (producer, consumer) = RingBuilder::new()
        .with_capacity(2)
        .build_channel::<&'static str>()
        .unwrap();
    assert!(Arc::ptr_eq(producer.ring(), consumer.ring()));

    let second = producer.clone();
    assert!(Arc::ptr_eq(producer.ring(), second.ring()));

    assert_eq!(producer.send("a"), Ok(0));
    assert_eq!(second.send("b"), Ok(1));
    assert_eq!(producer.send("c"), Err(Full("c")));
    assert_eq!(Full("c").into_inner(), "c");

    // Each handle counts only its own traffic
    assert_eq!(producer.sent(), 1);
    assert_eq!(second.sent(), 1);

    let other = consumer.clone();
    assert_eq!(consumer.receive(), Some("a"));
    assert_eq!(other.receive(), Some("b"));
    assert_eq!(other.receive(), None);
    assert_eq!(consumer.received(), 1);
    assert_eq!(other.received(), 1);

    assert_eq!(producer.send("c"), Ok(0));
    assert_eq!(producer.sent(), 2);
}

#[test]
fn handle_debug_output() {
    let (producer, consumer) = RingBuilder::new().build_channel::<u32>().unwrap();
    producer.send(1).unwrap();

    let p = format!("{:?}", producer);
    assert!(p.starts_with("Producer"));
    assert!(p.contains("sent: 1"));

    let c = format!("{:?}", consumer);
    assert!(c.starts_with("Consumer"));
    assert!(c.contains("received: 0"));

    assert_eq!(format!("{:?}", Full(5u32)), "Full(..)");
    assert_eq!(Full(5u32).to_string(), "ring is full");
}

#[test]
fn full_is_a_std_error() {
    fn boxed(err: Full<u8>) -> Box<dyn std::error::Error> {
        Box::new(err)
    }
    assert_eq!(boxed(Full(1)).to_string(), "ring is full");
}
