// Multi-threaded hashing pipeline over one ring.
//
// Producers hash "message_<i>" and send "<i>:<hash>" strings; consumers recompute the
// hash and count mismatches. Ctrl+C stops every thread at its next iteration.
//
// cargo run --example pipeline -- <num_messages> [producers] [consumers]
use dmxp_lfring::{Full, RingBuilder};
use sha2::{Digest, Sha256};
use std::env;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn hash_hex(i: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("message_{}", i).as_bytes());
    format!("{:x}", hasher.finalize())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <num_messages> [producers] [consumers]", args[0]);
        std::process::exit(1);
    }

    let num_messages: usize = args[1].parse().expect("Invalid number of messages");
    let producers: usize = args.get(2).map_or(2, |s| s.parse().expect("Invalid producer count"));
    let consumers: usize = args.get(3).map_or(2, |s| s.parse().expect("Invalid consumer count"));

    let (producer, consumer) = RingBuilder::new()
        .with_capacity(256)
        .build_channel::<String>()
        .expect("Invalid ring configuration");
    println!("Pipeline: {:?}", producer.ring());

    let running = Arc::new(AtomicBool::new(true));
    let running_for_handler = Arc::clone(&running);

    // Handle Ctrl+C to stop the workers
    ctrlc::set_handler(move || {
        running_for_handler.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let next = Arc::new(AtomicUsize::new(0));
    let received = Arc::new(AtomicUsize::new(0));
    let mismatches = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let mut handles = Vec::new();
    for _ in 0..producers {
        let producer = producer.clone();
        let running = Arc::clone(&running);
        let next = Arc::clone(&next);
        handles.push(thread::spawn(move || {
            loop {
                let i = next.fetch_add(1, Ordering::Relaxed);
                if i >= num_messages {
                    break;
                }
                let mut message = format!("{}:{}", i, hash_hex(i));
                while let Err(Full(back)) = producer.send(message) {
                    if !running.load(Ordering::SeqCst) {
                        return producer.sent();
                    }
                    message = back;
                    thread::sleep(Duration::from_micros(10));
                }
            }
            producer.sent()
        }));
    }

    let mut consumer_handles = Vec::new();
    for _ in 0..consumers {
        let consumer = consumer.clone();
        let running = Arc::clone(&running);
        let received = Arc::clone(&received);
        let mismatches = Arc::clone(&mismatches);
        consumer_handles.push(thread::spawn(move || {
            while running.load(Ordering::SeqCst) && received.load(Ordering::SeqCst) < num_messages {
                let Some(message) = consumer.receive() else {
                    thread::sleep(Duration::from_micros(10));
                    continue;
                };
                let ok = message
                    .split_once(':')
                    .and_then(|(i, hash)| Some(hash_hex(i.parse().ok()?) == hash))
                    .unwrap_or(false);
                if !ok {
                    mismatches.fetch_add(1, Ordering::Relaxed);
                    eprintln!("Corrupted message: {}", message);
                }
                let count = received.fetch_add(1, Ordering::SeqCst) + 1;
                if count % 1000 == 0 {
                    println!("Received {} messages", count);
                }
            }
            consumer.received()
        }));
    }

    let sent: u64 = handles.into_iter().map(|h| h.join().unwrap_or(0)).sum();
    let taken: u64 = consumer_handles.into_iter().map(|h| h.join().unwrap_or(0)).sum();

    let elapsed = start.elapsed();
    println!(
        "Pipeline: sent {}, received {}, mismatches {} in {:.2?} ({:.0} msg/s)",
        sent,
        taken,
        mismatches.load(Ordering::Relaxed),
        elapsed,
        taken as f64 / elapsed.as_secs_f64()
    );
}
