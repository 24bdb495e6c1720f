use dmxp_lfring::Core::atomics::{
    cas_slot, new_slots, read_slot, set_slot_if_empty, slot_address, EMPTY,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::mem::size_of;
use std::sync::atomic::AtomicUsize;
use std::sync::Barrier;
use std::thread;

#[test]
fn new_slots_start_empty() {
    let slots = new_slots(8);
    assert_eq!(slots.len(), 8);
    for i in 0..8 {
        assert_eq!(read_slot(&slots, i), EMPTY);
    }
}

#[test]
fn slot_address_is_base_plus_stride() {
    let slots = new_slots(8);
    let base = slots.as_ptr() as usize;

    assert_eq!(slot_address(&slots, 0), base);
    assert_eq!(slot_address(&slots, 3), base + 3 * size_of::<AtomicUsize>());
    assert_eq!(slot_address(&slots, 7), &slots[7] as *const AtomicUsize as usize);
}

#[test]
fn cas_slot_requires_expected_value() {
    let slots = new_slots(4);

    assert!(cas_slot(&slots, 2, EMPTY, 0x100));
    assert_eq!(read_slot(&slots, 2), 0x100);

    assert!(!cas_slot(&slots, 2, EMPTY, 0x200));
    assert_eq!(read_slot(&slots, 2), 0x100);

    assert!(cas_slot(&slots, 2, 0x100, 0x200));
    assert_eq!(read_slot(&slots, 2), 0x200);

    // Neighbours untouched
    assert_eq!(read_slot(&slots, 1), EMPTY);
    assert_eq!(read_slot(&slots, 3), EMPTY);
}

#[test]
fn set_slot_if_empty_never_overwrites() {
    let slots = new_slots(2);

    assert!(set_slot_if_empty(&slots, 0, 0x80));
    assert!(!set_slot_if_empty(&slots, 0, 0x88));
    assert_eq!(read_slot(&slots, 0), 0x80);
}

#[test]
#[should_panic]
fn out_of_bounds_slot_panics() {
    let slots = new_slots(4);
    read_slot(&slots, 4);
}

#[test]
fn concurrent_claims_never_double_claim() {
    let slots = new_slots(8);
    let threads = 4;
    let barrier = Barrier::new(threads);
    let claims = Mutex::new(Vec::new());

    thread::scope(|scope| {
        for t in 0..threads {
            let slots = &slots;
            let barrier = &barrier;
            let claims = &claims;
            scope.spawn(move || {
                barrier.wait();
                // Each thread walks the slots from a different starting point.
                for step in 0..slots.len() {
                    let idx = (t * 2 + step) % slots.len();
                    let value = (t + 1) << 4 | idx << 8;
                    if set_slot_if_empty(slots, idx, value) {
                        claims.lock().push((idx, value));
                    }
                }
            });
        }
    });

    let claims = claims.into_inner();
    assert_eq!(claims.len(), 8);
    let indices: HashSet<usize> = claims.iter().map(|&(idx, _)| idx).collect();
    assert_eq!(indices.len(), 8);
    for (idx, value) in claims {
        assert_eq!(read_slot(&slots, idx), value);
    }
}
