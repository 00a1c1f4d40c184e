use growring::{RingBuffer, RingBufferConfig, RingBufferError, MIN_CAPACITY};

#[derive(Debug, Clone, PartialEq)]
struct Packet {
    seq: u64,
    kind: &'static str,
    size: u32,
}

fn packet(seq: u64) -> Packet {
    Packet {
        seq,
        kind: "rtp",
        size: 1024,
    }
}

#[test]
fn push_nineteen_then_pop_five() {
    let mut rb = RingBuffer::with_capacity(8);
    let mut capacities = vec![rb.capacity()];

    for value in 0..19u32 {
        rb.push(value).unwrap();
        if capacities.last() != Some(&rb.capacity()) {
            capacities.push(rb.capacity());
        }
    }
    assert_eq!(capacities, vec![8, 16, 32]);
    assert_eq!(rb.capacity(), 32);
    assert_eq!(rb.length(), 19);

    for _ in 0..5 {
        rb.pop_oldest().unwrap();
    }
    assert_eq!(rb.oldest(), Ok(&5));
    assert_eq!(rb.length(), 14);
    assert_eq!(rb.capacity(), 32);
}

#[test]
fn fifo_order() {
    let mut rb = RingBuffer::new();
    rb.push("a").unwrap();
    rb.push("b").unwrap();
    rb.push("c").unwrap();

    assert_eq!(rb.pop_oldest(), Ok("a"));
    assert_eq!(rb.pop_oldest(), Ok("b"));
    assert_eq!(rb.pop_oldest(), Ok("c"));
    assert_eq!(rb.pop_oldest(), Err(RingBufferError::EmptyBuffer));
}

#[test]
fn growth_preserves_push_order() {
    let mut rb = RingBuffer::with_capacity(MIN_CAPACITY);
    let pushed: Vec<Packet> = (0..=MIN_CAPACITY as u64).map(packet).collect();
    for p in &pushed {
        rb.push(p.clone()).unwrap();
    }
    assert!(rb.capacity() > MIN_CAPACITY);

    let seen: Vec<Packet> = (0..rb.length())
        .map(|offset| rb.at_offset(offset).unwrap().clone())
        .collect();
    assert_eq!(seen, pushed);
}

#[test]
fn empty_access_fails_without_change() {
    let mut rb: RingBuffer<Packet> = RingBuffer::new();

    assert_eq!(rb.oldest(), Err(RingBufferError::EmptyBuffer));
    assert_eq!(rb.newest(), Err(RingBufferError::EmptyBuffer));
    assert_eq!(rb.pop_oldest(), Err(RingBufferError::EmptyBuffer));
    assert_eq!(rb.pop_newest(), Err(RingBufferError::EmptyBuffer));

    assert_eq!(rb.length(), 0);
    assert_eq!(rb.capacity(), 8);
    assert_eq!(rb.tail_counter(), 0);
    assert_eq!(rb.head_counter(), 0);
}

#[test]
fn at_rejects_counters_outside_live_range() {
    let mut rb = RingBuffer::new();
    rb.try_extend(0..8u32).unwrap();
    for _ in 0..5 {
        rb.pop_oldest().unwrap();
    }
    assert_eq!((rb.tail_counter(), rb.head_counter()), (5, 8));

    assert!(matches!(rb.at(4), Err(RingBufferError::OutOfRange { counter: 4, .. })));
    assert!(matches!(rb.at(8), Err(RingBufferError::OutOfRange { counter: 8, .. })));
    assert_eq!(rb.at(5), Ok(&5));
    assert_eq!(rb.at(6), Ok(&6));
    assert_eq!(rb.at(7), Ok(&7));

    assert_eq!(rb.at_offset(0), Ok(&5));
    assert!(matches!(rb.at_offset(3), Err(RingBufferError::OutOfRange { .. })));
}

#[test]
fn at_resolves_wrapped_layout() {
    let mut rb = RingBuffer::new();
    rb.try_extend(0..8u32).unwrap();
    for _ in 0..6 {
        rb.pop_oldest().unwrap();
    }
    rb.try_extend(8..13).unwrap();
    assert_eq!(rb.capacity(), 8);

    // counters 6..13 live; physical slots 6, 7, 0, 1, 2, 3, 4
    for counter in 6..13u64 {
        assert_eq!(rb.at(counter), Ok(&(counter as u32)));
    }
    assert!(rb.at(5).is_err());
    assert!(rb.at(13).is_err());
}

#[test]
fn refill_after_partial_drain() {
    let mut rb = RingBuffer::new();
    for seq in 0..19 {
        rb.push(packet(seq)).unwrap();
    }
    for _ in 0..15 {
        rb.pop_oldest().unwrap();
    }
    for seq in 100..115 {
        rb.push(packet(seq)).unwrap();
    }
    assert_eq!(rb.capacity(), 32);
    assert_eq!(rb.length(), 19);
    assert_eq!(rb.oldest().map(|p| p.seq), Ok(15));
    assert_eq!(rb.newest().map(|p| p.seq), Ok(114));

    let mut drained = Vec::new();
    while let Ok(p) = rb.pop_oldest() {
        drained.push(p.seq);
    }
    let expected: Vec<u64> = (15..19).chain(100..115).collect();
    assert_eq!(drained, expected);
    assert!(rb.is_empty());
}

#[test]
fn failed_grow_keeps_buffer_usable() {
    let mut rb = RingBuffer::with_config(RingBufferConfig::new().initial_capacity(16));
    rb.try_extend(0..10u8).unwrap();

    let err = rb.grow(12).unwrap_err();
    assert!(matches!(
        err,
        RingBufferError::InvalidTarget {
            target: 12,
            floor: 16,
            ..
        }
    ));
    assert_eq!(rb.capacity(), 16);
    assert_eq!(rb.iter().copied().collect::<Vec<_>>(), (0..10).collect::<Vec<_>>());

    rb.grow(40).unwrap();
    assert_eq!(rb.capacity(), 40);
    rb.push(10).unwrap();
    assert_eq!(rb.newest(), Ok(&10));
}

#[test]
fn packet_fields_survive_round_trip() {
    let mut rb = RingBuffer::new();
    rb.push(packet(7)).unwrap();
    let p = rb.newest().unwrap();
    assert_eq!((p.seq, p.kind, p.size), (7, "rtp", 1024));
}
