//! Queue packet records through a growing ring buffer and print its counters.
//!
//! Run with `RUST_LOG=growring=debug cargo run --example packet_queue` to see
//! growth events.

use growring::{RingBuffer, RingBufferError};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct PacketInfo {
    seq: u64,
    kind: &'static str,
    size: u32,
    send_time: u64,
    ack_time: u64,
}

impl PacketInfo {
    fn new(seq: u64, kind: &'static str, size: u32) -> Self {
        Self {
            seq,
            kind,
            size,
            send_time: 0,
            ack_time: 0,
        }
    }
}

fn report(stage: &str, rb: &RingBuffer<PacketInfo>) {
    println!(
        "{stage}: capacity {} length {} free {} tail {} head {}",
        rb.capacity(),
        rb.length(),
        rb.free(),
        rb.tail_counter(),
        rb.head_counter()
    );
}

fn pop_batch(rb: &mut RingBuffer<PacketInfo>, count: usize) -> Result<(), RingBufferError> {
    for _ in 0..count {
        let p = rb.pop_oldest()?;
        println!(
            "  popped seq {} ({} {}B, rtt {})",
            p.seq,
            p.kind,
            p.size,
            p.ack_time - p.send_time
        );
    }
    Ok(())
}

fn main() -> Result<(), RingBufferError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut rb = RingBuffer::new();
    for seq in 0..19 {
        rb.push(PacketInfo::new(seq, "test", 128))?;
    }
    report("after 19 pushes", &rb);

    pop_batch(&mut rb, 5)?;
    report("after popping 5", &rb);

    pop_batch(&mut rb, 10)?;
    report("after popping 10 more", &rb);

    let mark = rb.cursor();
    for seq in 100..115 {
        rb.push(PacketInfo::new(seq, "test", 128))?;
    }
    report("after 15 refills", &rb);

    pop_batch(&mut rb, 5)?;
    match mark.get(&rb) {
        Ok(p) => println!("cursor still sees seq {}", p.seq),
        Err(err) => println!("cursor went stale: {err}"),
    }

    while !rb.is_empty() {
        pop_batch(&mut rb, 1)?;
    }
    report("drained", &rb);
    Ok(())
}
