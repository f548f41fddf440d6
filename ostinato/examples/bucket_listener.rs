//! Example demonstrating bucket-transition callbacks and timers.
//!
//! This example shows how to:
//! - Attach a [`BucketListener`] to a recorder
//! - Receive superseded buckets as windows roll over
//! - Produce duration events with [`Timer`]

use std::sync::Arc;

use ostinato::{Bucket, BucketListener, Event, Recorder, Result, SECOND, Timer};

/// Prints every superseded bucket as it is reported.
struct PrintingListener;

impl BucketListener for PrintingListener {
    fn superseded_bucket(&self, name: &str, bucket: Bucket) {
        println!(
            "   {name}: window [{}..{}) closed with n={} mean={:.1}",
            bucket.interval_start, bucket.interval_end, bucket.count, bucket.mean,
        );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("🚀 ostinato bucket listener example");
    println!("\n📣 Superseded buckets as windows roll over:");

    let recorder = Recorder::with_listener(10, SECOND, Arc::new(PrintingListener))?;

    // Walk through five consecutive windows; each transition reports the
    // bucket that was just superseded.
    let base = 1_700_000_000_000_i64;
    for i in 0..5_i64 {
        for burst in 0..3_i64 {
            let t = base + i * SECOND + burst * 50;
            recorder.record(&Event::new("ticks", t, burst as f64))?;
        }
    }

    // Timers are the convenient way to produce duration events.
    let timer = Timer::start();
    let mut acc = 0_u64;
    for i in 0..1_000_000_u64 {
        acc = acc.wrapping_add(i);
    }
    let event = timer.stop("busy_loop");
    println!("\n⏱  busy_loop took {:.3} ms (acc={acc})", event.value);
    recorder.record(&event)?;

    println!("\n{} name(s) recorded", recorder.names().len());
    Ok(())
}
