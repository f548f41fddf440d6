//! Example demonstrating the sliding-window view over recorded events.
//!
//! This example shows how to:
//! - Configure a recorder with a ring geometry
//! - Record events for several names
//! - Read back per-name windows, including extrapolated empty buckets
//! - Export all snapshots as JSON

use ostinato::{Event, Recorder, Result, SECOND};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("🚀 ostinato sliding window example");

    // 10 buckets of 1 second each: a sliding 10-second window per name.
    let recorder = Recorder::new(10, SECOND)?;

    // Simulate request latencies over ~6 seconds of traffic. The "fail"
    // name is sparse on purpose.
    let base = 1_700_000_000_000_i64;
    for i in 0..60_i64 {
        let t = base + i * 100;
        recorder.record(&Event::new("requests.ok", t, 5.0 + (i % 7) as f64))?;
        if i % 20 == 0 {
            recorder.record(&Event::new("requests.fail", t, 250.0))?;
        }
    }

    println!("\n📊 Windows per name:");
    for name in recorder.names() {
        println!("   {name}");
        for bucket in recorder.snapshot(&name) {
            if bucket.is_empty() {
                continue;
            }
            println!(
                "     [{}..{}) n={:<3} min={:>6.1} mean={:>6.1} max={:>6.1}",
                bucket.interval_start,
                bucket.interval_end,
                bucket.count,
                bucket.min,
                bucket.mean,
                bucket.max,
            );
        }
    }

    // Ask for a window ending well after the recorded traffic: the engine
    // extrapolates empty buckets so the view keeps sliding with the clock.
    let later = base + 30 * SECOND;
    let stale = recorder.snapshot_at("requests.ok", later);
    let live = stale.iter().filter(|b| !b.is_empty()).count();
    println!("\n⏩ 30s later, {live} of {} buckets still hold data", stale.len());

    let json = serde_json::to_string_pretty(&recorder.all_snapshots())
        .expect("snapshots serialize");
    println!("\n📦 Export-ready JSON ({} bytes)", json.len());

    Ok(())
}
