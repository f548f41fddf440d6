//! Integration tests for the full record → snapshot lifecycle.
//!
//! These exercise the public API end to end: aggregation scenarios,
//! sliding-window extrapolation, listener delivery, and JSON export of
//! snapshots.

use std::sync::{Arc, Mutex};

use ostinato::{Bucket, BucketListener, Event, Recorder, SECOND};

#[derive(Default)]
struct CollectingListener {
    reported: Mutex<Vec<(String, Bucket)>>,
}

impl BucketListener for CollectingListener {
    fn superseded_bucket(&self, name: &str, bucket: Bucket) {
        self.reported.lock().unwrap().push((name.to_string(), bucket));
    }
}

#[test]
fn test_identical_events_aggregate_into_one_bucket() {
    // 60 buckets of 1s; three identical events at one instant.
    let recorder = Recorder::new(60, SECOND).unwrap();
    let t = 1_700_000_000_000;

    for _ in 0..3 {
        recorder.record(&Event::new("op", t, 5.0)).unwrap();
    }

    let buckets = recorder.snapshot("op");
    assert_eq!(buckets.len(), 60);

    let last = buckets.last().unwrap();
    assert_eq!(last.count, 3);
    assert_eq!(last.min, 5.0);
    assert_eq!(last.mean, 5.0);
    assert_eq!(last.max, 5.0);
    assert!(buckets[..59].iter().all(Bucket::is_empty));
}

#[test]
fn test_sliding_window_moves_past_recorded_data() {
    // One event at t=9500, then ask for the window ending at t=100000:
    // the event lies before [91000, 101000), so every bucket is empty.
    let recorder = Recorder::new(10, SECOND).unwrap();
    recorder.record(&Event::new("op", 9_500, 1.0)).unwrap();

    let buckets = recorder.snapshot_at("op", 100_000);
    assert_eq!(buckets.len(), 10);

    let mut expected_start = 91_000;
    for bucket in &buckets {
        assert_eq!(bucket.interval_start, expected_start);
        assert_eq!(bucket.interval_end, expected_start + SECOND);
        assert!(bucket.is_empty());
        expected_start += SECOND;
    }
}

#[test]
fn test_mixed_names_with_interleaved_out_of_order_feed() {
    let recorder = Recorder::new(24, ostinato::HOUR).unwrap();
    let base = ostinato::DAY;

    // Two names, hours fed newest-first and interleaved.
    for i in (0..24_i64).rev() {
        for name in ["alpha", "beta"] {
            let t = base + i * ostinato::HOUR + 1;
            recorder.record(&Event::new(name, t, i as f64)).unwrap();
        }
    }

    assert_eq!(recorder.names(), ["alpha", "beta"]);

    for name in ["alpha", "beta"] {
        let buckets = recorder.snapshot(name);
        assert_eq!(buckets.len(), 24);
        for (i, bucket) in buckets.iter().enumerate() {
            assert_eq!(bucket.count, 1, "hour {i} of {name}");
            assert_eq!(bucket.mean, i as f64);
        }
    }
}

#[test]
fn test_listener_sees_superseded_buckets_through_recorder() {
    let listener = Arc::new(CollectingListener::default());
    let recorder =
        Recorder::with_listener(10, SECOND, Arc::clone(&listener) as _).unwrap();

    // One event per consecutive window across 5 windows.
    for i in 0..5_i64 {
        recorder
            .record(&Event::new("op", i * SECOND + 100, i as f64))
            .unwrap();
    }

    let reported = listener.reported.lock().unwrap();
    assert_eq!(reported.len(), 4);
    for (i, (name, bucket)) in reported.iter().enumerate() {
        assert_eq!(name, "op");
        assert_eq!(bucket.interval_start, i as i64 * SECOND);
        assert_eq!(bucket.count, 1);
    }
}

#[test]
fn test_snapshots_serialize_to_json() {
    // The export boundary consumes Bucket values; a snapshot map must be
    // directly serializable without further adaptation.
    let recorder = Recorder::new(3, SECOND).unwrap();
    recorder.record(&Event::new("ok", 2_500, 1.5)).unwrap();
    recorder.record(&Event::new("fail", 2_500, 0.5)).unwrap();

    let json = serde_json::to_string(&recorder.all_snapshots()).unwrap();

    let parsed: std::collections::BTreeMap<String, Vec<serde_json::Value>> =
        serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed["ok"].len(), 3);
    assert_eq!(parsed["ok"][2]["count"], 1);
    assert_eq!(parsed["ok"][2]["interval_start"], 2_000);
}

#[test]
fn test_recorder_scenario_matrix() {
    // Negative trigger time fails without mutating; unknown names stay
    // empty; clear resets everything.
    let recorder = Recorder::new(10, SECOND).unwrap();

    assert!(recorder.record(&Event::new("op", -1, 1.0)).is_err());
    assert!(recorder.snapshot("op").is_empty());

    recorder.record(&Event::new("op", 1_000, 1.0)).unwrap();
    assert_eq!(recorder.snapshot("op").len(), 10);
    assert!(recorder.snapshot("other").is_empty());

    recorder.clear();
    assert!(recorder.names().is_empty());
}
