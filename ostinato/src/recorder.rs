//! Per-name dispatch table over round-robin rings.
//!
//! The [`Recorder`] is the top-level API: it accepts [`Event`]s from any
//! number of producer threads, routes each one to the ring for its name —
//! lazily and exactly-once creating rings on first use — and fans read
//! operations out to the per-name rings.
//!
//! # Design
//!
//! The name table is a concurrent map supporting reads concurrent with
//! writes. Ring creation goes through the map's atomic entry primitive, so
//! concurrent first-time records for an unseen name converge on exactly one
//! ring instance without a lookup-then-insert race or retry loop. Once
//! created, a ring is never replaced; only `clear()` drops the table.
//!
//! # Example
//!
//! ```rust
//! use ostinato::{Event, Recorder, SECOND};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let recorder = Recorder::new(60, SECOND)?;
//!
//! recorder.record(&Event::new("requests.ok", 1_700_000_000_000, 12.5))?;
//! recorder.record(&Event::new("requests.ok", 1_700_000_000_250, 8.0))?;
//!
//! let buckets = recorder.snapshot("requests.ok");
//! assert_eq!(buckets.len(), 60);
//! assert_eq!(buckets.last().unwrap().count, 2);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::bucket::Bucket;
use crate::error::Result;
use crate::event::Event;
use crate::listener::BucketListener;
use crate::ring::{Ring, validate_geometry};

/// One second in milliseconds.
pub const SECOND: i64 = 1_000;
/// One minute in milliseconds.
pub const MINUTE: i64 = 60 * SECOND;
/// One hour in milliseconds.
pub const HOUR: i64 = 60 * MINUTE;
/// One day in milliseconds.
pub const DAY: i64 = 24 * HOUR;

/// Default number of buckets per ring (one day of hourly buckets).
pub const DEFAULT_BUCKET_COUNT: usize = 24;
/// Default bucket width in milliseconds.
pub const DEFAULT_BUCKET_WIDTH: i64 = HOUR;

/// Aggregates events by name into fixed-size circular buffers, providing a
/// constantly updated view of a time window reaching from "now" (the newest
/// recorded event) into the past.
///
/// All operations are safe to call from many threads concurrently; see the
/// module docs for the concurrency scheme.
pub struct Recorder {
    bucket_count: usize,
    bucket_width: i64,
    listener: Option<Arc<dyn BucketListener>>,
    rings: DashMap<String, Arc<Ring>>,
}

impl Recorder {
    /// Creates a recorder whose rings have `bucket_count` slots of
    /// `bucket_width_ms` each.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::error::ConfigError) if `bucket_count`
    /// is zero or `bucket_width_ms` is not positive.
    pub fn new(bucket_count: usize, bucket_width_ms: i64) -> Result<Self> {
        validate_geometry(bucket_count, bucket_width_ms)?;
        Ok(Self {
            bucket_count,
            bucket_width: bucket_width_ms,
            listener: None,
            rings: DashMap::new(),
        })
    }

    /// Creates a recorder that reports superseded buckets to `listener`.
    ///
    /// The listener is shared by every ring this recorder creates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::error::ConfigError) if `bucket_count`
    /// is zero or `bucket_width_ms` is not positive.
    pub fn with_listener(
        bucket_count: usize,
        bucket_width_ms: i64,
        listener: Arc<dyn BucketListener>,
    ) -> Result<Self> {
        validate_geometry(bucket_count, bucket_width_ms)?;
        Ok(Self {
            bucket_count,
            bucket_width: bucket_width_ms,
            listener: Some(listener),
            rings: DashMap::new(),
        })
    }

    /// Returns the number of bucket slots per ring.
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Returns the bucket width in milliseconds.
    pub fn bucket_width(&self) -> i64 {
        self.bucket_width
    }

    /// Records an event into the ring for its name, creating the ring on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`](crate::error::RecordError) if the event's
    /// trigger time is negative; no state is changed in that case.
    pub fn record(&self, event: &Event) -> Result<()> {
        let ring = match self.rings.get(&event.name) {
            Some(ring) => Arc::clone(&ring),
            None => self.ring_for(&event.name),
        };
        ring.record(event)
    }

    /// Gets or atomically creates the ring for `name`.
    fn ring_for(&self, name: &str) -> Arc<Ring> {
        let entry = self.rings.entry(name.to_string()).or_insert_with(|| {
            tracing::debug!(name, "creating ring on first use");
            Arc::new(Ring::from_parts(
                name.to_string(),
                self.bucket_count,
                self.bucket_width,
                self.listener.clone(),
            ))
        });
        Arc::clone(entry.value())
    }

    /// Returns `name`'s buckets in chronological order, the last bucket
    /// holding the newest recorded event.
    ///
    /// For an unknown name the result is empty, not an error. Otherwise it
    /// always has exactly [`bucket_count`](Self::bucket_count) buckets.
    pub fn snapshot(&self, name: &str) -> Vec<Bucket> {
        match self.rings.get(name) {
            Some(ring) => ring.snapshot(),
            None => Vec::new(),
        }
    }

    /// Returns `name`'s buckets in chronological order, the last bucket's
    /// interval containing `as_of`; windows not covered by the ring are
    /// extrapolated as empty buckets.
    ///
    /// Useful to display a sliding window ending at the current time even
    /// if no events were recorded recently. For an unknown name the result
    /// is empty, not an error.
    pub fn snapshot_at(&self, name: &str, as_of: i64) -> Vec<Bucket> {
        match self.rings.get(name) {
            Some(ring) => ring.snapshot_at(as_of),
            None => Vec::new(),
        }
    }

    /// Returns snapshots for every known name, in ascending name order.
    pub fn all_snapshots(&self) -> BTreeMap<String, Vec<Bucket>> {
        self.rings
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().snapshot()))
            .collect()
    }

    /// Returns [`snapshot_at`](Self::snapshot_at) results for every known
    /// name, in ascending name order.
    pub fn all_snapshots_at(&self, as_of: i64) -> BTreeMap<String, Vec<Bucket>> {
        self.rings
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().snapshot_at(as_of)))
            .collect()
    }

    /// Returns all names observed since creation or the last
    /// [`clear`](Self::clear), in ascending order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rings.iter().map(|e| e.key().clone()).collect();
        names.sort_unstable();
        names
    }

    /// Forgets everything recorded so far; subsequent records rebuild rings
    /// from scratch.
    pub fn clear(&self) {
        tracing::debug!("clearing all rings");
        self.rings.clear();
    }
}

impl Default for Recorder {
    /// A recorder with [`DEFAULT_BUCKET_COUNT`] buckets of
    /// [`DEFAULT_BUCKET_WIDTH`] each.
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            bucket_width: DEFAULT_BUCKET_WIDTH,
            listener: None,
            rings: DashMap::new(),
        }
    }
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("bucket_count", &self.bucket_count)
            .field("bucket_width", &self.bucket_width)
            .field("has_listener", &self.listener.is_some())
            .field("names", &self.rings.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const T0: i64 = 1_700_000_000_000;

    #[derive(Default)]
    struct CountingListener {
        names: Mutex<Vec<String>>,
    }

    impl BucketListener for CountingListener {
        fn superseded_bucket(&self, name: &str, _bucket: Bucket) {
            self.names.lock().unwrap().push(name.to_string());
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(Recorder::new(0, 100).is_err());
        assert!(Recorder::new(10, 0).is_err());
        assert!(Recorder::new(10, -1).is_err());
    }

    #[test]
    fn test_unknown_name_yields_empty_results() {
        let recorder = Recorder::default();

        assert!(recorder.snapshot("quaxi").is_empty());
        assert!(recorder.snapshot_at("quaxi", T0).is_empty());
        assert!(recorder.names().is_empty());
        assert!(recorder.all_snapshots().is_empty());
    }

    #[test]
    fn test_names_are_sorted() {
        let recorder = Recorder::new(24, HOUR).unwrap();
        recorder.record(&Event::new("B", T0, 0.0)).unwrap();
        recorder.record(&Event::new("A", T0, 0.0)).unwrap();
        recorder.record(&Event::new("C", T0, 0.0)).unwrap();

        assert_eq!(recorder.names(), ["A", "B", "C"]);
    }

    #[test]
    fn test_records_separate_names_independently() {
        let recorder = Recorder::new(24, HOUR).unwrap();

        recorder.record(&Event::new("one", T0, 1.0)).unwrap();
        recorder.record(&Event::new("one", T0, 3.0)).unwrap();
        recorder.record(&Event::new("two", T0, 2.0)).unwrap();

        let one = recorder.snapshot("one");
        let two = recorder.snapshot("two");

        assert_eq!(one.last().unwrap().count, 2);
        assert_eq!(one.last().unwrap().max, 3.0);
        assert_eq!(two.last().unwrap().count, 1);
        assert_eq!(two.last().unwrap().mean, 2.0);
    }

    #[test]
    fn test_all_snapshots_cover_every_name() {
        let recorder = Recorder::new(24, HOUR).unwrap();
        recorder.record(&Event::new("b", T0, 0.0)).unwrap();
        recorder.record(&Event::new("a", T0, 0.0)).unwrap();

        let all = recorder.all_snapshots();
        assert_eq!(all.len(), 2);
        assert_eq!(all.keys().cloned().collect::<Vec<_>>(), ["a", "b"]);
        assert!(all.values().all(|buckets| buckets.len() == 24));

        let all_at = recorder.all_snapshots_at(T0 + DAY);
        assert_eq!(all_at.len(), 2);
        assert!(all_at.values().all(|buckets| buckets.len() == 24));
    }

    #[test]
    fn test_clear_forgets_history() {
        let recorder = Recorder::new(24, HOUR).unwrap();
        recorder.record(&Event::new("one", T0, 1.0)).unwrap();
        assert_eq!(recorder.snapshot("one").len(), 24);

        recorder.clear();
        assert!(recorder.snapshot("one").is_empty());
        assert!(recorder.names().is_empty());

        // Recording after clear rebuilds the ring from scratch.
        recorder.record(&Event::new("one", T0, 1.0)).unwrap();
        assert_eq!(recorder.snapshot("one").last().unwrap().count, 1);
    }

    #[test]
    fn test_listener_is_shared_across_rings() {
        let listener = Arc::new(CountingListener::default());
        let recorder =
            Recorder::with_listener(24, HOUR, Arc::clone(&listener) as _).unwrap();

        for name in ["one", "two"] {
            recorder.record(&Event::new(name, T0, 1.0)).unwrap();
            recorder.record(&Event::new(name, T0 + HOUR, 1.0)).unwrap();
        }

        let mut reported = listener.names.lock().unwrap().clone();
        reported.sort_unstable();
        assert_eq!(reported, ["one", "two"]);
    }

    #[test]
    fn test_default_geometry() {
        let recorder = Recorder::default();
        assert_eq!(recorder.bucket_count(), DEFAULT_BUCKET_COUNT);
        assert_eq!(recorder.bucket_width(), DEFAULT_BUCKET_WIDTH);

        recorder.record(&Event::new("x", T0, 1.0)).unwrap();
        assert_eq!(recorder.snapshot("x").len(), 24);
    }

    #[test]
    fn test_negative_time_does_not_create_state() {
        let recorder = Recorder::new(24, HOUR).unwrap();

        assert!(recorder.record(&Event::new("x", -5, 1.0)).is_err());

        // The ring was created by the lookup, but holds nothing.
        assert!(recorder.snapshot("x").is_empty());
    }
}
