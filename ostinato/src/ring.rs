//! Round-robin ring of aggregate buckets for a single event name.
//!
//! This is the core of the engine: a fixed-size circular array of bucket
//! slots addressed by time rather than by insertion order. Each slot covers
//! a window of `bucket_width` milliseconds; the physical slot for a
//! timestamp `t` is `(t / width) mod count`, identical for any timestamp
//! regardless of arrival order. As time advances, slots are reused for
//! newer disjoint windows, evicting whatever they held.
//!
//! # Design
//!
//! - Slot computation: `slot_index = (t / bucket_width) % bucket_count`
//! - At most `bucket_count` distinct, non-overlapping windows are retained
//! - A `newest_slot` pointer tracks the latest window begun so far; when it
//!   advances, the previously newest bucket is reported to an optional
//!   [`BucketListener`]
//! - Snapshots synthesize empty, correctly-stamped buckets for windows with
//!   no retained data ("extrapolation")
//!
//! # Thread Safety
//!
//! One coarse mutex guards the slot array and the newest-slot pointer.
//! `record` holds it for O(1) work, `snapshot` for O(N) while copying.
//! Listener callbacks are invoked strictly after the lock is released, so a
//! slow listener cannot block producers. Within one ring all mutations are
//! totally ordered by lock acquisition; nothing relates that order to event
//! trigger-time order.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::bucket::{Bucket, LiveBucket};
use crate::error::{ConfigError, RecordError, Result};
use crate::event::Event;
use crate::listener::BucketListener;

/// Validates ring geometry shared by [`Ring`] and the recorder.
pub(crate) fn validate_geometry(bucket_count: usize, bucket_width_ms: i64) -> Result<()> {
    if bucket_count == 0 {
        return Err(ConfigError::InvalidBucketCount.into());
    }
    if bucket_width_ms <= 0 {
        return Err(ConfigError::InvalidBucketWidth {
            width_ms: bucket_width_ms,
        }
        .into());
    }
    Ok(())
}

/// Fixed-size circular buffer of aggregate buckets for one event name.
///
/// Usually created and owned by a [`Recorder`](crate::Recorder); standalone
/// construction is public for callers that manage their own dispatch.
pub struct Ring {
    name: String,
    bucket_count: usize,
    bucket_width: i64,
    listener: Option<Arc<dyn BucketListener>>,
    state: Mutex<RingState>,
}

/// All shared mutable data, guarded by the ring's single lock.
struct RingState {
    slots: Box<[Option<LiveBucket>]>,
    newest_slot: Option<usize>,
}

impl RingState {
    /// Advances the newest-slot pointer to `target` if the bucket there
    /// begins a later window than the current newest, returning a copy of
    /// the bucket that was previously newest.
    ///
    /// This is an optimistic "a later window has begun" signal, not a
    /// finalization guarantee.
    fn advance_newest(&mut self, target: usize) -> Option<Bucket> {
        let target_start = self.slots[target].as_ref().map(LiveBucket::interval_start)?;

        if let Some(newest) = self.newest_slot
            && let Some(newest_bucket) = self.slots[newest].as_ref()
        {
            if target_start <= newest_bucket.interval_start() {
                return None;
            }
            let previous = newest_bucket.snapshot();
            self.newest_slot = Some(target);
            return Some(previous);
        }

        self.newest_slot = Some(target);
        None
    }
}

impl Ring {
    /// Creates a ring of `bucket_count` slots, each `bucket_width_ms` wide.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `bucket_count` is zero or
    /// `bucket_width_ms` is not positive.
    pub fn new(name: impl Into<String>, bucket_count: usize, bucket_width_ms: i64) -> Result<Self> {
        validate_geometry(bucket_count, bucket_width_ms)?;
        Ok(Self::from_parts(
            name.into(),
            bucket_count,
            bucket_width_ms,
            None,
        ))
    }

    /// Creates a ring that reports superseded buckets to `listener`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `bucket_count` is zero or
    /// `bucket_width_ms` is not positive.
    pub fn with_listener(
        name: impl Into<String>,
        bucket_count: usize,
        bucket_width_ms: i64,
        listener: Arc<dyn BucketListener>,
    ) -> Result<Self> {
        validate_geometry(bucket_count, bucket_width_ms)?;
        Ok(Self::from_parts(
            name.into(),
            bucket_count,
            bucket_width_ms,
            Some(listener),
        ))
    }

    /// Constructs a ring whose geometry has already been validated.
    pub(crate) fn from_parts(
        name: String,
        bucket_count: usize,
        bucket_width: i64,
        listener: Option<Arc<dyn BucketListener>>,
    ) -> Self {
        debug_assert!(bucket_count > 0 && bucket_width > 0);

        let mut slots = Vec::with_capacity(bucket_count);
        slots.resize_with(bucket_count, || None);

        Self {
            name,
            bucket_count,
            bucket_width,
            listener,
            state: Mutex::new(RingState {
                slots: slots.into_boxed_slice(),
                newest_slot: None,
            }),
        }
    }

    /// Returns the event name this ring aggregates.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of bucket slots.
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Returns the bucket width in milliseconds.
    pub fn bucket_width(&self) -> i64 {
        self.bucket_width
    }

    /// Records one event into the slot its trigger time maps to.
    ///
    /// An empty slot is seeded with the event's window; a slot holding an
    /// older disjoint window is discarded and reseeded (the round-robin
    /// overwrite); an event older than the slot's current window is dropped
    /// silently; an event inside the slot's window is merged in place.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NegativeTriggerTime`] for events before the
    /// epoch; no state is changed in that case.
    pub fn record(&self, event: &Event) -> Result<()> {
        let t = event.trigger_time;
        if t < 0 {
            return Err(RecordError::NegativeTriggerTime { trigger_time: t }.into());
        }

        let window_start = t / self.bucket_width * self.bucket_width;
        let window_end = window_start + self.bucket_width;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // bounded by bucket_count
        let slot = ((t / self.bucket_width) % self.bucket_count as i64) as usize;

        let superseded = {
            let mut state = self.lock_state();

            match &mut state.slots[slot] {
                None => {
                    state.slots[slot] =
                        Some(LiveBucket::seeded(window_start, window_end, event.value));
                }
                Some(bucket) if bucket.interval_end() < t => {
                    // Slot content is at least one full ring cycle old.
                    *bucket = LiveBucket::seeded(window_start, window_end, event.value);
                }
                Some(bucket) if bucket.interval_start() > t => {
                    tracing::trace!(
                        name = %self.name,
                        trigger_time = t,
                        "dropping event outside retained horizon"
                    );
                    return Ok(());
                }
                Some(bucket) => bucket.record(event.value),
            }

            state.advance_newest(slot)
        };

        if let (Some(bucket), Some(listener)) = (superseded, self.listener.as_deref()) {
            listener.superseded_bucket(&self.name, bucket);
        }

        Ok(())
    }

    /// Returns the ring's current window as immutable buckets, oldest first.
    ///
    /// The result has exactly `bucket_count` contiguous buckets ending at
    /// the newest bucket's interval end, with unpopulated windows
    /// synthesized as empty. If no event was ever recorded, the result is
    /// empty — use [`snapshot_at`](Self::snapshot_at) to force extrapolation.
    pub fn snapshot(&self) -> Vec<Bucket> {
        let state = self.lock_state();

        let last_start = state
            .newest_slot
            .and_then(|newest| state.slots[newest].as_ref())
            .map(LiveBucket::interval_start);

        match last_start {
            Some(last_start) => self.collect_windows(&state, last_start),
            None => Vec::new(),
        }
    }

    /// Returns exactly `bucket_count` contiguous buckets where the last
    /// window contains `as_of`, oldest first.
    ///
    /// Windows holding no retained data — never populated, evicted, or
    /// outside the ring's current range — come back as empty buckets with
    /// correct bounds. Unlike [`snapshot`](Self::snapshot), this
    /// extrapolates even on a ring that never received an event, which is
    /// useful to display a sliding window ending "now" when nothing was
    /// recorded recently.
    pub fn snapshot_at(&self, as_of: i64) -> Vec<Bucket> {
        let state = self.lock_state();
        let last_start = as_of.div_euclid(self.bucket_width) * self.bucket_width;
        self.collect_windows(&state, last_start)
    }

    /// Copies out the `bucket_count` windows ending at
    /// `[last_start, last_start + width)`.
    fn collect_windows(&self, state: &RingState, last_start: i64) -> Vec<Bucket> {
        let width = self.bucket_width;
        let count = self.bucket_count as i64;
        let first_start = last_start - (count - 1) * width;

        let mut buckets = Vec::with_capacity(self.bucket_count);
        for i in 0..count {
            let window_start = first_start + i * width;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // bounded by bucket_count
            let slot = window_start.div_euclid(width).rem_euclid(count) as usize;

            let bucket = match state.slots[slot].as_ref() {
                Some(live) if live.interval_start() == window_start => live.snapshot(),
                _ => Bucket::empty(window_start, window_start + width),
            };
            buckets.push(bucket);
        }
        buckets
    }

    /// Acquires the state lock.
    ///
    /// Slot mutations are plain arithmetic with no intermediate invalid
    /// states, so data behind a poisoned lock is still consistent.
    fn lock_state(&self) -> std::sync::MutexGuard<'_, RingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ring")
            .field("name", &self.name)
            .field("bucket_count", &self.bucket_count)
            .field("bucket_width", &self.bucket_width)
            .field("has_listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}
