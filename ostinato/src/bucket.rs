//! Bucket value types and the online-statistics math.
//!
//! A [`Bucket`] is an immutable statistical snapshot of one time window:
//! how many events fell into `[interval_start, interval_end)` and their
//! min/mean/max. Rings keep their live slots mutable ([`LiveBucket`]) for
//! O(1) in-place merging, but every bucket crossing the ring boundary —
//! snapshot entries, listener payloads — is an immutable copy, so callers
//! never observe partial mutation.
//!
//! The mean is maintained incrementally (`mean += (value - mean) / count`),
//! never by summation, which bounds numeric drift and avoids overflowing a
//! running sum at large counts. There are no overflow guards on the
//! accumulated statistics; that is a documented limitation.

use serde::{Deserialize, Serialize};

/// Immutable aggregate snapshot of one contiguous time window.
///
/// Interval bounds are milliseconds since the Unix epoch; the start is
/// inclusive, the end exclusive. An empty bucket (`count == 0`) reports
/// min/mean/max as `0.0` by convention, never NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Start of this bucket's interval (inclusive), ms since the epoch.
    pub interval_start: i64,

    /// End of this bucket's interval (exclusive), ms since the epoch.
    pub interval_end: i64,

    /// Number of events recorded within this interval.
    pub count: u64,

    /// Minimum value recorded within this interval. Only meaningful if
    /// `count > 0`.
    pub min: f64,

    /// Arithmetic mean of all values recorded in this interval. Only
    /// meaningful if `count > 0`.
    pub mean: f64,

    /// Maximum value recorded within this interval. Only meaningful if
    /// `count > 0`.
    pub max: f64,
}

impl Bucket {
    /// Creates an empty bucket stamped with the given interval bounds.
    ///
    /// Used to extrapolate windows that hold no retained data.
    pub(crate) fn empty(interval_start: i64, interval_end: i64) -> Self {
        Self {
            interval_start,
            interval_end,
            count: 0,
            min: 0.0,
            mean: 0.0,
            max: 0.0,
        }
    }

    /// Returns whether no events were recorded in this interval.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Width of this bucket's interval in milliseconds.
    pub fn width(&self) -> i64 {
        self.interval_end - self.interval_start
    }
}

/// Mutable in-place aggregate for a ring's live slot.
///
/// Not shared outside the owning ring's lock; see [`Bucket`] for the
/// boundary-crossing copy.
#[derive(Debug)]
pub(crate) struct LiveBucket {
    interval_start: i64,
    interval_end: i64,
    count: u64,
    min: f64,
    mean: f64,
    max: f64,
}

impl LiveBucket {
    /// Creates a bucket for `[interval_start, interval_end)` seeded with one
    /// event value.
    pub(crate) fn seeded(interval_start: i64, interval_end: i64, value: f64) -> Self {
        Self {
            interval_start,
            interval_end,
            count: 1,
            min: value,
            mean: value,
            max: value,
        }
    }

    /// Merges one more event value into this bucket.
    pub(crate) fn record(&mut self, value: f64) {
        self.count += 1;

        if value < self.min {
            self.min = value;
        } else if value > self.max {
            self.max = value;
        }

        #[allow(clippy::cast_precision_loss)] // counts large enough to lose precision dwarf any real load
        let count = self.count as f64;
        self.mean += (value - self.mean) / count;
    }

    pub(crate) fn interval_start(&self) -> i64 {
        self.interval_start
    }

    pub(crate) fn interval_end(&self) -> i64 {
        self.interval_end
    }

    /// Returns an immutable copy of the current aggregate.
    pub(crate) fn snapshot(&self) -> Bucket {
        Bucket {
            interval_start: self.interval_start,
            interval_end: self.interval_end,
            count: self.count,
            min: self.min,
            mean: self.mean,
            max: self.max,
        }
    }
}
