//! # ostinato
//!
//! In-process round-robin event aggregation engine.
//!
//! ostinato turns a stream of timestamped scalar events into a sliding
//! window of fixed-width time buckets per event name, with O(1) update cost
//! and bounded memory. Think rrdtool's round-robin storage philosophy
//! applied to live in-memory aggregation: instead of retaining raw samples,
//! each bucket keeps online count/min/mean/max statistics for its time
//! window, and a fixed-size ring of buckets per name overwrites itself as
//! time advances.
//!
//! ## Key Properties
//!
//! - O(1) record path, O(N) snapshot path, no allocation growth with load
//! - Bounded, predictable memory — size is determined by configuration,
//!   not event volume
//! - Tolerates out-of-order arrivals; too-old events are dropped, never
//!   corrupt newer buckets
//! - Safe for many producer threads and occasional readers; one coarse
//!   lock per name, an atomic get-or-create name table, no background
//!   threads
//! - Optional callback when a bucket's window is superseded by a newer one
//!
//! ## Quick Start
//!
//! ```rust
//! use ostinato::{Event, Recorder, SECOND};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 60 buckets of 1 second each: a sliding one-minute window.
//! let recorder = Recorder::new(60, SECOND)?;
//!
//! // Record events (hot path, callable from any thread).
//! recorder.record(&Event::new("requests.ok", 1_700_000_000_000, 12.5))?;
//! recorder.record(&Event::new("requests.ok", 1_700_000_000_400, 20.0))?;
//!
//! // Read back a window of aggregate buckets.
//! for bucket in recorder.snapshot("requests.ok") {
//!     if !bucket.is_empty() {
//!         println!(
//!             "[{}..{}) n={} min={} mean={} max={}",
//!             bucket.interval_start, bucket.interval_end,
//!             bucket.count, bucket.min, bucket.mean, bucket.max,
//!         );
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`Recorder`] — top-level handle; owns the name→ring table
//! - [`Ring`] — per-name circular buffer of bucket slots
//! - [`Bucket`] — immutable aggregate snapshot of one time window
//! - [`Event`] / [`Timer`] — input value type and duration convenience
//! - [`BucketListener`] — best-effort bucket-transition callback port
//!
//! ## Modules
//!
//! For lower-level access, the individual modules are also public:
//!
//! - [`recorder`] — per-name dispatch, duration constants
//! - [`ring`] — the round-robin ring
//! - [`bucket`] — bucket value types and online-statistics math
//! - [`event`] — event value type and timing helpers
//! - [`listener`] — bucket-transition callback contract
//! - [`error`] — error types

pub mod bucket;
pub mod error;
pub mod event;
pub mod listener;
pub mod recorder;
pub mod ring;

// Re-export primary API types at crate root for convenience.
pub use bucket::Bucket;
pub use error::{OstinatoError, Result};
pub use event::{Event, Timer};
pub use listener::BucketListener;
pub use recorder::{
    DAY, DEFAULT_BUCKET_COUNT, DEFAULT_BUCKET_WIDTH, HOUR, MINUTE, Recorder, SECOND,
};
pub use ring::Ring;
