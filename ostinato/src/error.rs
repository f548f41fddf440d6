//! Error types for the ostinato aggregation engine.

use thiserror::Error;

/// The main error type for all ostinato operations.
///
/// Errors are split by operation phase: configuration errors happen once at
/// construction time, record errors on the write path. The read path
/// (snapshots) never fails; absence of history yields empty results instead.
#[derive(Error, Debug)]
pub enum OstinatoError {
    /// Error validating ring or recorder configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error during a record operation (write path).
    #[error("record error: {0}")]
    Record(#[from] RecordError),
}

/// Errors that can occur when constructing a ring or recorder.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The requested number of buckets is zero.
    #[error("bucket count must be greater than 0")]
    InvalidBucketCount,

    /// The requested bucket width is zero or negative.
    #[error("bucket width must be greater than 0 ms, got {width_ms}")]
    InvalidBucketWidth {
        /// The rejected width in milliseconds.
        width_ms: i64,
    },
}

/// Errors that can occur during record operations (write path).
#[derive(Error, Debug)]
pub enum RecordError {
    /// The event's trigger time lies before the epoch.
    ///
    /// Negative times are rejected atomically: no bucket is touched.
    #[error("negative trigger time {trigger_time} ms is not supported")]
    NegativeTriggerTime {
        /// The rejected trigger time in milliseconds since the epoch.
        trigger_time: i64,
    },
}

/// Type alias for `Result<T, OstinatoError>`.
pub type Result<T> = std::result::Result<T, OstinatoError>;
