//! Callback port for bucket-transition notifications.

use crate::bucket::Bucket;

/// Callback interface for listeners interested in bucket transitions.
///
/// A transition occurs when a newer event begins a window that the ring's
/// latest bucket does not include, superseding it. A typical consumer is a
/// logging or metrics sink that wants a stream of "this window is (probably)
/// done" aggregates without polling snapshots.
///
/// # Delivery contract
///
/// This is strictly best-effort, at-least-zero notification:
///
/// - A reported bucket is not guaranteed to be finished. Events may arrive
///   out of trigger-time order, so a superseded bucket can still be updated
///   afterwards. If your events arrive in an order only weakly correlated
///   with their trigger times (widely distributed producers, long buffering),
///   this callback is probably not useful to you.
/// - The last bucket of a ring's lifetime may never be reported; the
///   callback only fires once a later window has begun.
/// - Delivery order across slots is not guaranteed to follow wall-clock
///   order.
///
/// # Execution context
///
/// The callback runs on the recording producer's thread, after the ring's
/// lock has been released. It should return quickly — for complex processing,
/// copy the bucket to a queue drained by another thread — and must not panic.
pub trait BucketListener: Send + Sync {
    /// Called when `name`'s newest bucket has been superseded by a later
    /// window. `bucket` is an immutable copy of the superseded aggregate.
    fn superseded_bucket(&self, name: &str, bucket: Bucket);
}
