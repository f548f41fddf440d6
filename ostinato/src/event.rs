//! Event value type and timing helpers.
//!
//! An [`Event`] is the unit of input for the aggregation engine: a name, a
//! trigger time in milliseconds since the Unix epoch, and a scalar value.
//! Events carry no identity — many events collapse into one bucket.
//!
//! [`Timer`] is a convenience for the most common kind of event, an elapsed
//! duration: capture a [`Timer`] before an operation and `stop()` it after
//! to obtain an `Event` whose value is the elapsed time in fractional
//! milliseconds and whose trigger time is the completion instant.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// An immutable unit of input: something that happened, when, and a value.
///
/// The trigger time is the customary "milliseconds since 1970". Negative
/// trigger times are representable but rejected by the write path; the value
/// may be any `f64`, finite or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Identifier for a kind/type/category of event. Example: `"OK"` for
    /// successful requests, `"FAIL"` for failed ones. Events are aggregated
    /// per distinct name.
    pub name: String,

    /// The time instant associated with this event, in milliseconds since
    /// the Unix epoch.
    pub trigger_time: i64,

    /// Scalar measurement attached to this event, e.g. an execution time.
    pub value: f64,
}

impl Event {
    /// Creates an event with an explicit trigger time.
    pub fn new(name: impl Into<String>, trigger_time: i64, value: f64) -> Self {
        Self {
            name: name.into(),
            trigger_time,
            value,
        }
    }

    /// Creates an event stamped with the current wall-clock time.
    pub fn now(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, current_millis(), value)
    }
}

/// Records the instant of its creation and turns it into a duration event.
///
/// ```rust
/// use ostinato::Timer;
///
/// let timer = Timer::start();
/// // ... do the work being measured ...
/// let event = timer.stop("db.query");
/// assert!(event.value >= 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    started: Instant,
}

impl Timer {
    /// Starts a timer at the current instant.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Stops the timer, producing an [`Event`] named `name`.
    ///
    /// The event's trigger time is the wall-clock completion time and its
    /// value is the elapsed time in fractional milliseconds, measured on the
    /// monotonic clock.
    pub fn stop(self, name: impl Into<String>) -> Event {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1_000.0;
        Event::new(name, current_millis(), elapsed_ms)
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[allow(clippy::cast_possible_truncation)] // millis since 1970 fit in i64 for ~292 million years
fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_construction() {
        let event = Event::new("requests", 1_700_000_000_000, 42.5);
        assert_eq!(event.name, "requests");
        assert_eq!(event.trigger_time, 1_700_000_000_000);
        assert_eq!(event.value, 42.5);
    }

    #[test]
    fn test_event_now_uses_wall_clock() {
        let before = current_millis();
        let event = Event::now("requests", 1.0);
        let after = current_millis();

        assert!(event.trigger_time >= before);
        assert!(event.trigger_time <= after);
    }

    #[test]
    fn test_timer_produces_duration_event() {
        let timer = Timer::start();
        let event = timer.stop("op");

        assert_eq!(event.name, "op");
        assert!(event.value >= 0.0);
        assert!(event.trigger_time > 0);
    }
}
