#![forbid(unsafe_code)]

//! Time sources and human-readable entry ages.
//!
//! Every history reads time through a [`Clock`] so tests can drive
//! timestamps deterministically with [`ManualClock`].

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Datelike, TimeDelta, Utc};

/// Source of wall-clock time for entry and branch timestamps.
pub trait Clock {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep a handle while
/// the history owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::from_millis(0)
    }
}

impl ManualClock {
    /// Create a clock frozen at `at`.
    #[must_use]
    pub fn new(at: DateTime<Utc>) -> Self {
        Self::from_millis(at.timestamp_millis())
    }

    /// Create a clock frozen at `millis` since the Unix epoch.
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(millis)),
        }
    }

    /// Move the clock by `by` (may be negative).
    pub fn advance(&self, by: TimeDelta) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::Relaxed);
    }

    /// Set the clock to an absolute time.
    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::Relaxed))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Describe how long ago `at` was, relative to `now`.
///
/// Produces `"Just now"`, `"5m ago"`, `"3h ago"`, `"2d ago"`, and falls back
/// to a short date (`"Mar 4"`, or `"Mar 4, 2023"` for another year) after a
/// week. Times in the future read as `"Just now"`.
#[must_use]
pub fn format_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);

    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "Just now".to_owned();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }

    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }

    let days = elapsed.num_days();
    if days < 7 {
        return format!("{days}d ago");
    }

    if at.year() == now.year() {
        at.format("%b %-d").to_string()
    } else {
        at.format("%b %-d, %Y").to_string()
    }
}
