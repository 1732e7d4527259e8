//! The benchmark's source of time.

use core::fmt::Debug;
use core::time::Duration;
use std::time::Instant;

/// Number of clock ticks in one microsecond.  A tick is one nanosecond.
pub const TICKS_PER_MICROSECOND: u64 = 1_000;

/// An object that provides monotonic timestamps.
///
/// Workers share one clock, so implementations must be callable from many
/// threads at once.
pub trait MonotonicClock: Debug + Send + Sync {
    /// Returns the current point in time.
    ///
    /// Successive calls on the same thread never go backwards.
    fn now(&self) -> Timestamp;
}

/// A point in time, measured from an arbitrary origin fixed by the clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(Duration);

impl Timestamp {
    /// Makes a timestamp `since` the clock's origin.
    pub const fn from_origin(since: Duration) -> Self {
        Self(since)
    }

    /// The time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    pub fn duration_since(self, earlier: Self) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

/// Converts `duration` to whole ticks, saturating at `u64::MAX`.
pub fn duration_to_ticks(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Adds up `durations`, saturating rather than overflowing.
pub fn sum_durations<'a>(durations: impl IntoIterator<Item = &'a Duration>) -> Duration {
    durations
        .into_iter()
        .fold(Duration::ZERO, |acc, d| acc.saturating_add(*d))
}

/// Default `MonotonicClock` implementation that uses [`Instant`].
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Starts a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.origin.elapsed())
    }
}
