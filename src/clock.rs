//! Stream time.
//!
//! [`ClockTime`] is the unit every position, duration and seek target is
//! expressed in. Unknown values are `Option<ClockTime>`, never a sentinel.
//! Arithmetic saturates: stream time does not go below zero.

use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Nanosecond stream timestamp.
///
/// Displays like a player position, `H:MM:SS.mmm`:
///
/// ```rust
/// use playctl::clock::ClockTime;
///
/// let pos = ClockTime::from_secs(62) + ClockTime::from_millis(250);
/// assert_eq!(pos.to_string(), "0:01:02.250");
/// assert_eq!(pos.secs(), 62);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ClockTime(u64);

impl ClockTime {
    /// Start of the stream.
    pub const ZERO: Self = Self(0);

    /// Latest representable time.
    pub const MAX: Self = Self(u64::MAX);

    /// From nanoseconds.
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// From milliseconds.
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(NANOS_PER_MILLI))
    }

    /// From seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(NANOS_PER_SEC))
    }

    /// Nanoseconds.
    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// Whole milliseconds.
    pub const fn millis(self) -> u64 {
        self.0 / NANOS_PER_MILLI
    }

    /// Whole seconds.
    pub const fn secs(self) -> u64 {
        self.0 / NANOS_PER_SEC
    }

    /// `self` advanced by `elapsed` wall time played at `rate`.
    pub fn advanced(self, elapsed: Duration, rate: f64) -> Self {
        self + Self::from(elapsed.mul_f64(rate.max(0.0)))
    }
}

impl Add for ClockTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for ClockTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl From<Duration> for ClockTime {
    fn from(d: Duration) -> Self {
        Self(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
    }
}

impl From<ClockTime> for Duration {
    fn from(t: ClockTime) -> Self {
        Duration::from_nanos(t.0)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.secs();
        write!(
            f,
            "{}:{:02}:{:02}.{:03}",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60,
            self.millis() % 1000
        )
    }
}
