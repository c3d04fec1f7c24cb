//! Time-of-day values and half-open time ranges.
//!
//! # Time Model
//! A day-view Gantt chart only needs wall-clock minutes. `ClockTime` counts
//! minutes after midnight in `0..=1440`; `24:00` exists so that a range can
//! end exactly at the end of the day (`endHour = 24`).
//!
//! Ranges are half-open: `[start, end)` includes start and excludes end,
//! so a slot ending at 09:30 and one starting at 09:30 do not overlap.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A wall-clock time of day with minute resolution.
///
/// Serialized as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

/// Error returned when a string is not a valid `HH:MM` time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time of day `{0}`, expected HH:MM between 00:00 and 24:00")]
pub struct ParseClockTimeError(pub String);

impl ClockTime {
    /// 00:00.
    pub const MIDNIGHT: ClockTime = ClockTime(0);
    /// 24:00, the exclusive end of a day.
    pub const END_OF_DAY: ClockTime = ClockTime(MINUTES_PER_DAY as u16);

    /// Creates a time from minutes after midnight.
    ///
    /// Returns `None` past 24:00.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(Self(minutes as u16))
    }

    /// Creates a time from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if minute >= 60 {
            return None;
        }
        Self::from_minutes(hour.checked_mul(60)?.checked_add(minute)?)
    }

    /// Like [`ClockTime::from_minutes`], clamping into `00:00..=24:00`.
    pub fn saturating_from_minutes(minutes: i64) -> Self {
        Self(minutes.clamp(0, MINUTES_PER_DAY as i64) as u16)
    }

    /// Minutes after midnight.
    #[inline]
    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }

    #[inline]
    pub fn hour(self) -> u32 {
        self.minutes() / 60
    }

    #[inline]
    pub fn minute(self) -> u32 {
        self.minutes() % 60
    }

    /// Adds a signed number of minutes, returning `None` outside the day.
    pub fn checked_add_minutes(self, delta: i64) -> Option<Self> {
        let total = i64::from(self.0).checked_add(delta)?;
        if (0..=i64::from(MINUTES_PER_DAY)).contains(&total) {
            Some(Self(total as u16))
        } else {
            None
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ParseClockTimeError;

    /// Parses `H:MM` or `HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseClockTimeError(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(err)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(err());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let hour: u32 = h.parse().map_err(|_| err())?;
        let minute: u32 = m.parse().map_err(|_| err())?;
        Self::from_hm(hour, minute).ok_or_else(err)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A time-of-day interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Interval start (inclusive).
    pub start: ClockTime,
    /// Interval end (exclusive).
    pub end: ClockTime,
}

impl TimeRange {
    /// Creates a new range. Does not check `start < end`.
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    /// Whether the range covers no time at all (`end <= start`).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Length in minutes (0 for empty ranges).
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    /// Whether a time falls within this range.
    #[inline]
    pub fn contains(&self, time: ClockTime) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether `other` lies entirely inside this range.
    pub fn covers(&self, other: &Self) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Whether two ranges overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
