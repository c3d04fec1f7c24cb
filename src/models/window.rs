//! Display window model.
//!
//! The window is the slice of one day the chart shows and the granularity
//! of its columns. It is owned by the host and replaced wholesale; the
//! model validates it on entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ClockTime, TimeRange};
use crate::error::ScheduleError;

/// The visible day, hour range, and slot granularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayWindow {
    /// Day shown.
    pub date: NaiveDate,
    /// First visible hour (inclusive).
    pub start_hour: u32,
    /// Last visible hour (exclusive, at most 24).
    pub end_hour: u32,
    /// Column width in minutes.
    pub slot_duration: u32,
}

impl DisplayWindow {
    pub const DEFAULT_START_HOUR: u32 = 6;
    pub const DEFAULT_END_HOUR: u32 = 24;
    pub const DEFAULT_SLOT_DURATION: u32 = 5;

    /// Creates a window with the default 06:00-24:00 range and 5-minute slots.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            start_hour: Self::DEFAULT_START_HOUR,
            end_hour: Self::DEFAULT_END_HOUR,
            slot_duration: Self::DEFAULT_SLOT_DURATION,
        }
    }

    /// Sets the visible hour range.
    pub fn with_hours(mut self, start_hour: u32, end_hour: u32) -> Self {
        self.start_hour = start_hour;
        self.end_hour = end_hour;
        self
    }

    /// Sets the slot duration in minutes.
    pub fn with_slot_duration(mut self, minutes: u32) -> Self {
        self.slot_duration = minutes;
        self
    }

    /// Checks `0 <= start_hour < end_hour <= 24` and `slot_duration > 0`.
    ///
    /// A slot duration that does not divide the range is allowed; the
    /// layout leaves the remainder unrendered.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.end_hour > 24 {
            return Err(ScheduleError::InvalidWindow(format!(
                "end hour {} is past 24",
                self.end_hour
            )));
        }
        if self.start_hour >= self.end_hour {
            return Err(ScheduleError::InvalidWindow(format!(
                "start hour {} is not before end hour {}",
                self.start_hour, self.end_hour
            )));
        }
        if self.slot_duration == 0 {
            return Err(ScheduleError::InvalidWindow(
                "slot duration must be positive".to_string(),
            ));
        }
        if self.slot_duration > self.total_minutes() {
            return Err(ScheduleError::InvalidWindow(format!(
                "slot duration {} min exceeds the {}-minute window",
                self.slot_duration,
                self.total_minutes()
            )));
        }
        Ok(())
    }

    /// Window start as a time of day.
    pub fn start(&self) -> ClockTime {
        ClockTime::saturating_from_minutes(i64::from(self.start_hour) * 60)
    }

    /// Window end as a time of day.
    pub fn end(&self) -> ClockTime {
        ClockTime::saturating_from_minutes(i64::from(self.end_hour) * 60)
    }

    /// The configured `[start, end)` hour range.
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start(), self.end())
    }

    /// Minutes between start and end hour.
    pub fn total_minutes(&self) -> u32 {
        self.range().duration_minutes()
    }

    /// Number of whole columns (remainder minutes are dropped).
    pub fn column_count(&self) -> usize {
        if self.slot_duration == 0 {
            return 0;
        }
        (self.total_minutes() / self.slot_duration) as usize
    }

    /// Minutes at the end of the range that do not fill a whole column.
    pub fn remainder_minutes(&self) -> u32 {
        if self.slot_duration == 0 {
            return self.total_minutes();
        }
        self.total_minutes() % self.slot_duration
    }

    /// The part of the range covered by whole columns.
    pub fn rendered_range(&self) -> TimeRange {
        let covered = self.column_count() as i64 * i64::from(self.slot_duration);
        TimeRange::new(
            self.start(),
            ClockTime::saturating_from_minutes(i64::from(self.start().minutes()) + covered),
        )
    }

    /// Start time of a column. Columns past the end saturate at 24:00.
    pub fn column_start(&self, column: usize) -> ClockTime {
        let offset = column as i64 * i64::from(self.slot_duration);
        ClockTime::saturating_from_minutes(i64::from(self.start().minutes()) + offset)
    }

    /// Column containing `time`, if it is inside the rendered range.
    pub fn column_at(&self, time: ClockTime) -> Option<usize> {
        if self.slot_duration == 0 || !self.rendered_range().contains(time) {
            return None;
        }
        Some(((time.minutes() - self.start().minutes()) / self.slot_duration) as usize)
    }

    /// Rounds a time to the nearest column boundary, clamped to the window.
    ///
    /// Halfway points round up, matching how a drag snaps to the grid.
    pub fn snap(&self, time: ClockTime) -> ClockTime {
        if self.slot_duration == 0 {
            return time;
        }
        let rendered = self.rendered_range();
        let slot = i64::from(self.slot_duration);
        let offset = i64::from(time.minutes()) - i64::from(rendered.start.minutes());
        let snapped = (offset + slot / 2).div_euclid(slot) * slot;
        let max = i64::from(rendered.duration_minutes());
        ClockTime::saturating_from_minutes(
            i64::from(rendered.start.minutes()) + snapped.clamp(0, max),
        )
    }

    /// Whether a duration is a whole number of slot units.
    pub fn is_aligned(&self, minutes: u32) -> bool {
        self.slot_duration != 0 && minutes % self.slot_duration == 0
    }
}
