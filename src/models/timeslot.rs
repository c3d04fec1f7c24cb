//! Timeslot model.
//!
//! A timeslot is a bookable interval of one professional's day. Besides the
//! typed fields it carries an opaque map of extra fields supplied by the host
//! (clinic, specialty, resource codes, ...). Those are copied through every
//! transformation untouched and echoed back in change events.
//!
//! # Wire Shape
//! ```json
//! {"id": 1, "professionalId": 1, "date": "2025-03-14",
//!  "start": "09:00", "end": "09:30", "bookingProbability": 0.5,
//!  "isBooked": false, "clinic": "North"}
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{ClockTime, ProfessionalId, TimeRange};

/// Timeslot identifier.
pub type TimeslotId = i64;

/// Booking probability used when the host supplies none.
pub const DEFAULT_BOOKING_PROBABILITY: f64 = 0.5;

fn default_booking_probability() -> f64 {
    DEFAULT_BOOKING_PROBABILITY
}

/// Reads an optional probability; `null` means the default.
fn deserialize_probability<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(DEFAULT_BOOKING_PROBABILITY))
}

/// Clamps a probability into `[0, 1]`. NaN falls back to the default.
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        DEFAULT_BOOKING_PROBABILITY
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// A stored timeslot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeslot {
    /// Unique timeslot identifier.
    pub id: TimeslotId,
    /// Owning professional.
    pub professional_id: ProfessionalId,
    /// Calendar date.
    pub date: NaiveDate,
    /// Start time (inclusive).
    pub start: ClockTime,
    /// End time (exclusive).
    pub end: ClockTime,
    /// Predicted probability that the slot gets booked (0.0..=1.0).
    #[serde(
        default = "default_booking_probability",
        deserialize_with = "deserialize_probability"
    )]
    pub booking_probability: f64,
    /// Booked slots are locked against editing gestures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_booked: Option<bool>,
    /// Host-defined fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Timeslot {
    /// Creates an unbooked timeslot with the default probability.
    pub fn new(
        id: TimeslotId,
        professional_id: ProfessionalId,
        date: NaiveDate,
        start: ClockTime,
        end: ClockTime,
    ) -> Self {
        Self {
            id,
            professional_id,
            date,
            start,
            end,
            booking_probability: DEFAULT_BOOKING_PROBABILITY,
            is_booked: None,
            extra: Map::new(),
        }
    }

    /// Sets the booking probability (clamped).
    pub fn with_probability(mut self, p: f64) -> Self {
        self.booking_probability = clamp_probability(p);
        self
    }

    /// Sets the booked flag.
    pub fn with_booked(mut self, booked: bool) -> Self {
        self.is_booked = Some(booked);
        self
    }

    /// Adds a host-defined field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// The `[start, end)` interval.
    #[inline]
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.range().duration_minutes()
    }

    /// Whether the slot is locked against gestures.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.is_booked.unwrap_or(false)
    }

    /// Whether two timeslots collide: same professional, same date,
    /// overlapping intervals.
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.professional_id == other.professional_id
            && self.date == other.date
            && self.range().overlaps(&other.range())
    }
}

/// A request to create a timeslot; the model assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRequest {
    /// Owning professional.
    pub professional_id: ProfessionalId,
    /// Calendar date. `None` = the display window's date.
    pub date: Option<NaiveDate>,
    /// Start time (inclusive).
    pub start: ClockTime,
    /// End time (exclusive).
    pub end: ClockTime,
    /// Initial booking probability. `None` = default.
    pub booking_probability: Option<f64>,
    /// Host-defined fields.
    pub extra: Map<String, Value>,
}

impl SlotRequest {
    /// Creates a request on the window's date.
    pub fn new(professional_id: ProfessionalId, start: ClockTime, end: ClockTime) -> Self {
        Self {
            professional_id,
            date: None,
            start,
            end,
            booking_probability: None,
            extra: Map::new(),
        }
    }

    /// Places the request on an explicit date.
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the initial booking probability.
    pub fn with_probability(mut self, p: f64) -> Self {
        self.booking_probability = Some(p);
        self
    }

    /// Adds a host-defined field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// The requested `[start, end)` interval.
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}
