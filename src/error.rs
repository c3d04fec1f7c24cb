//! Error types for schedule mutations and record loading.
//!
//! Every error is local and recoverable: a failed call leaves the model
//! exactly as it was, and the worst outcome for a session is a rejected edit.

use chrono::NaiveDate;

use crate::models::{ProfessionalId, TimeRange, TimeslotId};
use crate::validation::RecordError;

/// Result type for schedule operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Errors returned by the schedule model and the interaction controller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    /// Inbound records failed validation; one entry per bad record.
    #[error("{} invalid record(s){}", .0.len(), first_record_error(.0))]
    InvalidRecord(Vec<RecordError>),

    /// The candidate collides with an existing timeslot of the same
    /// professional on the same date.
    #[error("{range} overlaps timeslot {existing} of professional {professional_id} on {date}")]
    Overlap {
        professional_id: ProfessionalId,
        date: NaiveDate,
        range: TimeRange,
        existing: TimeslotId,
    },

    /// The candidate falls outside the display window's hour range.
    ///
    /// Bounds are minutes after midnight; they may lie outside the day when
    /// a move pushes a slot past midnight.
    #[error("{start_minutes}..{end_minutes} min falls outside the display window {window}")]
    OutOfWindow {
        start_minutes: i64,
        end_minutes: i64,
        window: TimeRange,
    },

    /// No timeslot with this id.
    #[error("timeslot {0} not found")]
    NotFound(TimeslotId),

    /// The candidate references a professional that is not a chart row.
    #[error("professional {0} not found")]
    UnknownProfessional(ProfessionalId),

    /// `end <= start`.
    #[error("empty interval {0}")]
    EmptyInterval(TimeRange),

    /// The duration is not a whole number of slot units.
    #[error("duration of {duration_minutes} min is not a multiple of the {slot_minutes}-minute slot")]
    Misaligned {
        duration_minutes: u32,
        slot_minutes: u32,
    },

    /// The timeslot is booked and cannot be edited by gestures.
    #[error("timeslot {0} is booked")]
    Locked(TimeslotId),

    /// The model changed between the start and the end of a gesture.
    #[error("model changed during gesture (revision {expected} -> {actual})")]
    StaleGesture { expected: u64, actual: u64 },

    /// Every timeslot id up to `i64::MAX` has been handed out.
    #[error("no timeslot ids left")]
    IdsExhausted,

    /// Display window violates its invariants.
    #[error("invalid display window: {0}")]
    InvalidWindow(String),

    /// Two professionals share an id.
    #[error("duplicate professional id {0}")]
    DuplicateProfessional(ProfessionalId),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

fn first_record_error(errors: &[RecordError]) -> String {
    errors
        .first()
        .map(|e| format!("; first: {e}"))
        .unwrap_or_default()
}

impl From<serde_json::Error> for ScheduleError {
    fn from(err: serde_json::Error) -> Self {
        ScheduleError::Config(err.to_string())
    }
}
