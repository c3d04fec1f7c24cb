//! Inbound record validation.
//!
//! Checks the structural integrity of a timeslot batch before it replaces
//! the model's working set. Detects:
//! - Malformed records (missing field, wrong type, bad time or date)
//! - Empty intervals (`end <= start`)
//! - References to unknown professionals
//! - Duplicate timeslot IDs
//! - Overlaps between records of the same professional and date
//!
//! Records are checked in input order; a later record that collides with an
//! earlier accepted one is the one reported.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::NaiveDate;

use crate::error::ScheduleError;
use crate::models::{clamp_probability, Professional, ProfessionalId, TimeRange, Timeslot, TimeslotId};

/// A per-record validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordError {
    /// Position of the record in the input batch.
    pub index: usize,
    /// Timeslot id, when the record got far enough to have one.
    pub id: Option<TimeslotId>,
    /// Error category.
    pub kind: RecordErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of record errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordErrorKind {
    /// Missing field, wrong type, or unparsable value.
    Malformed,
    /// `end <= start`.
    EmptyInterval,
    /// Runs past midnight.
    OutOfDay,
    /// `professionalId` is not in the professional list.
    UnknownProfessional,
    /// Two records share the same timeslot id.
    DuplicateId,
    /// The record overlaps an earlier one for the same professional and date.
    Overlap,
}

impl RecordError {
    pub fn new(index: usize, kind: RecordErrorKind, message: impl Into<String>) -> Self {
        Self {
            index,
            id: None,
            kind,
            message: message.into(),
        }
    }

    /// Attaches the timeslot id.
    pub fn with_id(mut self, id: Option<TimeslotId>) -> Self {
        self.id = id;
        self
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "record {} (id {}): {}", self.index, id, self.message),
            None => write!(f, "record {}: {}", self.index, self.message),
        }
    }
}

/// Result of validating a batch: accepted timeslots in input order plus
/// one error per rejected record.
#[derive(Debug, Clone, Default)]
pub struct BatchValidation {
    pub accepted: Vec<Timeslot>,
    pub errors: Vec<RecordError>,
}

impl BatchValidation {
    /// Whether every record was accepted.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates the professional list: ids must be unique.
pub fn validate_professionals(professionals: &[Professional]) -> Result<(), ScheduleError> {
    let mut ids = HashSet::new();
    for p in professionals {
        if !ids.insert(p.id) {
            return Err(ScheduleError::DuplicateProfessional(p.id));
        }
    }
    Ok(())
}

/// Parses one canonical JSON record into a timeslot.
///
/// The booking probability is clamped into `[0, 1]`; unknown fields land in
/// `Timeslot::extra`.
pub fn parse_timeslot(index: usize, record: &Value) -> Result<Timeslot, RecordError> {
    let mut ts: Timeslot = serde_json::from_value(record.clone()).map_err(|e| {
        RecordError::new(index, RecordErrorKind::Malformed, e.to_string())
            .with_id(record.get("id").and_then(Value::as_i64))
    })?;
    ts.booking_probability = clamp_probability(ts.booking_probability);
    Ok(ts)
}

/// Validates a batch of parsed candidates against the professional list
/// and against each other.
///
/// Candidates that already failed parsing are passed through as errors.
pub fn validate_timeslots<I>(candidates: I, professionals: &[Professional]) -> BatchValidation
where
    I: IntoIterator<Item = (usize, Result<Timeslot, RecordError>)>,
{
    let known: HashSet<ProfessionalId> = professionals.iter().map(|p| p.id).collect();
    let mut ids: HashSet<TimeslotId> = HashSet::new();
    let mut lanes: HashMap<(ProfessionalId, NaiveDate), Vec<(TimeRange, TimeslotId)>> =
        HashMap::new();
    let mut out = BatchValidation::default();

    for (index, candidate) in candidates {
        let ts = match candidate {
            Ok(ts) => ts,
            Err(e) => {
                out.errors.push(e);
                continue;
            }
        };
        let reject = |kind, message: String| {
            RecordError::new(index, kind, message).with_id(Some(ts.id))
        };

        if ts.range().is_empty() {
            out.errors.push(reject(
                RecordErrorKind::EmptyInterval,
                format!("end {} is not after start {}", ts.end, ts.start),
            ));
            continue;
        }
        if !known.contains(&ts.professional_id) {
            out.errors.push(reject(
                RecordErrorKind::UnknownProfessional,
                format!("unknown professional {}", ts.professional_id),
            ));
            continue;
        }
        if ids.contains(&ts.id) {
            out.errors.push(reject(
                RecordErrorKind::DuplicateId,
                format!("duplicate timeslot id {}", ts.id),
            ));
            continue;
        }

        let lane = lanes.entry((ts.professional_id, ts.date)).or_default();
        if let Some((_, other)) = lane.iter().find(|(r, _)| r.overlaps(&ts.range())) {
            out.errors.push(reject(
                RecordErrorKind::Overlap,
                format!("{} overlaps timeslot {}", ts.range(), other),
            ));
            continue;
        }

        lane.push((ts.range(), ts.id));
        ids.insert(ts.id);
        out.accepted.push(ts);
    }

    out
}
