//! Raw-record mode.
//!
//! Hosts that feed rows straight from a spreadsheet or database export use
//! a looser shape:
//!
//! ```json
//! {"datetime": "2025-03-14 09:00", "professionalName": "John Doe",
//!  "durationMinutes": 20, "isAvailable": 1, "bookingProbability": 0.4,
//!  "clinic": "North"}
//! ```
//!
//! `RawNormalizer` turns such rows into canonical timeslots. Professional
//! ids are assigned first-seen-name-first and stay stable for the lifetime
//! of the normalizer, so the host keeps one normalizer per session.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::models::{
    clamp_probability, ClockTime, Professional, ProfessionalId, Timeslot, TimeslotId,
    DEFAULT_BOOKING_PROBABILITY,
};
use crate::validation::{RecordError, RecordErrorKind};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Availability flag as hosts send it: a boolean or a 0/1 number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AvailabilityFlag {
    Flag(bool),
    Number(i64),
}

impl AvailabilityFlag {
    /// Whether the slot is still open for booking.
    pub fn is_available(self) -> bool {
        match self {
            AvailabilityFlag::Flag(b) => b,
            AvailabilityFlag::Number(n) => n != 0,
        }
    }
}

/// A raw host row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// `YYYY-MM-DD HH:MM` (seconds and a `T` separator are tolerated).
    pub datetime: String,
    /// Professional display name; identity in this mode.
    pub professional_name: String,
    /// Slot length in minutes.
    pub duration_minutes: u32,
    /// `false`/`0` means the slot is already booked.
    #[serde(rename = "isAvailable", alias = "isAvailableFlag")]
    pub is_available: AvailabilityFlag,
    /// Optional booking probability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_probability: Option<f64>,
    /// Host-defined fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawRecord {
    /// Parses the `datetime` field.
    pub fn parsed_datetime(&self) -> Option<NaiveDateTime> {
        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(self.datetime.trim(), fmt).ok())
    }
}

/// Session-stable name → id assignment.
#[derive(Debug, Clone, Default)]
pub struct ProfessionalRegistry {
    ids: HashMap<String, ProfessionalId>,
    order: Vec<Professional>,
}

impl ProfessionalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, assigning the next one on first sight.
    pub fn id_for(&mut self, name: &str) -> ProfessionalId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.order.len() as ProfessionalId + 1;
        self.ids.insert(name.to_string(), id);
        self.order.push(Professional::new(id, name));
        id
    }

    /// Looks up an already assigned id.
    pub fn get(&self, name: &str) -> Option<ProfessionalId> {
        self.ids.get(name).copied()
    }

    /// Every professional seen so far, in first-seen order.
    pub fn professionals(&self) -> &[Professional] {
        &self.order
    }
}

/// Output of one normalization pass.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// Professionals appearing in this batch, first-seen order.
    pub professionals: Vec<Professional>,
    /// Parsed candidates keyed by their input index.
    pub timeslots: Vec<(usize, Result<Timeslot, RecordError>)>,
    /// Rows dropped because they belong to another date.
    pub filtered_out: usize,
}

/// Converts raw rows into canonical timeslots.
#[derive(Debug, Clone)]
pub struct RawNormalizer {
    registry: ProfessionalRegistry,
    next_id: TimeslotId,
}

impl Default for RawNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RawNormalizer {
    pub fn new() -> Self {
        Self {
            registry: ProfessionalRegistry::new(),
            next_id: 1,
        }
    }

    /// The name registry.
    pub fn registry(&self) -> &ProfessionalRegistry {
        &self.registry
    }

    /// Normalizes the rows that fall on `date`.
    ///
    /// Rows on other dates are skipped and counted. Rows that fail to parse,
    /// or that run past midnight, come back as `Err` entries; they still
    /// consume no professional id unless their name was readable.
    pub fn normalize(&mut self, records: &[Value], date: NaiveDate) -> NormalizedBatch {
        let mut batch = NormalizedBatch::default();
        let mut seen: Vec<ProfessionalId> = Vec::new();

        for (index, value) in records.iter().enumerate() {
            let raw: RawRecord = match serde_json::from_value(value.clone()) {
                Ok(raw) => raw,
                Err(e) => {
                    batch.timeslots.push((
                        index,
                        Err(RecordError::new(index, RecordErrorKind::Malformed, e.to_string())),
                    ));
                    continue;
                }
            };

            let Some(at) = raw.parsed_datetime() else {
                batch.timeslots.push((
                    index,
                    Err(RecordError::new(
                        index,
                        RecordErrorKind::Malformed,
                        format!("unparsable datetime `{}`", raw.datetime),
                    )),
                ));
                continue;
            };
            if at.date() != date {
                batch.filtered_out += 1;
                continue;
            }

            let professional_id = self.registry.id_for(&raw.professional_name);
            if !seen.contains(&professional_id) {
                seen.push(professional_id);
                batch
                    .professionals
                    .push(Professional::new(professional_id, raw.professional_name.clone()));
            }

            let id = self.next_id;
            self.next_id += 1;
            batch
                .timeslots
                .push((index, self.to_timeslot(index, id, professional_id, at, raw)));
        }

        log::debug!(
            "normalized {} raw row(s) for {date}: {} professional(s), {} on other dates",
            records.len(),
            batch.professionals.len(),
            batch.filtered_out
        );
        batch
    }

    fn to_timeslot(
        &self,
        index: usize,
        id: TimeslotId,
        professional_id: ProfessionalId,
        at: NaiveDateTime,
        raw: RawRecord,
    ) -> Result<Timeslot, RecordError> {
        let start = ClockTime::from_hm(at.hour(), at.minute()).ok_or_else(|| {
            RecordError::new(index, RecordErrorKind::Malformed, "start time out of range")
                .with_id(Some(id))
        })?;
        let end = start
            .checked_add_minutes(i64::from(raw.duration_minutes))
            .ok_or_else(|| {
                RecordError::new(
                    index,
                    RecordErrorKind::OutOfDay,
                    format!(
                        "{} min starting at {} runs past midnight",
                        raw.duration_minutes, start
                    ),
                )
                .with_id(Some(id))
            })?;

        Ok(Timeslot {
            id,
            professional_id,
            date: at.date(),
            start,
            end,
            booking_probability: raw
                .booking_probability
                .map(clamp_probability)
                .unwrap_or(DEFAULT_BOOKING_PROBABILITY),
            is_booked: Some(!raw.is_available.is_available()),
            extra: raw.extra,
        })
    }
}

/// Converts timeslots back into raw rows.
///
/// Timeslots whose professional is missing from `professionals` cannot be
/// named and are skipped with a warning.
pub fn export_raw(professionals: &[Professional], timeslots: &[Timeslot]) -> Vec<RawRecord> {
    let names: HashMap<ProfessionalId, &str> = professionals
        .iter()
        .map(|p| (p.id, p.name.as_str()))
        .collect();

    timeslots
        .iter()
        .filter_map(|ts| {
            let Some(name) = names.get(&ts.professional_id) else {
                log::warn!(
                    "skipping timeslot {} on export: unknown professional {}",
                    ts.id,
                    ts.professional_id
                );
                return None;
            };
            Some(RawRecord {
                datetime: format!("{} {}", ts.date.format("%Y-%m-%d"), ts.start),
                professional_name: (*name).to_string(),
                duration_minutes: ts.duration_minutes(),
                is_available: AvailabilityFlag::Number(if ts.is_locked() { 0 } else { 1 }),
                booking_probability: Some(ts.booking_probability),
                extra: ts.extra.clone(),
            })
        })
        .collect()
}
