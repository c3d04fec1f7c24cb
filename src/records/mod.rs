//! Host-facing data contract.
//!
//! The hosting application talks to the core in plain JSON-shaped records:
//!
//! - **Inbound configuration** ([`GanttConfig`]): professionals, timeslot
//!   records (canonical or raw), and the display window.
//! - **Raw-record mode** ([`RawNormalizer`]): spreadsheet-style rows keyed
//!   by professional name, normalized into canonical timeslots.
//! - **Outbound** timeslots serialize back in the inbound shape; see
//!   [`crate::interaction::ChangeEvent`] and [`export_raw`].

mod raw;

pub use raw::{
    export_raw, AvailabilityFlag, NormalizedBatch, ProfessionalRegistry, RawNormalizer,
    RawRecord,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ScheduleError;
use crate::models::{DisplayWindow, Professional};

/// Header background used when the host sets none.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#f5f5f5";

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn default_start_hour() -> u32 {
    DisplayWindow::DEFAULT_START_HOUR
}

fn default_end_hour() -> u32 {
    DisplayWindow::DEFAULT_END_HOUR
}

fn default_slot_duration() -> u32 {
    DisplayWindow::DEFAULT_SLOT_DURATION
}

fn default_background_color() -> String {
    DEFAULT_BACKGROUND_COLOR.to_string()
}

/// Inbound widget configuration.
///
/// Either `timeslots` (canonical records referencing `professionals` by id)
/// or `rawData` (raw rows; professionals derived from names) carries the
/// slots. When `rawData` is present it wins and `professionals` is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttConfig {
    #[serde(default)]
    pub professionals: Vec<Professional>,
    /// Canonical timeslot records, validated one by one on load.
    #[serde(default)]
    pub timeslots: Vec<Value>,
    /// Raw rows, see [`RawRecord`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<Vec<Value>>,
    /// Day shown; defaults to today on the local clock.
    #[serde(default = "today")]
    pub date: NaiveDate,
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
    /// Column width in minutes.
    #[serde(default = "default_slot_duration")]
    pub slot_duration: u32,
    /// Header background for the renderer; the core only passes it through.
    #[serde(default = "default_background_color")]
    pub background_color: String,
}

impl GanttConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ScheduleError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parses a configuration from a JSON value.
    pub fn from_value(value: Value) -> Result<Self, ScheduleError> {
        Ok(serde_json::from_value(value)?)
    }

    /// The display window described by this configuration (unvalidated).
    pub fn window(&self) -> DisplayWindow {
        DisplayWindow::new(self.date)
            .with_hours(self.start_hour, self.end_hour)
            .with_slot_duration(self.slot_duration)
    }
}
