//! Schedule model.
//!
//! The single authority over timeslot state. Every edit goes through
//! [`ScheduleModel`], which either applies it completely or rejects it with
//! a [`ScheduleError`](crate::ScheduleError) and leaves the state untouched.
//!
//! | Operation | Checks |
//! |-----------|--------|
//! | `add_timeslot` | empty, window, alignment, professional, overlap |
//! | `move_or_resize` | not found, empty, window, alignment, overlap |
//! | `remove` | not found |
//! | `load_*` / `apply_config` | per record: shape, empty, professional, duplicate id, overlap |

mod model;

pub use model::ScheduleModel;

use serde::{Deserialize, Serialize};

use crate::validation::RecordError;

/// What a bulk load does with invalid records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Any invalid record fails the whole load; the model is untouched.
    #[default]
    RejectBatch,
    /// Invalid records are dropped and reported; the rest is loaded.
    SkipInvalid,
}

/// Result of a successful bulk load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Timeslots now in the model.
    pub loaded: usize,
    /// Records dropped under [`LoadPolicy::SkipInvalid`].
    pub skipped: Vec<RecordError>,
    /// Raw rows ignored because they fall on another date.
    pub filtered_out: usize,
}

impl LoadReport {
    /// True if nothing was dropped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}
