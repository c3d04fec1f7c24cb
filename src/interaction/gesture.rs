//! Gesture vocabulary and controller states.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::layout::GridCell;
use crate::models::{ProfessionalId, TimeRange, TimeslotId};

/// Which end of a timeslot a resize handle grabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Start,
    End,
}

/// Pointer input already mapped to grid cells by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Gesture {
    /// Press on a cell. `edge` is set when the press lands on a resize
    /// handle of an existing timeslot.
    PointerDown {
        cell: GridCell,
        #[serde(default)]
        edge: Option<Edge>,
    },
    PointerMove {
        cell: GridCell,
    },
    PointerUp {
        cell: GridCell,
    },
    /// The pointer left the grid.
    PointerLeave,
    /// Explicit abort (Escape key, focus loss).
    Cancel,
    /// Delete request for one timeslot.
    Remove {
        id: TimeslotId,
    },
}

/// Controller state between pointer events.
///
/// Every active state records the model revision seen at pointer-down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GestureState {
    #[default]
    Idle,
    /// Creating a new timeslot on an empty row.
    Drafting {
        professional_id: ProfessionalId,
        row: usize,
        anchor: usize,
        current: usize,
        revision: u64,
    },
    /// Dragging one edge of an existing timeslot.
    Resizing {
        timeslot_id: TimeslotId,
        edge: Edge,
        current: usize,
        revision: u64,
    },
    /// Dragging an existing timeslot along its row.
    Moving {
        timeslot_id: TimeslotId,
        grab: usize,
        current: usize,
        revision: u64,
    },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Revision captured when the gesture started.
    pub fn revision(&self) -> Option<u64> {
        match *self {
            Self::Idle => None,
            Self::Drafting { revision, .. }
            | Self::Resizing { revision, .. }
            | Self::Moving { revision, .. } => Some(revision),
        }
    }

    pub(crate) fn track(&mut self, column: usize) {
        match self {
            Self::Idle => {}
            Self::Drafting { current, .. }
            | Self::Resizing { current, .. }
            | Self::Moving { current, .. } => *current = column,
        }
    }
}

/// What a single gesture did.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Nothing to do in the current state.
    Ignored,
    /// A gesture began.
    Started,
    /// The in-progress gesture was updated.
    Tracking,
    /// The model changed; carries the affected timeslot.
    Committed(TimeslotId),
    /// The gesture finished without changing anything.
    Unchanged,
    /// The model refused the edit; it is unchanged.
    Rejected(ScheduleError),
    /// The gesture was abandoned.
    Cancelled,
}

impl GestureOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// Kind of in-progress feedback to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewKind {
    Draft,
    Move,
    Resize,
}

/// Ghost rectangle for the active gesture, in grid columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotPreview {
    pub kind: PreviewKind,
    pub timeslot_id: Option<TimeslotId>,
    pub row: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub range: TimeRange,
}
