//! Grid layout computation.
//!
//! # Algorithm
//! 1. Columns: `floor(window_minutes / slot)`; the remainder is reported and
//!    left unrendered.
//! 2. Rows: one per professional, input order preserved.
//! 3. For each timeslot on the window's date whose professional is a row and
//!    whose interval lies inside the rendered range:
//!    `start_col = floor((start - ws) / slot)`,
//!    `end_col = ceil((end - ws) / slot)` (exclusive).
//! 4. Everything else is listed as excluded.
//!
//! # Complexity
//! O(p + n) to build, O(n) per hit test, where p = professionals and
//! n = timeslots.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{
    ClockTime, DisplayWindow, Professional, ProfessionalId, TimeRange, Timeslot, TimeslotId,
};

/// A `(row, column)` grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
}

impl GridCell {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// One chart row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub professional_id: ProfessionalId,
    pub name: String,
}

/// A timeslot mapped onto the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub timeslot_id: TimeslotId,
    pub row: usize,
    /// First occupied column.
    pub start_column: usize,
    /// One past the last occupied column.
    pub end_column: usize,
    /// Booked slots render without drag handles.
    pub locked: bool,
    /// Palette index from [`probability_tone`]; `None` for booked slots.
    pub tone: Option<usize>,
}

impl Placement {
    /// Number of columns spanned.
    #[inline]
    pub fn span(&self) -> usize {
        self.end_column - self.start_column
    }

    /// Whether the placement covers `cell`.
    #[inline]
    pub fn covers(&self, cell: GridCell) -> bool {
        cell.row == self.row && cell.column >= self.start_column && cell.column < self.end_column
    }
}

/// Number of colors in the booking-probability palette.
pub const PROBABILITY_TONES: usize = 7;

/// Palette index for a booking probability: `0` is the likeliest to be
/// booked, `PROBABILITY_TONES - 1` the least. Out-of-range input is clamped.
pub fn probability_tone(probability: f64) -> usize {
    let p = if probability.is_nan() {
        0.5
    } else {
        probability.clamp(0.0, 1.0)
    };
    ((1.0 - p) * (PROBABILITY_TONES - 1) as f64).floor() as usize
}

/// A full-hour header label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourMark {
    pub column: usize,
    pub hour: u32,
}

/// Renderable grid for one display window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLayout {
    pub window: DisplayWindow,
    pub rows: Vec<GridRow>,
    pub column_count: usize,
    /// Minutes at the end of the window too short for a whole column.
    pub unrendered_minutes: u32,
    pub placements: Vec<Placement>,
    /// Timeslots kept in the model but not drawn (other date, unknown
    /// row, or not fully inside the rendered range).
    pub excluded: Vec<TimeslotId>,
}

impl GridLayout {
    /// Lays out `timeslots` on the grid described by `window` and
    /// `professionals`. Pure; the inputs are not modified.
    pub fn compute(
        window: &DisplayWindow,
        professionals: &[Professional],
        timeslots: &[Timeslot],
    ) -> Self {
        let column_count = window.column_count();
        let unrendered_minutes = window.remainder_minutes();
        if unrendered_minutes > 0 {
            log::warn!(
                "display window {} with {}-minute slots leaves the last {} minute(s) unrendered",
                window.range(),
                window.slot_duration,
                unrendered_minutes
            );
        }

        let rows: Vec<GridRow> = professionals
            .iter()
            .map(|p| GridRow {
                professional_id: p.id,
                name: p.name.clone(),
            })
            .collect();
        let row_index: HashMap<ProfessionalId, usize> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.professional_id, i))
            .collect();

        let mut placements = Vec::new();
        let mut excluded = Vec::new();

        for ts in timeslots {
            let row = match row_index.get(&ts.professional_id) {
                Some(&row) if ts.date == window.date => row,
                _ => {
                    excluded.push(ts.id);
                    continue;
                }
            };
            let Some((start_column, end_column)) = columns_covering(window, ts.range()) else {
                excluded.push(ts.id);
                continue;
            };
            let locked = ts.is_locked();
            placements.push(Placement {
                timeslot_id: ts.id,
                row,
                start_column,
                end_column,
                locked,
                tone: (!locked).then(|| probability_tone(ts.booking_probability)),
            });
        }

        Self {
            window: window.clone(),
            rows,
            column_count,
            unrendered_minutes,
            placements,
            excluded,
        }
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether `cell` lies on the grid.
    pub fn contains_cell(&self, cell: GridCell) -> bool {
        cell.row < self.rows.len() && cell.column < self.column_count
    }

    /// Row index of a professional.
    pub fn row_of(&self, professional_id: ProfessionalId) -> Option<usize> {
        self.rows
            .iter()
            .position(|r| r.professional_id == professional_id)
    }

    /// Professional shown in `row`.
    pub fn professional_at(&self, row: usize) -> Option<ProfessionalId> {
        self.rows.get(row).map(|r| r.professional_id)
    }

    /// Placement of a timeslot, if drawn.
    pub fn placement(&self, timeslot_id: TimeslotId) -> Option<&Placement> {
        self.placements
            .iter()
            .find(|p| p.timeslot_id == timeslot_id)
    }

    /// The placement covering `cell`, if any.
    pub fn hit_test(&self, cell: GridCell) -> Option<&Placement> {
        self.placements.iter().find(|p| p.covers(cell))
    }

    /// Start time of a column.
    pub fn column_start(&self, column: usize) -> ClockTime {
        self.window.column_start(column)
    }

    /// Column containing `time`, if rendered.
    pub fn column_at(&self, time: ClockTime) -> Option<usize> {
        self.window.column_at(time)
    }

    /// Time range covered by the half-open column span `[from, to)`.
    pub fn columns_range(&self, from: usize, to: usize) -> TimeRange {
        TimeRange::new(self.column_start(from), self.column_start(to))
    }

    /// Column span `[start, end)` touched by `range`, if it is drawable.
    pub fn columns_for(&self, range: TimeRange) -> Option<(usize, usize)> {
        columns_covering(&self.window, range)
    }

    /// Columns that begin on a full hour, for header labels.
    pub fn hour_marks(&self) -> Vec<HourMark> {
        (0..self.column_count)
            .filter_map(|column| {
                let t = self.column_start(column);
                (t.minute() == 0).then_some(HourMark {
                    column,
                    hour: t.hour(),
                })
            })
            .collect()
    }

    /// Per-column occupant of a row. Later placements win on shared columns.
    pub fn occupancy(&self, row: usize) -> Vec<Option<TimeslotId>> {
        let mut cells = vec![None; self.column_count];
        for p in self.placements.iter().filter(|p| p.row == row) {
            let end = p.end_column.min(self.column_count);
            for cell in cells.iter_mut().take(end).skip(p.start_column) {
                *cell = Some(p.timeslot_id);
            }
        }
        cells
    }
}

fn columns_covering(window: &DisplayWindow, range: TimeRange) -> Option<(usize, usize)> {
    let slot = window.slot_duration;
    let rendered = window.rendered_range();
    if slot == 0 || range.is_empty() || !rendered.covers(&range) {
        return None;
    }
    let from = range.start.minutes() - rendered.start.minutes();
    let to = range.end.minutes() - rendered.start.minutes();
    Some(((from / slot) as usize, to.div_ceil(slot) as usize))
}
