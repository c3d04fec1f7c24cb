//! Grid layout engine.
//!
//! Converts a display window and a set of timeslots into a discrete grid:
//! rows are professionals, columns are slot-duration time buckets. Intervals
//! are half-open throughout, so a timeslot ending exactly on a column
//! boundary does not occupy the column that starts there.
//!
//! The layout is a pure function of its inputs. Timeslots that do not fit
//! the current window are left out of the layout but never out of the
//! model, so switching windows loses no data.

mod grid;

pub use grid::{
    probability_tone, GridCell, GridLayout, GridRow, HourMark, Placement, PROBABILITY_TONES,
};
