//! Interaction controller.
//!
//! Translates pointer gestures on grid cells into schedule edits:
//!
//! | Press on | Drag | Release |
//! |----------|------|---------|
//! | empty cell | extends a draft along the row | creates a timeslot |
//! | timeslot body | shifts the timeslot, held on the grid | moves it, duration kept |
//! | resize handle | drags one edge in whole slots | resizes it, one slot minimum |
//! | booked timeslot | nothing | nothing |
//!
//! Leaving the grid, an explicit cancel, or any pointer event outside the
//! current layout abandons the gesture. A gesture whose start revision no
//! longer matches the model at release is rejected as stale.

mod controller;
mod gesture;
mod sink;

pub use controller::InteractionController;
pub use gesture::{Edge, Gesture, GestureOutcome, GestureState, PreviewKind, SlotPreview};
pub use sink::{ChangeEvent, ChangeLog, ChangeSink, NullSink};
