//! Gantt scheduling widget core.
//!
//! Holds the timeslots of a set of professionals for one day, lays them out
//! on a discrete time grid, and turns pointer gestures on that grid into
//! validated edits. Rendering and host transport live outside this crate;
//! it exchanges plain JSON-shaped records with them.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Professional`, `Timeslot`, `SlotRequest`,
//!   `DisplayWindow`, `ClockTime`, `TimeRange`
//! - **`validation`**: Per-record checks (shape, empty interval, unknown
//!   professional, duplicate id, overlap)
//! - **`schedule`**: `ScheduleModel`, the single authority over timeslot state
//! - **`layout`**: `GridLayout`, the pure mapping from timeslots to grid cells
//! - **`interaction`**: `InteractionController`, the gesture state machine,
//!   and `ChangeSink` notification
//! - **`records`**: Host configuration and raw spreadsheet-style rows
//! - **`error`**: `ScheduleError`
//!
//! # Conventions
//!
//! All intervals are half-open `[start, end)`. Two timeslots of the same
//! professional on the same date may touch but never overlap. Times of day
//! are minutes after midnight, `24:00` included.
//!
//! # Example
//!
//! ```
//! use u_gantt::interaction::{ChangeLog, Gesture, GestureOutcome, InteractionController};
//! use u_gantt::layout::GridCell;
//! use u_gantt::records::{GanttConfig, RawNormalizer};
//! use u_gantt::schedule::{LoadPolicy, ScheduleModel};
//!
//! let config = GanttConfig::from_json(r#"{
//!     "professionals": [{"id": 1, "name": "John Doe"}],
//!     "timeslots": [],
//!     "date": "2025-03-14"
//! }"#).unwrap();
//! let mut normalizer = RawNormalizer::new();
//! let (mut model, _) =
//!     ScheduleModel::from_config(&config, &mut normalizer, LoadPolicy::RejectBatch).unwrap();
//!
//! let mut controller = InteractionController::new(ChangeLog::new());
//! let press = Gesture::PointerDown { cell: GridCell::new(0, 36), edge: None };
//! let release = Gesture::PointerUp { cell: GridCell::new(0, 41) };
//! controller.handle(&mut model, press);
//! let outcome = controller.handle(&mut model, release);
//!
//! assert!(matches!(outcome, GestureOutcome::Committed(_)));
//! assert_eq!(model.snapshot()[0].start.to_string(), "09:00");
//! assert_eq!(controller.sink().len(), 1);
//! ```

pub mod error;
pub mod interaction;
pub mod layout;
pub mod models;
pub mod records;
pub mod schedule;
pub mod validation;

pub use error::{ScheduleError, ScheduleResult};
pub use interaction::{ChangeEvent, ChangeSink, Gesture, GestureOutcome, InteractionController};
pub use layout::GridLayout;
pub use models::{DisplayWindow, Professional, SlotRequest, Timeslot};
pub use schedule::{LoadPolicy, LoadReport, ScheduleModel};
