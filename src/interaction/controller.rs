//! Gesture state machine.
//!
//! ```text
//!            PointerDown(empty)         PointerUp -> add_timeslot
//!   Idle ─────────────────────▶ Drafting ─────────────────────────▶ Idle
//!    │  PointerDown(body)       Moving   ─── PointerUp -> shift ───▶ Idle
//!    │  PointerDown(edge)       Resizing ─── PointerUp -> resize ──▶ Idle
//!    │
//!    └─ Remove -> remove                (Leave, Cancel, out of bounds) ─▶ Idle
//! ```

use serde_json::Value;

use super::gesture::{Edge, Gesture, GestureOutcome, GestureState, PreviewKind, SlotPreview};
use super::sink::{ChangeEvent, ChangeSink, NullSink};
use crate::error::{ScheduleError, ScheduleResult};
use crate::layout::{GridCell, GridLayout};
use crate::models::{ClockTime, SlotRequest, TimeRange, TimeslotId};
use crate::schedule::{LoadPolicy, LoadReport, ScheduleModel};

/// Turns grid gestures into schedule edits.
///
/// The controller holds only transient gesture state; the
/// [`ScheduleModel`] stays the sole owner of timeslots and is passed in on
/// every call. Each committed edit is reported to the [`ChangeSink`].
#[derive(Debug, Clone, Default)]
pub struct InteractionController<S: ChangeSink = NullSink> {
    state: GestureState,
    sink: S,
}

impl<S: ChangeSink> InteractionController<S> {
    pub fn new(sink: S) -> Self {
        Self {
            state: GestureState::Idle,
            sink,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Abandons the active gesture, if any.
    pub fn cancel(&mut self) -> GestureOutcome {
        if self.state.is_idle() {
            return GestureOutcome::Ignored;
        }
        log::debug!("gesture cancelled: {:?}", self.state);
        self.state = GestureState::Idle;
        GestureOutcome::Cancelled
    }

    /// Feeds one gesture.
    pub fn handle(&mut self, model: &mut ScheduleModel, gesture: Gesture) -> GestureOutcome {
        match gesture {
            Gesture::PointerDown { cell, edge } => self.pointer_down(model, cell, edge),
            Gesture::PointerMove { cell } => self.pointer_move(model, cell),
            Gesture::PointerUp { cell } => self.pointer_up(model, cell),
            Gesture::PointerLeave | Gesture::Cancel => self.cancel(),
            Gesture::Remove { id } => self.remove(model, id),
        }
    }

    /// Replaces the model's timeslots with host data.
    ///
    /// Any gesture in progress is cancelled. No change event is emitted,
    /// the host already has the data.
    pub fn reload(
        &mut self,
        model: &mut ScheduleModel,
        records: &[Value],
        policy: LoadPolicy,
    ) -> ScheduleResult<LoadReport> {
        self.cancel();
        model.load_timeslots(records, policy)
    }

    /// Ghost rectangle for the active gesture.
    pub fn preview(&self, model: &ScheduleModel) -> Option<SlotPreview> {
        let layout = model.layout();
        match self.state {
            GestureState::Idle => None,
            GestureState::Drafting {
                row,
                anchor,
                current,
                ..
            } => {
                let (start_column, end_column) = draft_columns(anchor, current);
                Some(SlotPreview {
                    kind: PreviewKind::Draft,
                    timeslot_id: None,
                    row,
                    start_column,
                    end_column,
                    range: layout.columns_range(start_column, end_column),
                })
            }
            GestureState::Moving {
                timeslot_id,
                grab,
                current,
                ..
            } => {
                let p = layout.placement(timeslot_id)?;
                let ts = model.get(timeslot_id)?;
                let delta = move_delta(&layout, timeslot_id, grab, current);
                let minutes = delta * i64::from(layout.window.slot_duration);
                let start_column = (p.start_column as i64 + delta) as usize;
                Some(SlotPreview {
                    kind: PreviewKind::Move,
                    timeslot_id: Some(timeslot_id),
                    row: p.row,
                    start_column,
                    end_column: start_column + p.span(),
                    range: TimeRange::new(
                        ts.start.checked_add_minutes(minutes)?,
                        ts.end.checked_add_minutes(minutes)?,
                    ),
                })
            }
            GestureState::Resizing {
                timeslot_id,
                edge,
                current,
                ..
            } => {
                let p = layout.placement(timeslot_id)?;
                let range = resized_range(model, &layout, timeslot_id, edge, current).ok()?;
                let (start_column, end_column) = layout.columns_for(range)?;
                Some(SlotPreview {
                    kind: PreviewKind::Resize,
                    timeslot_id: Some(timeslot_id),
                    row: p.row,
                    start_column,
                    end_column,
                    range,
                })
            }
        }
    }

    fn pointer_down(
        &mut self,
        model: &ScheduleModel,
        cell: GridCell,
        edge: Option<Edge>,
    ) -> GestureOutcome {
        if !self.state.is_idle() {
            log::debug!("pointer down during {:?}; restarting", self.state);
            self.state = GestureState::Idle;
        }
        let layout = model.layout();
        if !layout.contains_cell(cell) {
            return GestureOutcome::Ignored;
        }
        let revision = model.revision();

        self.state = match layout.hit_test(cell) {
            Some(p) if p.locked => {
                log::debug!("timeslot {} is booked; ignoring press", p.timeslot_id);
                return GestureOutcome::Ignored;
            }
            Some(p) => match edge {
                Some(edge) => GestureState::Resizing {
                    timeslot_id: p.timeslot_id,
                    edge,
                    current: cell.column,
                    revision,
                },
                None => GestureState::Moving {
                    timeslot_id: p.timeslot_id,
                    grab: cell.column,
                    current: cell.column,
                    revision,
                },
            },
            None => {
                let Some(professional_id) = layout.professional_at(cell.row) else {
                    return GestureOutcome::Ignored;
                };
                GestureState::Drafting {
                    professional_id,
                    row: cell.row,
                    anchor: cell.column,
                    current: cell.column,
                    revision,
                }
            }
        };
        GestureOutcome::Started
    }

    fn pointer_move(&mut self, model: &ScheduleModel, cell: GridCell) -> GestureOutcome {
        if self.state.is_idle() {
            return GestureOutcome::Ignored;
        }
        if !model.layout().contains_cell(cell) {
            return self.cancel();
        }
        self.state.track(cell.column);
        GestureOutcome::Tracking
    }

    fn pointer_up(&mut self, model: &mut ScheduleModel, cell: GridCell) -> GestureOutcome {
        if self.state.is_idle() {
            return GestureOutcome::Ignored;
        }
        let layout = model.layout();
        if !layout.contains_cell(cell) {
            return self.cancel();
        }
        self.state.track(cell.column);
        let state = std::mem::take(&mut self.state);

        if let Some(expected) = state.revision() {
            let actual = model.revision();
            if expected != actual {
                return GestureOutcome::Rejected(ScheduleError::StaleGesture { expected, actual });
            }
        }

        let result = match state {
            GestureState::Idle => return GestureOutcome::Ignored,
            GestureState::Drafting {
                professional_id,
                anchor,
                current,
                ..
            } => {
                let (from, to) = draft_columns(anchor, current);
                let range = layout.columns_range(from, to);
                model.add_timeslot(
                    SlotRequest::new(professional_id, range.start, range.end)
                        .on(model.window().date),
                )
            }
            GestureState::Moving {
                timeslot_id,
                grab,
                current,
                ..
            } => {
                let delta = move_delta(&layout, timeslot_id, grab, current);
                if delta == 0 {
                    return GestureOutcome::Unchanged;
                }
                let minutes = delta * i64::from(model.window().slot_duration);
                model
                    .shift_timeslot(timeslot_id, minutes)
                    .map(|()| timeslot_id)
            }
            GestureState::Resizing {
                timeslot_id,
                edge,
                current,
                ..
            } => match resized_range(model, &layout, timeslot_id, edge, current) {
                Ok(range) if model.get(timeslot_id).map(|t| t.range()) == Some(range) => {
                    return GestureOutcome::Unchanged;
                }
                Ok(range) => model
                    .move_or_resize(timeslot_id, range.start, range.end)
                    .map(|()| timeslot_id),
                Err(e) => Err(e),
            },
        };
        self.finish(model, result)
    }

    fn remove(&mut self, model: &mut ScheduleModel, id: TimeslotId) -> GestureOutcome {
        let result = match model.get(id) {
            None => Err(ScheduleError::NotFound(id)),
            Some(ts) if ts.is_locked() => Err(ScheduleError::Locked(id)),
            Some(_) => model.remove(id).map(|ts| ts.id),
        };
        self.finish(model, result)
    }

    fn finish(
        &mut self,
        model: &ScheduleModel,
        result: ScheduleResult<TimeslotId>,
    ) -> GestureOutcome {
        match result {
            Ok(id) => {
                let event = ChangeEvent {
                    revision: model.revision(),
                    timeslots: model.snapshot(),
                };
                self.sink.on_change(&event);
                GestureOutcome::Committed(id)
            }
            Err(e) => {
                log::debug!("gesture rejected: {e}");
                GestureOutcome::Rejected(e)
            }
        }
    }
}

/// Column span `[min, max + 1)` of a drag between two columns.
fn draft_columns(anchor: usize, current: usize) -> (usize, usize) {
    (anchor.min(current), anchor.max(current) + 1)
}

/// Column delta of a move, clamped so the placement stays on the grid.
fn move_delta(layout: &GridLayout, id: TimeslotId, grab: usize, current: usize) -> i64 {
    let delta = current as i64 - grab as i64;
    match layout.placement(id) {
        Some(p) => {
            let start = p.start_column as i64;
            let last_start = layout.column_count.saturating_sub(p.span()) as i64;
            (start + delta).clamp(0, last_start) - start
        }
        None => delta,
    }
}

/// Range a resize would produce.
///
/// The dragged edge moves in whole slots from the fixed edge and lands in
/// the column under the pointer, so off-grid timeslots keep an aligned
/// duration. It never crosses the fixed edge: at least one slot is kept.
fn resized_range(
    model: &ScheduleModel,
    layout: &GridLayout,
    id: TimeslotId,
    edge: Edge,
    column: usize,
) -> ScheduleResult<TimeRange> {
    let ts = model.get(id).ok_or(ScheduleError::NotFound(id))?;
    let slot = model.window().slot_duration.max(1);
    let (start, end) = (ts.start.minutes(), ts.end.minutes());
    let range = match edge {
        Edge::Start => {
            let target = layout.column_start(column).minutes();
            let units = (end.saturating_sub(target) / slot).max(1);
            let start = i64::from(end) - i64::from(units * slot);
            TimeRange::new(ClockTime::saturating_from_minutes(start), ts.end)
        }
        Edge::End => {
            let target = layout.column_start(column + 1).minutes();
            let units = (target.saturating_sub(start) / slot).max(1);
            let end = i64::from(start) + i64::from(units * slot);
            TimeRange::new(ts.start, ClockTime::saturating_from_minutes(end))
        }
    };
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::ChangeLog;
    use crate::models::{ClockTime, DisplayWindow, Professional, Timeslot};
    use chrono::NaiveDate;
    use serde_json::json;

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn model() -> ScheduleModel {
        ScheduleModel::new(
            vec![Professional::new(1, "John Doe"), Professional::new(2, "Jane Smith")],
            DisplayWindow::new(day()),
        )
        .unwrap()
    }

    fn down(row: usize, column: usize) -> Gesture {
        Gesture::PointerDown {
            cell: GridCell::new(row, column),
            edge: None,
        }
    }

    fn grab(row: usize, column: usize, edge: Edge) -> Gesture {
        Gesture::PointerDown {
            cell: GridCell::new(row, column),
            edge: Some(edge),
        }
    }

    fn mv(row: usize, column: usize) -> Gesture {
        Gesture::PointerMove {
            cell: GridCell::new(row, column),
        }
    }

    fn up(row: usize, column: usize) -> Gesture {
        Gesture::PointerUp {
            cell: GridCell::new(row, column),
        }
    }

    fn detached() -> InteractionController {
        InteractionController::default()
    }

    /// Model with John at 09:00-09:30 (columns 36..42).
    fn with_slot() -> (ScheduleModel, TimeslotId) {
        let mut m = model();
        let id = m
            .add_timeslot(SlotRequest::new(1, t("09:00"), t("09:30")))
            .unwrap();
        (m, id)
    }

    #[test]
    fn test_draft_creates_timeslot() {
        let mut m = model();
        let mut c = InteractionController::new(ChangeLog::new());

        assert_eq!(c.handle(&mut m, down(0, 36)), GestureOutcome::Started);
        assert_eq!(c.handle(&mut m, mv(0, 38)), GestureOutcome::Tracking);
        let out = c.handle(&mut m, up(0, 41));
        let GestureOutcome::Committed(id) = out else {
            panic!("unexpected {out:?}");
        };

        let ts = m.get(id).unwrap();
        assert_eq!(ts.range(), TimeRange::new(t("09:00"), t("09:30")));
        assert_eq!(ts.professional_id, 1);
        assert_eq!(ts.date, day());
        assert!(c.state().is_idle());

        assert_eq!(c.sink().len(), 1);
        let event = c.sink().last().unwrap();
        assert_eq!(event.revision, m.revision());
        assert_eq!(event.timeslots, m.snapshot());
    }

    #[test]
    fn test_draft_leftwards() {
        let mut m = model();
        let mut c = detached();
        c.handle(&mut m, down(1, 41));
        let out = c.handle(&mut m, up(1, 36));
        assert!(out.is_committed());
        let ts = &m.snapshot()[0];
        assert_eq!(ts.professional_id, 2);
        assert_eq!(ts.range(), TimeRange::new(t("09:00"), t("09:30")));
    }

    #[test]
    fn test_single_click_creates_one_slot() {
        let mut m = model();
        let mut c = detached();
        c.handle(&mut m, down(0, 0));
        assert!(c.handle(&mut m, up(0, 0)).is_committed());
        assert_eq!(m.snapshot()[0].range(), TimeRange::new(t("06:00"), t("06:05")));
    }

    #[test]
    fn test_draft_over_existing_is_rejected() {
        let (mut m, existing) = with_slot();
        let mut c = InteractionController::new(ChangeLog::new());
        c.handle(&mut m, down(0, 30));
        let out = c.handle(&mut m, up(0, 40));
        assert!(matches!(
            out,
            GestureOutcome::Rejected(ScheduleError::Overlap { existing: e, .. }) if e == existing
        ));
        assert_eq!(m.len(), 1);
        assert!(c.sink().is_empty());
        assert!(c.state().is_idle());
    }

    #[test]
    fn test_draft_stays_on_anchor_row() {
        let mut m = model();
        let mut c = detached();
        c.handle(&mut m, down(0, 10));
        c.handle(&mut m, mv(1, 12));
        assert!(c.handle(&mut m, up(1, 12)).is_committed());
        assert_eq!(m.snapshot()[0].professional_id, 1);
    }

    #[test]
    fn test_move_shifts_by_columns() {
        let (mut m, id) = with_slot();
        let mut c = InteractionController::new(ChangeLog::new());
        assert_eq!(c.handle(&mut m, down(0, 38)), GestureOutcome::Started);
        assert!(matches!(c.state(), GestureState::Moving { .. }));
        assert_eq!(c.handle(&mut m, up(0, 40)), GestureOutcome::Committed(id));
        assert_eq!(m.get(id).unwrap().range(), TimeRange::new(t("09:10"), t("09:40")));
        assert_eq!(c.sink().len(), 1);
    }

    #[test]
    fn test_move_back_in_time() {
        let (mut m, id) = with_slot();
        let mut c = detached();
        c.handle(&mut m, down(0, 40));
        c.handle(&mut m, up(0, 4));
        assert_eq!(m.get(id).unwrap().range(), TimeRange::new(t("06:00"), t("06:30")));
    }

    #[test]
    fn test_move_without_delta_is_unchanged() {
        let (mut m, _) = with_slot();
        let rev = m.revision();
        let mut c = InteractionController::new(ChangeLog::new());
        c.handle(&mut m, down(0, 38));
        assert_eq!(c.handle(&mut m, up(0, 38)), GestureOutcome::Unchanged);
        assert_eq!(m.revision(), rev);
        assert!(c.sink().is_empty());
    }

    #[test]
    fn test_move_past_window_end_is_clamped() {
        let (mut m, id) = with_slot();
        let mut c = detached();
        c.handle(&mut m, down(0, 36));
        c.handle(&mut m, mv(0, 211));
        let ghost = c.preview(&m).unwrap();
        assert_eq!((ghost.start_column, ghost.end_column), (210, 216));

        assert_eq!(c.handle(&mut m, up(0, 211)), GestureOutcome::Committed(id));
        assert_eq!(m.get(id).unwrap().range(), ghost.range);
        assert_eq!(ghost.range, TimeRange::new(t("23:30"), t("24:00")));
    }

    #[test]
    fn test_move_before_window_start_is_clamped() {
        let (mut m, id) = with_slot();
        let mut c = detached();
        c.handle(&mut m, down(0, 40));
        c.handle(&mut m, mv(0, 0));
        let ghost = c.preview(&m).unwrap();
        assert_eq!(c.handle(&mut m, up(0, 0)), GestureOutcome::Committed(id));
        assert_eq!(m.get(id).unwrap().range(), ghost.range);
        assert_eq!(ghost.range.start, t("06:00"));
    }

    #[test]
    fn test_move_onto_neighbour_rejected() {
        let (mut m, id) = with_slot();
        m.add_timeslot(SlotRequest::new(1, t("10:00"), t("10:30")))
            .unwrap();
        let mut c = detached();
        c.handle(&mut m, down(0, 36));
        let out = c.handle(&mut m, up(0, 46));
        assert!(matches!(out, GestureOutcome::Rejected(ScheduleError::Overlap { .. })));
        assert_eq!(m.get(id).unwrap().start, t("09:00"));
    }

    #[test]
    fn test_resize_end() {
        let (mut m, id) = with_slot();
        let mut c = detached();
        c.handle(&mut m, grab(0, 41, Edge::End));
        assert!(matches!(c.state(), GestureState::Resizing { edge: Edge::End, .. }));
        assert_eq!(c.handle(&mut m, up(0, 47)), GestureOutcome::Committed(id));
        assert_eq!(m.get(id).unwrap().range(), TimeRange::new(t("09:00"), t("10:00")));
    }

    #[test]
    fn test_resize_start_is_capped() {
        let (mut m, id) = with_slot();
        let mut c = detached();
        c.handle(&mut m, grab(0, 36, Edge::Start));
        c.handle(&mut m, mv(0, 60));
        assert!(c.handle(&mut m, up(0, 60)).is_committed());
        assert_eq!(m.get(id).unwrap().range(), TimeRange::new(t("09:25"), t("09:30")));
    }

    #[test]
    fn test_resize_end_is_capped() {
        let (mut m, id) = with_slot();
        let mut c = detached();
        c.handle(&mut m, grab(0, 41, Edge::End));
        assert!(c.handle(&mut m, up(0, 2)).is_committed());
        assert_eq!(m.get(id).unwrap().range(), TimeRange::new(t("09:00"), t("09:05")));
    }

    /// Model with John at the off-grid 09:02-09:32 (columns 36..43).
    fn with_offgrid_slot() -> ScheduleModel {
        let mut m = model();
        m.replace_timeslots(
            vec![Timeslot::new(7, 1, day(), t("09:02"), t("09:32"))],
            LoadPolicy::RejectBatch,
        )
        .unwrap();
        m
    }

    #[test]
    fn test_resize_offgrid_end_keeps_whole_slots() {
        let mut m = with_offgrid_slot();
        let mut c = detached();
        c.handle(&mut m, grab(0, 42, Edge::End));
        c.handle(&mut m, mv(0, 47));
        let ghost = c.preview(&m).unwrap();
        assert_eq!((ghost.start_column, ghost.end_column), (36, 48));

        assert_eq!(c.handle(&mut m, up(0, 47)), GestureOutcome::Committed(7));
        assert_eq!(m.get(7).unwrap().range(), TimeRange::new(t("09:02"), t("09:57")));
        assert_eq!(ghost.range, m.get(7).unwrap().range());
    }

    #[test]
    fn test_resize_offgrid_start_keeps_whole_slots() {
        let mut m = with_offgrid_slot();
        let mut c = detached();
        c.handle(&mut m, grab(0, 36, Edge::Start));
        assert_eq!(c.handle(&mut m, up(0, 30)), GestureOutcome::Committed(7));
        assert_eq!(m.get(7).unwrap().range(), TimeRange::new(t("08:32"), t("09:32")));

        c.handle(&mut m, grab(0, 30, Edge::Start));
        assert!(c.handle(&mut m, up(0, 50)).is_committed());
        assert_eq!(m.get(7).unwrap().range(), TimeRange::new(t("09:27"), t("09:32")));
    }

    #[test]
    fn test_resize_to_same_is_unchanged() {
        let (mut m, _) = with_slot();
        let mut c = detached();
        c.handle(&mut m, grab(0, 41, Edge::End));
        assert_eq!(c.handle(&mut m, up(0, 41)), GestureOutcome::Unchanged);
        c.handle(&mut m, grab(0, 36, Edge::Start));
        assert_eq!(c.handle(&mut m, up(0, 36)), GestureOutcome::Unchanged);
    }

    #[test]
    fn test_booked_slot_is_locked() {
        let mut m = model();
        m.replace_timeslots(
            vec![Timeslot::new(5, 1, day(), t("09:00"), t("09:30")).with_booked(true)],
            LoadPolicy::RejectBatch,
        )
        .unwrap();
        let mut c = InteractionController::new(ChangeLog::new());

        assert_eq!(c.handle(&mut m, down(0, 38)), GestureOutcome::Ignored);
        assert_eq!(c.handle(&mut m, grab(0, 41, Edge::End)), GestureOutcome::Ignored);
        assert!(c.state().is_idle());
        assert_eq!(
            c.handle(&mut m, Gesture::Remove { id: 5 }),
            GestureOutcome::Rejected(ScheduleError::Locked(5))
        );
        assert_eq!(m.len(), 1);
        assert!(c.sink().is_empty());
    }

    #[test]
    fn test_remove() {
        let (mut m, id) = with_slot();
        let mut c = InteractionController::new(ChangeLog::new());
        assert_eq!(c.handle(&mut m, Gesture::Remove { id }), GestureOutcome::Committed(id));
        assert!(m.is_empty());
        assert!(c.sink().last().unwrap().timeslots.is_empty());
        assert_eq!(
            c.handle(&mut m, Gesture::Remove { id }),
            GestureOutcome::Rejected(ScheduleError::NotFound(id))
        );
    }

    #[test]
    fn test_out_of_bounds_cancels() {
        let (mut m, id) = with_slot();
        let mut c = InteractionController::new(ChangeLog::new());
        c.handle(&mut m, down(0, 38));
        assert_eq!(c.handle(&mut m, mv(0, 216)), GestureOutcome::Cancelled);
        assert!(c.state().is_idle());
        assert_eq!(c.handle(&mut m, up(0, 40)), GestureOutcome::Ignored);
        assert_eq!(m.get(id).unwrap().start, t("09:00"));

        c.handle(&mut m, down(0, 38));
        assert_eq!(c.handle(&mut m, up(2, 40)), GestureOutcome::Cancelled);
        assert!(c.sink().is_empty());
    }

    #[test]
    fn test_press_outside_grid_ignored() {
        let mut m = model();
        let mut c = detached();
        assert_eq!(c.handle(&mut m, down(5, 0)), GestureOutcome::Ignored);
        assert_eq!(c.handle(&mut m, down(0, 500)), GestureOutcome::Ignored);
        assert!(c.state().is_idle());
    }

    #[test]
    fn test_leave_and_cancel() {
        let mut m = model();
        let mut c = detached();
        assert_eq!(c.handle(&mut m, Gesture::Cancel), GestureOutcome::Ignored);
        c.handle(&mut m, down(0, 3));
        assert_eq!(c.handle(&mut m, Gesture::PointerLeave), GestureOutcome::Cancelled);
        c.handle(&mut m, down(0, 3));
        assert_eq!(c.handle(&mut m, Gesture::Cancel), GestureOutcome::Cancelled);
        assert!(m.is_empty());
    }

    #[test]
    fn test_stale_gesture() {
        let (mut m, id) = with_slot();
        let mut c = detached();
        c.handle(&mut m, down(0, 38));
        let before = m.revision();
        m.set_booking_probability(id, 0.9).unwrap();

        let out = c.handle(&mut m, up(0, 40));
        assert_eq!(
            out,
            GestureOutcome::Rejected(ScheduleError::StaleGesture {
                expected: before,
                actual: before + 1
            })
        );
        assert_eq!(m.get(id).unwrap().start, t("09:00"));
        assert!(c.state().is_idle());
    }

    #[test]
    fn test_reload_cancels_without_event() {
        let (mut m, _) = with_slot();
        let mut c = InteractionController::new(ChangeLog::new());
        c.handle(&mut m, down(0, 38));

        let records = vec![json!({
            "id": 10, "professionalId": 2, "date": "2025-03-14",
            "start": "12:00", "end": "12:30"
        })];
        let report = c.reload(&mut m, &records, LoadPolicy::RejectBatch).unwrap();
        assert_eq!(report.loaded, 1);
        assert!(c.state().is_idle());
        assert!(c.sink().is_empty());
        assert_eq!(m.snapshot()[0].id, 10);
    }

    #[test]
    fn test_preview() {
        let (mut m, id) = with_slot();
        let mut c = detached();
        assert_eq!(c.preview(&m), None);

        c.handle(&mut m, down(1, 12));
        c.handle(&mut m, mv(1, 10));
        let p = c.preview(&m).unwrap();
        assert_eq!(p.kind, PreviewKind::Draft);
        assert_eq!((p.row, p.start_column, p.end_column), (1, 10, 13));
        assert_eq!(p.range, TimeRange::new(t("06:50"), t("07:05")));
        c.cancel();

        c.handle(&mut m, down(0, 37));
        c.handle(&mut m, mv(0, 39));
        let p = c.preview(&m).unwrap();
        assert_eq!(p.kind, PreviewKind::Move);
        assert_eq!(p.timeslot_id, Some(id));
        assert_eq!((p.start_column, p.end_column), (38, 44));
        c.cancel();

        c.handle(&mut m, grab(0, 41, Edge::End));
        c.handle(&mut m, mv(0, 44));
        let p = c.preview(&m).unwrap();
        assert_eq!(p.kind, PreviewKind::Resize);
        assert_eq!((p.start_column, p.end_column), (36, 45));
        assert_eq!(p.range.end, t("09:45"));
    }

    #[test]
    fn test_closure_sink_receives_events() {
        let mut m = model();
        let mut revisions = Vec::new();
        {
            let mut c = InteractionController::new(|e: &ChangeEvent| revisions.push(e.revision));
            c.handle(&mut m, down(0, 0));
            c.handle(&mut m, up(0, 5));
            c.handle(&mut m, down(1, 0));
            c.handle(&mut m, up(1, 5));
        }
        assert_eq!(revisions, vec![1, 2]);
    }

    #[test]
    fn test_gesture_from_json() {
        let g: Gesture =
            serde_json::from_str(r#"{"type":"pointer_down","cell":{"row":0,"column":3},"edge":"end"}"#)
                .unwrap();
        assert_eq!(g, grab(0, 3, Edge::End));
        let g: Gesture = serde_json::from_str(r#"{"type":"remove","id":4}"#).unwrap();
        assert_eq!(g, Gesture::Remove { id: 4 });
    }
}
