//! The schedule model.
//!
//! # Invariants
//! - Every stored timeslot has `start < end`.
//! - For a fixed professional and date, stored intervals never overlap.
//! - Timeslots created or edited through the model span a whole number of
//!   slot-duration units and lie inside the window's hour range.
//! - A failed call leaves the model unchanged; a successful mutation bumps
//!   `revision` by one.
//!
//! Bulk loads bypass the window and alignment checks: externally supplied
//! data outside the current window is kept and simply not rendered.

use chrono::NaiveDate;
use serde_json::Value;

use super::{LoadPolicy, LoadReport};
use crate::error::{ScheduleError, ScheduleResult};
use crate::layout::GridLayout;
use crate::models::{
    clamp_probability, ClockTime, DisplayWindow, Professional, ProfessionalId, SlotRequest,
    TimeRange, Timeslot, TimeslotId, DEFAULT_BOOKING_PROBABILITY,
};
use crate::records::{GanttConfig, RawNormalizer};
use crate::validation::{
    parse_timeslot, validate_professionals, validate_timeslots, RecordError,
};

/// Professionals, timeslots, and the active display window of one session.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_gantt::models::{DisplayWindow, Professional, SlotRequest};
/// use u_gantt::schedule::ScheduleModel;
/// use u_gantt::ScheduleError;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
/// let mut model = ScheduleModel::new(
///     vec![Professional::new(1, "John Doe")],
///     DisplayWindow::new(date),
/// )
/// .unwrap();
///
/// let nine = "09:00".parse().unwrap();
/// let half_past = "09:30".parse().unwrap();
/// let id = model.add_timeslot(SlotRequest::new(1, nine, half_past)).unwrap();
/// assert_eq!(model.snapshot()[0].id, id);
///
/// let clash = SlotRequest::new(1, "09:15".parse().unwrap(), "09:45".parse().unwrap());
/// assert!(matches!(model.add_timeslot(clash), Err(ScheduleError::Overlap { .. })));
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleModel {
    professionals: Vec<Professional>,
    window: DisplayWindow,
    timeslots: Vec<Timeslot>,
    revision: u64,
    /// `None` once an id of `i64::MAX` has been seen.
    next_id: Option<TimeslotId>,
}

impl ScheduleModel {
    /// Creates an empty model.
    pub fn new(professionals: Vec<Professional>, window: DisplayWindow) -> ScheduleResult<Self> {
        window.validate()?;
        validate_professionals(&professionals)?;
        Ok(Self {
            professionals,
            window,
            timeslots: Vec::new(),
            revision: 0,
            next_id: Some(1),
        })
    }

    /// Builds a model from an inbound configuration.
    pub fn from_config(
        config: &GanttConfig,
        normalizer: &mut RawNormalizer,
        policy: LoadPolicy,
    ) -> ScheduleResult<(Self, LoadReport)> {
        let mut model = Self::new(Vec::new(), config.window())?;
        let report = model.apply_config(config, normalizer, policy)?;
        Ok((model, report))
    }

    // ---- queries ----

    pub fn professionals(&self) -> &[Professional] {
        &self.professionals
    }

    pub fn professional(&self, id: ProfessionalId) -> Option<&Professional> {
        self.professionals.iter().find(|p| p.id == id)
    }

    pub fn window(&self) -> &DisplayWindow {
        &self.window
    }

    /// Monotonic mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.timeslots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeslots.is_empty()
    }

    pub fn get(&self, id: TimeslotId) -> Option<&Timeslot> {
        self.timeslots.iter().find(|t| t.id == id)
    }

    /// Timeslots of one professional on one date, by start time.
    pub fn timeslots_for(&self, professional_id: ProfessionalId, date: NaiveDate) -> Vec<&Timeslot> {
        let mut out: Vec<&Timeslot> = self
            .timeslots
            .iter()
            .filter(|t| t.professional_id == professional_id && t.date == date)
            .collect();
        out.sort_by_key(|t| (t.start, t.id));
        out
    }

    /// All timeslots ordered by professional id, date, start, id.
    pub fn snapshot(&self) -> Vec<Timeslot> {
        let mut out = self.timeslots.clone();
        out.sort_by(|a, b| {
            (a.professional_id, a.date, a.start, a.id).cmp(&(b.professional_id, b.date, b.start, b.id))
        });
        out
    }

    /// Grid layout of the current state.
    pub fn layout(&self) -> GridLayout {
        GridLayout::compute(&self.window, &self.professionals, &self.timeslots)
    }

    // ---- bulk replacement ----

    /// Replaces the working set with canonical JSON records.
    pub fn load_timeslots(
        &mut self,
        records: &[Value],
        policy: LoadPolicy,
    ) -> ScheduleResult<LoadReport> {
        let parsed = parse_all(records);
        let (accepted, report) = stage(&self.professionals, parsed, policy)?;
        self.install(accepted);
        log::debug!("loaded {} timeslot(s), skipped {}", report.loaded, report.skipped.len());
        Ok(report)
    }

    /// Replaces the working set with already typed timeslots.
    pub fn replace_timeslots(
        &mut self,
        timeslots: Vec<Timeslot>,
        policy: LoadPolicy,
    ) -> ScheduleResult<LoadReport> {
        let candidates = timeslots.into_iter().enumerate().map(|(i, mut ts)| {
            ts.booking_probability = clamp_probability(ts.booking_probability);
            (i, Ok(ts))
        });
        let (accepted, report) = stage(&self.professionals, candidates, policy)?;
        self.install(accepted);
        Ok(report)
    }

    /// Replaces professionals and timeslots with raw rows for the window's
    /// date. Professionals become the names appearing in the batch.
    pub fn load_raw(
        &mut self,
        normalizer: &mut RawNormalizer,
        records: &[Value],
        policy: LoadPolicy,
    ) -> ScheduleResult<LoadReport> {
        let batch = normalizer.normalize(records, self.window.date);
        let (accepted, mut report) = stage(&batch.professionals, batch.timeslots, policy)?;
        report.filtered_out = batch.filtered_out;
        self.professionals = batch.professionals;
        self.install(accepted);
        Ok(report)
    }

    /// Applies a full inbound configuration: window, professionals and
    /// timeslots are replaced together or not at all.
    pub fn apply_config(
        &mut self,
        config: &GanttConfig,
        normalizer: &mut RawNormalizer,
        policy: LoadPolicy,
    ) -> ScheduleResult<LoadReport> {
        let window = config.window();
        window.validate()?;

        let (professionals, accepted, report) = match &config.raw_data {
            Some(rows) => {
                let batch = normalizer.normalize(rows, window.date);
                let (accepted, mut report) = stage(&batch.professionals, batch.timeslots, policy)?;
                report.filtered_out = batch.filtered_out;
                (batch.professionals, accepted, report)
            }
            None => {
                validate_professionals(&config.professionals)?;
                let parsed = parse_all(&config.timeslots);
                let (accepted, report) = stage(&config.professionals, parsed, policy)?;
                (config.professionals.clone(), accepted, report)
            }
        };

        self.window = window;
        self.professionals = professionals;
        self.install(accepted);
        Ok(report)
    }

    /// Replaces the display window. Timeslots are untouched.
    pub fn set_window(&mut self, window: DisplayWindow) -> ScheduleResult<()> {
        window.validate()?;
        self.window = window;
        self.bump();
        Ok(())
    }

    /// Replaces the professional list.
    ///
    /// Fails if a stored timeslot would lose its professional.
    pub fn set_professionals(&mut self, professionals: Vec<Professional>) -> ScheduleResult<()> {
        validate_professionals(&professionals)?;
        if let Some(orphan) = self
            .timeslots
            .iter()
            .find(|t| !professionals.iter().any(|p| p.id == t.professional_id))
        {
            return Err(ScheduleError::UnknownProfessional(orphan.professional_id));
        }
        self.professionals = professionals;
        self.bump();
        Ok(())
    }

    // ---- edits ----

    /// Creates a timeslot and returns its id.
    pub fn add_timeslot(&mut self, request: SlotRequest) -> ScheduleResult<TimeslotId> {
        let date = request.date.unwrap_or(self.window.date);
        let range = request.range();
        self.check_candidate(request.professional_id, date, range, None)?;
        let id = self.next_id.ok_or(ScheduleError::IdsExhausted)?;

        self.next_id = id.checked_add(1);
        self.timeslots.push(Timeslot {
            id,
            professional_id: request.professional_id,
            date,
            start: range.start,
            end: range.end,
            booking_probability: request
                .booking_probability
                .map(clamp_probability)
                .unwrap_or(DEFAULT_BOOKING_PROBABILITY),
            is_booked: None,
            extra: request.extra,
        });
        self.bump();
        log::debug!(
            "added timeslot {id} for professional {} on {date}: {range}",
            request.professional_id
        );
        Ok(id)
    }

    /// Moves or resizes a timeslot to `[new_start, new_end)`.
    pub fn move_or_resize(
        &mut self,
        id: TimeslotId,
        new_start: ClockTime,
        new_end: ClockTime,
    ) -> ScheduleResult<()> {
        let idx = self.index_of(id)?;
        let (professional_id, date) = {
            let ts = &self.timeslots[idx];
            (ts.professional_id, ts.date)
        };
        let range = TimeRange::new(new_start, new_end);
        self.check_candidate(professional_id, date, range, Some(id))?;

        let ts = &mut self.timeslots[idx];
        ts.start = new_start;
        ts.end = new_end;
        self.bump();
        log::debug!("timeslot {id} now {range}");
        Ok(())
    }

    /// Moves a timeslot by `delta_minutes`, keeping its duration.
    pub fn shift_timeslot(&mut self, id: TimeslotId, delta_minutes: i64) -> ScheduleResult<()> {
        let ts = self.get(id).ok_or(ScheduleError::NotFound(id))?;
        match (
            ts.start.checked_add_minutes(delta_minutes),
            ts.end.checked_add_minutes(delta_minutes),
        ) {
            (Some(start), Some(end)) => self.move_or_resize(id, start, end),
            _ => Err(ScheduleError::OutOfWindow {
                start_minutes: i64::from(ts.start.minutes()) + delta_minutes,
                end_minutes: i64::from(ts.end.minutes()) + delta_minutes,
                window: self.window.range(),
            }),
        }
    }

    /// Deletes a timeslot and returns it.
    pub fn remove(&mut self, id: TimeslotId) -> ScheduleResult<Timeslot> {
        let idx = self.index_of(id)?;
        let removed = self.timeslots.remove(idx);
        self.bump();
        log::debug!("removed timeslot {id}");
        Ok(removed)
    }

    /// Stores a booking probability pushed back by a scoring service.
    pub fn set_booking_probability(&mut self, id: TimeslotId, probability: f64) -> ScheduleResult<()> {
        let idx = self.index_of(id)?;
        self.timeslots[idx].booking_probability = clamp_probability(probability);
        self.bump();
        Ok(())
    }

    /// Stores a batch of booking probabilities. All ids must exist,
    /// otherwise nothing is written. Returns the number of updates.
    pub fn apply_booking_probabilities(
        &mut self,
        updates: &[(TimeslotId, f64)],
    ) -> ScheduleResult<usize> {
        let indices = updates
            .iter()
            .map(|&(id, _)| self.index_of(id))
            .collect::<ScheduleResult<Vec<usize>>>()?;
        for (idx, &(_, p)) in indices.into_iter().zip(updates) {
            self.timeslots[idx].booking_probability = clamp_probability(p);
        }
        self.bump();
        Ok(updates.len())
    }

    // ---- internals ----

    fn index_of(&self, id: TimeslotId) -> ScheduleResult<usize> {
        self.timeslots
            .iter()
            .position(|t| t.id == id)
            .ok_or(ScheduleError::NotFound(id))
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    fn install(&mut self, timeslots: Vec<Timeslot>) {
        if let Some(max_id) = timeslots.iter().map(|t| t.id).max() {
            self.next_id = match (self.next_id, max_id.checked_add(1)) {
                (Some(next), Some(after)) => Some(next.max(after)),
                _ => None,
            };
        }
        self.timeslots = timeslots;
        self.bump();
    }

    /// Checks, in order: empty interval, window, alignment, professional,
    /// overlap (ignoring `exclude`).
    fn check_candidate(
        &self,
        professional_id: ProfessionalId,
        date: NaiveDate,
        range: TimeRange,
        exclude: Option<TimeslotId>,
    ) -> ScheduleResult<()> {
        if range.is_empty() {
            return Err(ScheduleError::EmptyInterval(range));
        }
        if !self.window.range().covers(&range) {
            return Err(ScheduleError::OutOfWindow {
                start_minutes: i64::from(range.start.minutes()),
                end_minutes: i64::from(range.end.minutes()),
                window: self.window.range(),
            });
        }
        if !self.window.is_aligned(range.duration_minutes()) {
            return Err(ScheduleError::Misaligned {
                duration_minutes: range.duration_minutes(),
                slot_minutes: self.window.slot_duration,
            });
        }
        if self.professional(professional_id).is_none() {
            return Err(ScheduleError::UnknownProfessional(professional_id));
        }
        if let Some(other) = self.timeslots.iter().find(|t| {
            Some(t.id) != exclude
                && t.professional_id == professional_id
                && t.date == date
                && t.range().overlaps(&range)
        }) {
            return Err(ScheduleError::Overlap {
                professional_id,
                date,
                range,
                existing: other.id,
            });
        }
        Ok(())
    }
}

fn parse_all(records: &[Value]) -> Vec<(usize, Result<Timeslot, RecordError>)> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| (i, parse_timeslot(i, r)))
        .collect()
}

/// Validates candidates and applies the load policy.
fn stage<I>(
    professionals: &[Professional],
    candidates: I,
    policy: LoadPolicy,
) -> ScheduleResult<(Vec<Timeslot>, LoadReport)>
where
    I: IntoIterator<Item = (usize, Result<Timeslot, RecordError>)>,
{
    let out = validate_timeslots(candidates, professionals);
    for e in &out.errors {
        log::warn!("rejected timeslot {e}");
    }
    if !out.is_clean() && policy == LoadPolicy::RejectBatch {
        return Err(ScheduleError::InvalidRecord(out.errors));
    }
    let report = LoadReport {
        loaded: out.accepted.len(),
        skipped: out.errors,
        filtered_out: 0,
    };
    Ok((out.accepted, report))
}
