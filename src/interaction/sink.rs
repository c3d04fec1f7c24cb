//! Change notification.

use serde::Serialize;

use crate::error::ScheduleResult;
use crate::models::Timeslot;

/// Full timeslot state after a committed gesture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    /// Model revision after the change.
    pub revision: u64,
    /// Snapshot in canonical record shape.
    pub timeslots: Vec<Timeslot>,
}

impl ChangeEvent {
    /// Serializes the event for the host.
    pub fn to_json(&self) -> ScheduleResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Receives one event per committed gesture.
pub trait ChangeSink {
    fn on_change(&mut self, event: &ChangeEvent);
}

impl<F> ChangeSink for F
where
    F: FnMut(&ChangeEvent),
{
    fn on_change(&mut self, event: &ChangeEvent) {
        self(event)
    }
}

/// Discards events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ChangeSink for NullSink {
    fn on_change(&mut self, _event: &ChangeEvent) {}
}

/// Keeps every event in order.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    pub events: Vec<ChangeEvent>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ChangeEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl ChangeSink for ChangeLog {
    fn on_change(&mut self, event: &ChangeEvent) {
        self.events.push(event.clone());
    }
}
