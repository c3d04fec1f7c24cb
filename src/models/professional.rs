//! Professional model.
//!
//! Professionals are the rows of the chart: doctors, therapists, stylists,
//! anyone whose time is split into bookable timeslots. The core never
//! creates or removes them; the host supplies the list per session.

use serde::{Deserialize, Serialize};

/// Professional identifier.
pub type ProfessionalId = i64;

/// A professional whose day is shown as one chart row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professional {
    /// Unique identifier.
    pub id: ProfessionalId,
    /// Display name.
    pub name: String,
}

impl Professional {
    /// Creates a new professional.
    pub fn new(id: ProfessionalId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
