//! Gantt scheduling domain models.
//!
//! Provides the plain data types shared by the schedule model, the grid
//! layout engine, and the interaction controller.
//!
//! # Domain Mappings
//!
//! | u-gantt | Clinic | Salon | Workshop |
//! |---------|--------|-------|----------|
//! | Professional | Doctor | Stylist | Technician |
//! | Timeslot | Appointment slot | Chair booking | Service bay slot |
//! | DisplayWindow | Opening hours | Shift | Working day |

mod clock;
mod professional;
mod timeslot;
mod window;

pub use clock::{ClockTime, ParseClockTimeError, TimeRange, MINUTES_PER_DAY};
pub use professional::{Professional, ProfessionalId};
pub use timeslot::{
    clamp_probability, SlotRequest, Timeslot, TimeslotId, DEFAULT_BOOKING_PROBABILITY,
};
pub use window::DisplayWindow;
