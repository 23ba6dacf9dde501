//! Passes that require gate durations from the `PropertySet`.

pub mod decoupling;
pub mod scheduling;

pub use decoupling::{PadDynamicalDecoupling, insert_decoupling};
pub use scheduling::{AlapScheduleAnalysis, IdleInterval, Schedule, ScheduleEntry, alap_schedule};
