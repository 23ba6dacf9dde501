//! Built-in passes.
//!
//! Passes are organized into two categories:
//! - [`agnostic`]: passes that need nothing beyond the circuit itself
//! - [`target`]: passes that need device timing from the `PropertySet`

pub mod agnostic;
pub mod target;

pub use agnostic::{FoldPolicy, ScaleFactor, UnitaryFolding, fold, fold_with_policy};
pub use target::{
    AlapScheduleAnalysis, IdleInterval, PadDynamicalDecoupling, Schedule, ScheduleEntry,
    alap_schedule, insert_decoupling,
};
