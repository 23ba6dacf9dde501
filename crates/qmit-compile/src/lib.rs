//! qmit circuit transforms
//!
//! This crate implements the circuit rewrites used for error mitigation:
//!
//! - **Unitary folding** ([`fold`], [`UnitaryFolding`]) scales gate noise by an
//!   odd factor without changing the ideal action of the circuit.
//! - **ALAP scheduling** ([`alap_schedule`], [`AlapScheduleAnalysis`]) assigns
//!   start times from a [`DurationTable`] and finds per-qubit idle windows.
//! - **Dynamical decoupling** ([`insert_decoupling`], [`PadDynamicalDecoupling`])
//!   fills long-enough idle windows with an identity-equivalent
//!   [`PulseSequence`].
//!
//! Every transform takes a circuit by reference and returns a new one. The
//! [`Pass`] wrappers and [`PassManager`] chain them, with the same
//! [`PropertySet`] mechanism for sharing device data between passes.
//!
//! # Architecture
//!
//! ```text
//! Input Circuit
//!       |
//!       v
//! +-------------+
//! | PassManager | <-- PropertySet (durations, schedule)
//! +-------------+
//!       |
//!       +-- PadDynamicalDecoupling
//!       +-- UnitaryFolding
//!       +-- AlapScheduleAnalysis
//!       |
//!       v
//! Output Circuit
//! ```
//!
//! # Example
//!
//! ```rust
//! use qmit_compile::{DurationTable, PulseSequence, fold, insert_decoupling};
//! use qmit_ir::Circuit;
//!
//! let circuit = Circuit::ghz(3).unwrap();
//! let durations = DurationTable::ibm_eagle();
//!
//! let padded = insert_decoupling(&circuit, &PulseSequence::Xx, &durations).unwrap();
//! let hybrid = fold(&padded, 3).unwrap();
//! assert_eq!(hybrid.num_unitary_ops(), 3 * padded.num_unitary_ops());
//! ```

pub mod durations;
pub mod error;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod property;
pub mod pulse;
pub mod unitary;

pub use durations::{DurationOverride, DurationTable};
pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use passes::{
    AlapScheduleAnalysis, FoldPolicy, IdleInterval, PadDynamicalDecoupling, Schedule,
    ScheduleEntry, ScaleFactor, UnitaryFolding, alap_schedule, fold, fold_with_policy,
    insert_decoupling,
};
pub use property::PropertySet;
pub use pulse::{DD_LABEL, PulseSequence};
pub use unitary::Unitary2x2;
