//! qmit mitigation pipeline
//!
//! This crate combines unitary folding and dynamical decoupling from
//! `qmit-compile` into four estimates of a noiseless outcome probability.
//!
//! # Overview
//!
//! | Stage | Circuits executed | Estimate |
//! |-------|-------------------|----------|
//! | RAW | base | measured |
//! | DD | decoupled base | measured |
//! | ZNE | base folded at each scale > 1 | extrapolated from RAW |
//! | HYBRID | decoupled base folded at each scale > 1 | extrapolated from DD |
//!
//! Circuits are run through an [`Executor`], which returns the probability of
//! a target outcome. Executors are supplied by adapters (e.g. the ideal
//! statevector executor in `qmit-adapter-sim`) or wrapped from a closure with
//! [`FnExecutor`].
//!
//! # Example
//!
//! ```rust
//! use qmit_ir::{Circuit, CustomGate, QubitId, ClbitId};
//! use qmit_compile::{DurationTable, PulseSequence};
//! use qmit_mitigate::{FnExecutor, MitigationConfig, run};
//!
//! # fn block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(f)
//! # }
//! let g = CustomGate::new("g", 1).self_inverse();
//! let mut circuit = Circuit::with_size("g", 1, 1);
//! circuit.gate(g.clone(), [QubitId(0)]).unwrap();
//! circuit.measure(QubitId(0), ClbitId(0)).unwrap();
//!
//! let config = MitigationConfig::default()
//!     .with_durations(DurationTable::new().with_gate("g", 100).with_gate("measure", 200))
//!     .with_pulse_sequence(PulseSequence::Custom(vec![g.clone().into(), g.into()]));
//!
//! // Each `g` costs 0.1 of fidelity.
//! let executor = FnExecutor::new("linear", |c: &Circuit, _shots| {
//!     Ok(1.0 - 0.1 * c.num_unitary_ops() as f64)
//! });
//!
//! let result = block_on(run(&circuit, &executor, &config)).unwrap();
//! assert!((result.raw - 0.9).abs() < 1e-12);
//! assert!((result.zne - 1.0).abs() < 1e-12);
//! // the fit saturates at 1, which is flagged
//! assert_eq!(result.warnings.len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod extrapolate;
pub mod orchestrator;
pub mod report;
pub mod stage;

pub use config::{Dispatch, MitigationConfig};
pub use error::{
    ExecutorError, ExecutorResult, ExtrapolationError, MitigationError, QmitResult,
};
pub use executor::{Executor, FnExecutor};
pub use extrapolate::{
    BOUNDARY_TOLERANCE, Estimate, OutOfRangeWarning, extrapolate, least_squares, richardson,
};
pub use orchestrator::{
    CancelToken, ExecutionRecord, MitigationResult, MitigationRun, MitigationWarning, Mitigator,
    run, run_with_cancel,
};
pub use report::MitigationReport;
pub use stage::{CircuitRole, Stage};
