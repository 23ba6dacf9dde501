//! qmit ideal statevector executor
//!
//! This crate provides a noiseless [`Executor`](qmit_mitigate::Executor) for
//! testing transforms and for dry runs of the mitigation pipeline. It evolves
//! the full statevector, so it is limited to ~20 qubits.
//!
//! # Features
//!
//! - **Exact mode**: returns the true probability of the target outcome
//! - **Seeded sampling**: draws `shots` samples, reproducible given the seed
//! - **All standard gates** from `qmit-ir`; custom gates are rejected
//!
//! Folding and decoupling leave the ideal outcome distribution unchanged, so
//! under this executor RAW, DD, ZNE and HYBRID agree.
//!
//! # Example
//!
//! ```rust
//! use qmit_adapter_sim::IdealExecutor;
//! use qmit_ir::Circuit;
//!
//! let exec = IdealExecutor::new().with_target("11");
//! let p = exec.probability(&Circuit::bell().unwrap(), 1024).unwrap();
//! assert!((p - 0.5).abs() < 1e-10);
//! ```

mod executor;
mod statevector;

pub use executor::IdealExecutor;
pub use statevector::{Statevector, outcome_probability};
