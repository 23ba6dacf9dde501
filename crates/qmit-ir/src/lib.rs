//! qmit circuit model
//!
//! This crate provides the circuit representation shared by every qmit
//! transform: a flat, ordered instruction list over fixed-size quantum and
//! classical registers.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`]
//! - **Gates**: [`StandardGate`] for built-in gates with exact inverses and
//!   [`CustomGate`] for opaque named operations
//! - **Instructions**: [`Instruction`] combining a gate, barrier or measurement
//!   with its operands and an optional duration override
//! - **Circuit**: [`Circuit`] value type with a builder API
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qmit_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! ```
//!
//! # Example: Inverting an Instruction
//!
//! ```rust
//! use qmit_ir::{Instruction, QubitId, StandardGate};
//!
//! let s = Instruction::single_qubit_gate(StandardGate::S, QubitId(0));
//! let inv = s.inverse().unwrap();
//! assert_eq!(inv.name(), "sdg");
//!
//! // Measurements have no inverse.
//! let m = Instruction::measure(QubitId(0), qmit_ir::ClbitId(0));
//! assert!(m.inverse().is_none());
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Inverse |
//! |------|--------|---------|
//! | `I`, `X`, `Y`, `Z`, `H` | 1 | self |
//! | `S`, `T`, `SX` | 1 | `Sdg`, `Tdg`, `SXdg` |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | negated angle |
//! | `U(θ,φ,λ)` | 1 | `U(-θ,-λ,-φ)` |
//! | `CX`, `CY`, `CZ`, `CH`, `Swap` | 2 | self |
//! | `CRx`, `CRy`, `CRz`, `CP` | 2 | negated angle |
//! | `RXX`, `RYY`, `RZZ` | 2 | negated angle |
//! | `CCX`, `CSwap` | 3 | self |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
