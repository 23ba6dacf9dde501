//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur while building or validating a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit index outside the declared register.
    #[error("Qubit {qubit} not found in circuit with {num_qubits} qubits{}", format_gate_context(.gate_name))]
    QubitNotFound {
        /// The offending qubit.
        qubit: QubitId,
        /// Size of the quantum register.
        num_qubits: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Classical bit index outside the declared register.
    #[error("Classical bit {clbit} not found in circuit with {num_clbits} bits{}", format_gate_context(.gate_name))]
    ClbitNotFound {
        /// The offending classical bit.
        clbit: ClbitId,
        /// Size of the classical register.
        num_clbits: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate requires a different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Same qubit used twice in one operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Measurement operands are malformed.
    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),
}

#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
