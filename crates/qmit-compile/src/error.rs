//! Error types for circuit transforms.

use thiserror::Error;

use qmit_ir::{IrError, QubitId};

/// Errors raised by folding, scheduling and decoupling.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Noise-scale factor is not an odd integer ≥ 1.
    #[error("Invalid scale factor {0}: must be an odd integer >= 1")]
    InvalidScale(u32),

    /// Pulse sequence does not compose to the identity.
    #[error("Pulse sequence '{sequence}' is not identity-equivalent: {reason}")]
    AsymmetricSequence {
        /// Name of the offending sequence.
        sequence: String,
        /// What made the check fail.
        reason: String,
    },

    /// No duration known for an instruction.
    #[error("No duration for '{gate}' on qubits {}", format_qubits(.qubits))]
    MissingDuration {
        /// Instruction name.
        gate: String,
        /// Operands of the instruction.
        qubits: Vec<QubitId>,
    },

    /// A duration table is required but none was provided.
    #[error("Duration table required but not set")]
    MissingDurationTable,

    /// Local folding was requested for a gate that is not its own inverse.
    #[error("Local folding requires self-inverse gates, but '{gate}' at instruction {index} is not")]
    NotSelfInverse {
        /// Gate name.
        gate: String,
        /// Position of the instruction in the input circuit.
        index: usize,
    },

    /// Error from the circuit model.
    #[error(transparent)]
    Ir(#[from] IrError),
}

fn format_qubits(qubits: &[QubitId]) -> String {
    let names: Vec<String> = qubits.iter().map(ToString::to_string).collect();
    format!("[{}]", names.join(", "))
}

/// Result type for transform operations.
pub type CompileResult<T> = Result<T, CompileError>;
