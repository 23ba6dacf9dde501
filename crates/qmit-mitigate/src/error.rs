//! Error types for the mitigation pipeline.

use std::time::Duration;
use thiserror::Error;

use qmit_compile::CompileError;

use crate::stage::{CircuitRole, Stage};

/// Errors returned by an [`Executor`](crate::Executor).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExecutorError {
    /// The executor could not run the circuit.
    #[error("Execution failed: {0}")]
    Failed(String),

    /// The circuit is not acceptable to this executor.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// The executor has no implementation for a gate.
    #[error("Unsupported gate: {0}")]
    UnsupportedGate(String),

    /// Shot count rejected.
    #[error("Invalid shot count: {0}")]
    InvalidShots(u32),

    /// The executor returned something that is not a probability.
    #[error("Executor returned {0}, expected a probability in [0, 1]")]
    InvalidProbability(f64),
}

/// Result type for executor calls.
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Errors from fitting measured points.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ExtrapolationError {
    /// No points were given.
    #[error("No points to extrapolate")]
    Empty,

    /// Two points share a scale factor.
    #[error("Degenerate scale factors: {0} appears twice")]
    DegenerateScales(f64),

    /// Scale factors are not strictly increasing.
    #[error("Scale factors must be strictly increasing, got {previous} before {next}")]
    UnorderedScales {
        /// Earlier scale.
        previous: f64,
        /// Later, smaller scale.
        next: f64,
    },

    /// A scale or value is NaN or infinite.
    #[error("Non-finite point ({scale}, {value})")]
    NonFinite {
        /// Scale of the point.
        scale: f64,
        /// Value of the point.
        value: f64,
    },
}

/// Errors that abort a mitigation run.
///
/// Every variant raised during a run names the stage that failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MitigationError {
    /// Configuration rejected before any work was done.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configured noise-scale factor is not an odd integer >= 1.
    #[error("Invalid configuration: {0}")]
    InvalidScale(#[source] CompileError),

    /// The configured scale factors do not give two distinct points to fit.
    #[error("Invalid configuration: degenerate scale factors {scales:?}")]
    DegenerateScales {
        /// The configured factors.
        scales: Vec<u32>,
    },

    /// Reading a configuration or writing a report failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding a report failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Building a transformed circuit failed.
    #[error("{stage} stage: transform failed: {source}")]
    Transform {
        /// Stage that needed the circuit.
        stage: Stage,
        /// Underlying error.
        #[source]
        source: CompileError,
    },

    /// Executor failure.
    #[error("{stage} stage: execution of {role} circuit failed: {source}")]
    Execution {
        /// Stage being executed.
        stage: Stage,
        /// Circuit that was running.
        role: CircuitRole,
        /// Underlying error.
        #[source]
        source: ExecutorError,
    },

    /// Executor did not answer within the configured timeout.
    #[error("{stage} stage: execution of {role} circuit timed out after {timeout:?}")]
    ExecutionTimeout {
        /// Stage being executed.
        stage: Stage,
        /// Circuit that was running.
        role: CircuitRole,
        /// Configured timeout.
        timeout: Duration,
    },

    /// Fitting failed.
    #[error("{stage} stage: extrapolation failed: {source}")]
    Extrapolation {
        /// Stage being fitted.
        stage: Stage,
        /// Underlying error.
        #[source]
        source: ExtrapolationError,
    },

    /// The run was cancelled before `stage` was dispatched.
    #[error("Cancelled before {stage} stage")]
    Cancelled {
        /// First stage not dispatched.
        stage: Stage,
    },
}

impl MitigationError {
    /// The stage that failed, if the error arose during a run.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            MitigationError::Transform { stage, .. }
            | MitigationError::Execution { stage, .. }
            | MitigationError::ExecutionTimeout { stage, .. }
            | MitigationError::Extrapolation { stage, .. }
            | MitigationError::Cancelled { stage } => Some(*stage),
            MitigationError::InvalidConfig(_)
            | MitigationError::InvalidScale(_)
            | MitigationError::DegenerateScales { .. }
            | MitigationError::Io(_)
            | MitigationError::Serialization(_) => None,
        }
    }
}

/// Result type for mitigation operations.
pub type QmitResult<T> = Result<T, MitigationError>;
