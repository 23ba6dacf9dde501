//! Pipeline stages and the circuits that feed them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A mitigation strategy, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stage {
    /// Unmodified circuit.
    Raw,
    /// Dynamical decoupling only.
    Dd,
    /// Zero-noise extrapolation on the base circuit.
    Zne,
    /// Zero-noise extrapolation on the decoupled circuit.
    Hybrid,
}

impl Stage {
    /// All stages in dispatch order.
    pub const ALL: [Stage; 4] = [Stage::Raw, Stage::Dd, Stage::Zne, Stage::Hybrid];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Raw => "RAW",
            Stage::Dd => "DD",
            Stage::Zne => "ZNE",
            Stage::Hybrid => "HYBRID",
        })
    }
}

/// Which transformed circuit an execution ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "scale", rename_all = "snake_case")]
pub enum CircuitRole {
    /// The base circuit.
    Base,
    /// The base circuit with decoupling pulses.
    Decoupled,
    /// The base circuit folded to a scale > 1.
    Folded(u32),
    /// The decoupled circuit folded to a scale > 1.
    FoldedDecoupled(u32),
}

impl CircuitRole {
    /// The stage whose dispatch runs this circuit.
    pub fn stage(self) -> Stage {
        match self {
            CircuitRole::Base => Stage::Raw,
            CircuitRole::Decoupled => Stage::Dd,
            CircuitRole::Folded(_) => Stage::Zne,
            CircuitRole::FoldedDecoupled(_) => Stage::Hybrid,
        }
    }

    /// Noise-scale factor of the circuit.
    pub fn scale(self) -> u32 {
        match self {
            CircuitRole::Base | CircuitRole::Decoupled => 1,
            CircuitRole::Folded(s) | CircuitRole::FoldedDecoupled(s) => s,
        }
    }
}

impl fmt::Display for CircuitRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitRole::Base => f.write_str("base"),
            CircuitRole::Decoupled => f.write_str("decoupled"),
            CircuitRole::Folded(s) => write!(f, "folded x{s}"),
            CircuitRole::FoldedDecoupled(s) => write!(f, "decoupled folded x{s}"),
        }
    }
}
