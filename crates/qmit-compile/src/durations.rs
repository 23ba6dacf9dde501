//! Per-gate duration table used by the scheduler.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use qmit_ir::{Instruction, QubitId};

use crate::error::{CompileError, CompileResult};

/// A duration for one gate on one specific operand tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationOverride {
    /// Instruction name, e.g. `"cx"` or `"measure"`.
    pub gate: String,
    /// Exact operand tuple, in instruction order.
    pub qubits: Vec<u32>,
    /// Duration in device time units.
    pub duration: u64,
}

/// Maps `(instruction name, qubits)` to a duration in device time units.
///
/// Lookups try, in order: the instruction's own `duration` field, a
/// qubit-specific override, then the per-name default. Barriers always take
/// zero time.
///
/// ```
/// use qmit_compile::DurationTable;
/// use qmit_ir::{Instruction, QubitId, StandardGate};
///
/// let table = DurationTable::new()
///     .with_gate("x", 50)
///     .with_override("x", [QubitId(1)], 70);
///
/// let x0 = Instruction::single_qubit_gate(StandardGate::X, QubitId(0));
/// let x1 = Instruction::single_qubit_gate(StandardGate::X, QubitId(1));
/// assert_eq!(table.duration_of(&x0).unwrap(), 50);
/// assert_eq!(table.duration_of(&x1).unwrap(), 70);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationTable {
    /// Durations that apply to any operand tuple.
    #[serde(default)]
    gates: FxHashMap<String, u64>,
    /// Operand-specific durations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    overrides: Vec<DurationOverride>,
}

impl DurationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every gate in `names` takes `duration`.
    pub fn uniform<'a>(names: impl IntoIterator<Item = &'a str>, duration: u64) -> Self {
        let mut table = Self::new();
        for name in names {
            table.gates.insert(name.to_string(), duration);
        }
        table
    }

    /// Gate timings of an IBM Eagle-class device (units of `dt`).
    ///
    /// Virtual Z-family gates are free. Gates outside the native set carry the
    /// cost of their usual decomposition.
    pub fn ibm_eagle() -> Self {
        let mut table = Self::new();
        for (name, d) in [
            ("id", 160),
            ("x", 160),
            ("sx", 160),
            ("sxdg", 160),
            ("y", 160),
            ("h", 160),
            ("rz", 0),
            ("z", 0),
            ("s", 0),
            ("sdg", 0),
            ("t", 0),
            ("tdg", 0),
            ("p", 0),
            ("rx", 320),
            ("ry", 320),
            ("u", 320),
            ("cx", 800),
            ("cz", 800),
            ("swap", 2400),
            // six CX plus single-qubit layers
            ("ccx", 6240),
            ("measure", 3200),
        ] {
            table.gates.insert(name.to_string(), d);
        }
        table
    }

    /// Set the default duration of a gate.
    #[must_use]
    pub fn with_gate(mut self, name: impl Into<String>, duration: u64) -> Self {
        self.gates.insert(name.into(), duration);
        self
    }

    /// Set the duration of a gate on a specific operand tuple.
    #[must_use]
    pub fn with_override(
        mut self,
        name: impl Into<String>,
        qubits: impl IntoIterator<Item = QubitId>,
        duration: u64,
    ) -> Self {
        let gate = name.into();
        let qubits: Vec<u32> = qubits.into_iter().map(|q| q.0).collect();
        self.overrides
            .retain(|o| !(o.gate == gate && o.qubits == qubits));
        self.overrides.push(DurationOverride {
            gate,
            qubits,
            duration,
        });
        self
    }

    /// Look up a duration by name and operands.
    pub fn get(&self, name: &str, qubits: &[QubitId]) -> Option<u64> {
        self.overrides
            .iter()
            .find(|o| {
                o.gate == name
                    && o.qubits.len() == qubits.len()
                    && o.qubits.iter().zip(qubits).all(|(a, b)| *a == b.0)
            })
            .map(|o| o.duration)
            .or_else(|| self.gates.get(name).copied())
    }

    /// Duration of an instruction.
    pub fn duration_of(&self, inst: &Instruction) -> CompileResult<u64> {
        if let Some(d) = inst.duration {
            return Ok(d);
        }
        if inst.is_barrier() {
            return Ok(0);
        }
        self.get(inst.name(), &inst.qubits)
            .ok_or_else(|| CompileError::MissingDuration {
                gate: inst.name().to_string(),
                qubits: inst.qubits.clone(),
            })
    }

    /// Number of per-name entries.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Whether the table has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty() && self.overrides.is_empty()
    }
}
