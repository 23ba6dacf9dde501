//! Dynamical-decoupling pulse sequences.

use serde::{Deserialize, Serialize};

use qmit_ir::{Gate, QubitId, StandardGate};

use crate::durations::DurationTable;
use crate::error::{CompileError, CompileResult};
use crate::unitary::Unitary2x2;

/// Label attached to every inserted pulse.
pub const DD_LABEL: &str = "dd";

/// An ordered list of single-qubit gates inserted into idle windows.
///
/// The composed effect of a sequence must be the identity (up to a global
/// phase); see [`PulseSequence::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseSequence {
    /// X · X
    #[default]
    Xx,
    /// X · Y · X · Y
    Xy4,
    /// User-supplied gates.
    Custom(Vec<Gate>),
}

impl PulseSequence {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &str {
        match self {
            PulseSequence::Xx => "xx",
            PulseSequence::Xy4 => "xy4",
            PulseSequence::Custom(_) => "custom",
        }
    }

    /// The gates of the sequence, in application order, labeled [`DD_LABEL`].
    pub fn gates(&self) -> Vec<Gate> {
        let gates = match self {
            PulseSequence::Xx => vec![StandardGate::X.into(), StandardGate::X.into()],
            PulseSequence::Xy4 => vec![
                StandardGate::X.into(),
                StandardGate::Y.into(),
                StandardGate::X.into(),
                StandardGate::Y.into(),
            ],
            PulseSequence::Custom(gates) => gates.clone(),
        };
        gates
            .into_iter()
            .map(|g: Gate| g.with_label(DD_LABEL))
            .collect()
    }

    /// Check that the sequence is non-empty, single-qubit, and composes to the
    /// identity.
    ///
    /// Adjacent inverse pairs are cancelled symbolically first, so opaque
    /// custom gates declared self-inverse (e.g. `[G, G]`) pass. Whatever is
    /// left must consist of standard gates whose matrix product is the
    /// identity up to global phase.
    pub fn validate(&self) -> CompileResult<()> {
        let asymmetric = |reason: String| CompileError::AsymmetricSequence {
            sequence: self.name().to_string(),
            reason,
        };

        let gates = self.gates();
        if gates.is_empty() {
            return Err(asymmetric("sequence is empty".into()));
        }
        if let Some(g) = gates.iter().find(|g| g.num_qubits() != 1) {
            return Err(asymmetric(format!(
                "'{}' acts on {} qubits",
                g.name(),
                g.num_qubits()
            )));
        }

        let mut stack: Vec<&Gate> = Vec::with_capacity(gates.len());
        for gate in &gates {
            match stack.last() {
                Some(top) if top.is_inverse_of(gate) => {
                    stack.pop();
                }
                _ => stack.push(gate),
            }
        }
        if stack.is_empty() {
            return Ok(());
        }

        let mut product = Unitary2x2::identity();
        for gate in stack {
            let m = gate
                .as_standard()
                .and_then(Unitary2x2::from_standard)
                .ok_or_else(|| {
                    asymmetric(format!("'{}' does not cancel against a neighbour", gate.name()))
                })?;
            product = m * product;
        }
        if product.is_identity() {
            Ok(())
        } else {
            Err(asymmetric("pulses do not compose to the identity".into()))
        }
    }

    /// Total time the sequence occupies on `qubit`.
    pub fn total_duration(&self, qubit: QubitId, durations: &DurationTable) -> CompileResult<u64> {
        self.gates().iter().try_fold(0u64, |acc, g| {
            durations
                .get(g.name(), &[qubit])
                .map(|d| acc + d)
                .ok_or_else(|| CompileError::MissingDuration {
                    gate: g.name().to_string(),
                    qubits: vec![qubit],
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmit_ir::CustomGate;

    #[test]
    fn test_presets_validate() {
        PulseSequence::Xx.validate().unwrap();
        PulseSequence::Xy4.validate().unwrap();
    }

    #[test]
    fn test_gates_are_labeled() {
        let gates = PulseSequence::Xy4.gates();
        assert_eq!(gates.len(), 4);
        assert!(gates.iter().all(|g| g.label.as_deref() == Some(DD_LABEL)));
        assert_eq!(gates[1].name(), "y");
    }

    #[test]
    fn test_custom_self_inverse_pair() {
        let g: Gate = CustomGate::new("g", 1).self_inverse().into();
        PulseSequence::Custom(vec![g.clone(), g]).validate().unwrap();
    }

    #[test]
    fn test_custom_opaque_without_inverse_fails() {
        let g: Gate = CustomGate::new("g", 1).into();
        let err = PulseSequence::Custom(vec![g.clone(), g]).validate().unwrap_err();
        assert!(matches!(err, CompileError::AsymmetricSequence { .. }));
    }

    #[test]
    fn test_custom_matrix_identity() {
        // S·S·Z = I, none adjacent-cancel symbolically
        let seq = PulseSequence::Custom(vec![
            StandardGate::S.into(),
            StandardGate::S.into(),
            StandardGate::Z.into(),
        ]);
        seq.validate().unwrap();
    }

    #[test]
    fn test_single_x_rejected() {
        let err = PulseSequence::Custom(vec![StandardGate::X.into()])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("custom"));
    }

    #[test]
    fn test_empty_and_multi_qubit_rejected() {
        assert!(PulseSequence::Custom(vec![]).validate().is_err());
        let cx = PulseSequence::Custom(vec![StandardGate::CX.into(), StandardGate::CX.into()]);
        assert!(cx.validate().is_err());
    }

    #[test]
    fn test_total_duration() {
        let table = DurationTable::new()
            .with_gate("x", 50)
            .with_gate("y", 60)
            .with_override("x", [QubitId(1)], 80);
        assert_eq!(PulseSequence::Xx.total_duration(QubitId(0), &table).unwrap(), 100);
        assert_eq!(PulseSequence::Xx.total_duration(QubitId(1), &table).unwrap(), 160);
        assert_eq!(PulseSequence::Xy4.total_duration(QubitId(0), &table).unwrap(), 220);
        assert!(PulseSequence::Xx
            .total_duration(QubitId(0), &DurationTable::new())
            .is_err());
    }

    #[test]
    fn test_serde_names() {
        let seq: PulseSequence = serde_json::from_str("\"xy4\"").unwrap();
        assert_eq!(seq, PulseSequence::Xy4);
        assert_eq!(serde_json::to_string(&PulseSequence::Xx).unwrap(), "\"xx\"");
    }
}
