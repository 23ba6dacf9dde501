//! Quantum gate types.

use serde::{Deserialize, Serialize};

/// Standard gates with known semantics.
///
/// Rotation angles are concrete `f64` values in radians; every standard gate
/// has an exact inverse that is itself a standard gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Phase gate.
    P(f64),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(f64, f64, f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,
    /// Controlled rotation around X.
    CRx(f64),
    /// Controlled rotation around Y.
    CRy(f64),
    /// Controlled rotation around Z.
    CRz(f64),
    /// Controlled phase gate.
    CP(f64),
    /// XX rotation gate.
    RXX(f64),
    /// YY rotation gate.
    RYY(f64),
    /// ZZ rotation gate.
    RZZ(f64),

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(_, _, _) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::CRx(_) => "crx",
            StandardGate::CRy(_) => "cry",
            StandardGate::CRz(_) => "crz",
            StandardGate::CP(_) => "cp",
            StandardGate::RXX(_) => "rxx",
            StandardGate::RYY(_) => "ryy",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::SX
            | StandardGate::SXdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_)
            | StandardGate::U(_, _, _) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::CRx(_)
            | StandardGate::CRy(_)
            | StandardGate::CRz(_)
            | StandardGate::CP(_)
            | StandardGate::RXX(_)
            | StandardGate::RYY(_)
            | StandardGate::RZZ(_) => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,
        }
    }

    /// Angles carried by this gate, in declaration order.
    pub fn parameters(&self) -> Vec<f64> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p)
            | StandardGate::CRx(p)
            | StandardGate::CRy(p)
            | StandardGate::CRz(p)
            | StandardGate::CP(p)
            | StandardGate::RXX(p)
            | StandardGate::RYY(p)
            | StandardGate::RZZ(p) => vec![*p],

            StandardGate::U(a, b, c) => vec![*a, *b, *c],

            _ => vec![],
        }
    }

    /// Whether applying the gate twice is the identity.
    ///
    /// Parameterized gates are classified as not self-inverse regardless of
    /// the angle.
    pub fn is_self_inverse(&self) -> bool {
        matches!(
            self,
            StandardGate::I
                | StandardGate::X
                | StandardGate::Y
                | StandardGate::Z
                | StandardGate::H
                | StandardGate::CX
                | StandardGate::CY
                | StandardGate::CZ
                | StandardGate::CH
                | StandardGate::Swap
                | StandardGate::CCX
                | StandardGate::CSwap
        )
    }

    /// The exact inverse of this gate, on the same operands.
    pub fn inverse(&self) -> StandardGate {
        match self {
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::T => StandardGate::Tdg,
            StandardGate::Tdg => StandardGate::T,
            StandardGate::SX => StandardGate::SXdg,
            StandardGate::SXdg => StandardGate::SX,
            StandardGate::Rx(t) => StandardGate::Rx(-t),
            StandardGate::Ry(t) => StandardGate::Ry(-t),
            StandardGate::Rz(t) => StandardGate::Rz(-t),
            StandardGate::P(t) => StandardGate::P(-t),
            StandardGate::U(theta, phi, lambda) => StandardGate::U(-theta, -lambda, -phi),
            StandardGate::CRx(t) => StandardGate::CRx(-t),
            StandardGate::CRy(t) => StandardGate::CRy(-t),
            StandardGate::CRz(t) => StandardGate::CRz(-t),
            StandardGate::CP(t) => StandardGate::CP(-t),
            StandardGate::RXX(t) => StandardGate::RXX(-t),
            StandardGate::RYY(t) => StandardGate::RYY(-t),
            StandardGate::RZZ(t) => StandardGate::RZZ(-t),
            g => g.clone(),
        }
    }
}

/// A quantum gate, either standard or custom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// An opaque user-defined gate.
    Custom(CustomGate),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Custom(g) => &g.name,
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Custom(g) => g.num_qubits,
        }
    }
}

/// An opaque gate known only by name.
///
/// Custom gates have no matrix. Their inverse is represented symbolically by
/// toggling `adjoint`, unless the gate is declared self-inverse, in which case
/// it is its own inverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    /// The name of the gate.
    pub name: String,
    /// The number of qubits it operates on.
    pub num_qubits: u32,
    /// Numeric parameters of the gate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<f64>,
    /// Applying the gate twice is the identity.
    #[serde(default)]
    pub self_inverse: bool,
    /// This is the adjoint of the named gate.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub adjoint: bool,
}

impl CustomGate {
    /// Create a new custom gate.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            params: vec![],
            self_inverse: false,
            adjoint: false,
        }
    }

    /// Add parameters to the gate.
    #[must_use]
    pub fn with_params(mut self, params: Vec<f64>) -> Self {
        self.params = params;
        self
    }

    /// Declare the gate self-inverse.
    #[must_use]
    pub fn self_inverse(mut self) -> Self {
        self.self_inverse = true;
        self
    }

    /// The inverse of this gate.
    pub fn inverse(&self) -> CustomGate {
        let mut inv = self.clone();
        if !self.self_inverse {
            inv.adjoint = !self.adjoint;
        }
        inv
    }
}

/// A gate with associated metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Optional label for the gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Gate {
    /// Create a new gate from a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: GateKind::Standard(gate),
            label: None,
        }
    }

    /// Create a new gate from a custom gate.
    pub fn custom(gate: CustomGate) -> Self {
        Self {
            kind: GateKind::Custom(gate),
            label: None,
        }
    }

    /// Add a label to the gate.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }

    /// Whether applying the gate twice is the identity.
    pub fn is_self_inverse(&self) -> bool {
        match &self.kind {
            GateKind::Standard(g) => g.is_self_inverse(),
            GateKind::Custom(g) => g.self_inverse,
        }
    }

    /// The inverse gate. The label is preserved.
    pub fn inverse(&self) -> Gate {
        let kind = match &self.kind {
            GateKind::Standard(g) => GateKind::Standard(g.inverse()),
            GateKind::Custom(g) => GateKind::Custom(g.inverse()),
        };
        Gate {
            kind,
            label: self.label.clone(),
        }
    }

    /// Whether `other` undoes this gate when applied directly after it.
    ///
    /// Labels are ignored.
    pub fn is_inverse_of(&self, other: &Gate) -> bool {
        self.inverse().kind == other.kind
    }

    /// The standard gate, if this is one.
    pub fn as_standard(&self) -> Option<&StandardGate> {
        match &self.kind {
            GateKind::Standard(g) => Some(g),
            GateKind::Custom(_) => None,
        }
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

impl From<CustomGate> for Gate {
    fn from(gate: CustomGate) -> Self {
        Gate::custom(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);
        assert_eq!(StandardGate::U(1.0, 2.0, 3.0).parameters(), vec![1.0, 2.0, 3.0]);
        assert!(StandardGate::H.parameters().is_empty());
    }

    #[test]
    fn test_self_inverse_classification() {
        assert!(StandardGate::X.is_self_inverse());
        assert!(StandardGate::CSwap.is_self_inverse());
        assert!(!StandardGate::S.is_self_inverse());
        // Rx(2π) is -I but still classified conservatively.
        assert!(!StandardGate::Rx(2.0 * PI).is_self_inverse());
    }

    #[test]
    fn test_inverse_pairs() {
        assert_eq!(StandardGate::S.inverse(), StandardGate::Sdg);
        assert_eq!(StandardGate::SXdg.inverse(), StandardGate::SX);
        assert_eq!(StandardGate::Rz(0.3).inverse(), StandardGate::Rz(-0.3));
        assert_eq!(
            StandardGate::U(0.1, 0.2, 0.3).inverse(),
            StandardGate::U(-0.1, -0.3, -0.2)
        );
        assert_eq!(StandardGate::CX.inverse(), StandardGate::CX);
    }

    #[test]
    fn test_gate_creation() {
        let h = Gate::standard(StandardGate::H);
        assert_eq!(h.name(), "h");
        assert_eq!(h.num_qubits(), 1);
        assert!(h.label.is_none());

        let h_labeled = Gate::standard(StandardGate::H).with_label("my_hadamard");
        assert_eq!(h_labeled.label, Some("my_hadamard".to_string()));
    }

    #[test]
    fn test_custom_gate_inverse() {
        let g = CustomGate::new("g", 1).self_inverse();
        assert_eq!(g.inverse(), g);

        let v = CustomGate::new("v", 1).with_params(vec![PI / 4.0]);
        let v_inv = v.inverse();
        assert!(v_inv.adjoint);
        assert_eq!(v_inv.inverse(), v);

        let gate = Gate::custom(v.clone());
        assert!(gate.is_inverse_of(&Gate::custom(v_inv)));
        assert!(!gate.is_inverse_of(&gate));
    }

    #[test]
    fn test_inverse_ignores_label() {
        let x = Gate::standard(StandardGate::X).with_label("dd");
        assert!(x.is_inverse_of(&Gate::standard(StandardGate::X)));
    }
}
