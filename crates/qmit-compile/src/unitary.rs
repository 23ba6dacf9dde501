//! 2×2 unitary algebra for single-qubit gates.
//!
//! Used to check that a pulse sequence composes to the identity and by the
//! statevector adapter to apply single-qubit gates.

use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

use qmit_ir::StandardGate;

/// Tolerance for floating point comparisons.
const EPSILON: f64 = 1e-10;

#[inline]
fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// A 2x2 unitary matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unitary2x2 {
    /// The matrix elements in row-major order: [[a, b], [c, d]].
    pub data: [Complex64; 4],
}

impl Unitary2x2 {
    /// Create a new 2x2 unitary matrix.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    fn diag(a: Complex64, d: Complex64) -> Self {
        Self::new(a, c(0.0, 0.0), c(0.0, 0.0), d)
    }

    /// Create the identity matrix.
    pub fn identity() -> Self {
        Self::diag(c(1.0, 0.0), c(1.0, 0.0))
    }

    /// Hadamard.
    pub fn h() -> Self {
        let s = FRAC_1_SQRT_2;
        Self::new(c(s, 0.0), c(s, 0.0), c(s, 0.0), c(-s, 0.0))
    }

    /// Pauli-X.
    pub fn x() -> Self {
        Self::new(c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0))
    }

    /// Pauli-Y.
    pub fn y() -> Self {
        Self::new(c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0))
    }

    /// Pauli-Z.
    pub fn z() -> Self {
        Self::diag(c(1.0, 0.0), c(-1.0, 0.0))
    }

    /// sqrt(X).
    pub fn sx() -> Self {
        let (p, m) = (c(0.5, 0.5), c(0.5, -0.5));
        Self::new(p, m, m, p)
    }

    /// RX rotation.
    pub fn rx(theta: f64) -> Self {
        let (cos, sin) = ((theta / 2.0).cos(), (theta / 2.0).sin());
        Self::new(c(cos, 0.0), c(0.0, -sin), c(0.0, -sin), c(cos, 0.0))
    }

    /// RY rotation.
    pub fn ry(theta: f64) -> Self {
        let (cos, sin) = ((theta / 2.0).cos(), (theta / 2.0).sin());
        Self::new(c(cos, 0.0), c(-sin, 0.0), c(sin, 0.0), c(cos, 0.0))
    }

    /// RZ rotation.
    pub fn rz(theta: f64) -> Self {
        Self::diag(
            Complex64::from_polar(1.0, -theta / 2.0),
            Complex64::from_polar(1.0, theta / 2.0),
        )
    }

    /// Phase gate P(lambda).
    pub fn p(lambda: f64) -> Self {
        Self::diag(c(1.0, 0.0), Complex64::from_polar(1.0, lambda))
    }

    /// U(theta, phi, lambda).
    pub fn u(theta: f64, phi: f64, lambda: f64) -> Self {
        let (cos, sin) = ((theta / 2.0).cos(), (theta / 2.0).sin());
        Self::new(
            c(cos, 0.0),
            -Complex64::from_polar(sin, lambda),
            Complex64::from_polar(sin, phi),
            Complex64::from_polar(cos, phi + lambda),
        )
    }

    /// Matrix of a single-qubit standard gate.
    ///
    /// Returns `None` for multi-qubit gates.
    pub fn from_standard(gate: &StandardGate) -> Option<Self> {
        use std::f64::consts::FRAC_PI_4;

        let m = match gate {
            StandardGate::I => Self::identity(),
            StandardGate::X => Self::x(),
            StandardGate::Y => Self::y(),
            StandardGate::Z => Self::z(),
            StandardGate::H => Self::h(),
            StandardGate::S => Self::p(2.0 * FRAC_PI_4),
            StandardGate::Sdg => Self::p(-2.0 * FRAC_PI_4),
            StandardGate::T => Self::p(FRAC_PI_4),
            StandardGate::Tdg => Self::p(-FRAC_PI_4),
            StandardGate::SX => Self::sx(),
            StandardGate::SXdg => Self::sx().dagger(),
            StandardGate::Rx(t) => Self::rx(*t),
            StandardGate::Ry(t) => Self::ry(*t),
            StandardGate::Rz(t) => Self::rz(*t),
            StandardGate::P(t) => Self::p(*t),
            StandardGate::U(t, p, l) => Self::u(*t, *p, *l),
            _ => return None,
        };
        Some(m)
    }

    /// Multiply this matrix by another: self * other.
    #[allow(clippy::many_single_char_names)]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Get the conjugate transpose (dagger).
    pub fn dagger(&self) -> Self {
        let [a, b, c, d] = self.data;
        Self::new(a.conj(), c.conj(), b.conj(), d.conj())
    }

    /// Check if this is approximately identity (up to global phase).
    pub fn is_identity(&self) -> bool {
        let [a, b, c, d] = self.data;
        b.norm() < EPSILON && c.norm() < EPSILON && (a - d).norm() < EPSILON
    }
}

impl Default for Unitary2x2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    #[allow(clippy::needless_pass_by_value)]
    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}
