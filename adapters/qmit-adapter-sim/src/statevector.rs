//! Statevector simulation engine.

use num_complex::Complex64;

use qmit_compile::Unitary2x2;
use qmit_ir::{Circuit, GateKind, Instruction, InstructionKind, StandardGate};
use qmit_mitigate::{ExecutorError, ExecutorResult};

/// A pure state of `num_qubits` qubits. Qubit `k` is bit `k` of the basis
/// index.
#[derive(Debug, Clone)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Evolve |0...0⟩ through the unitary part of `circuit`.
    ///
    /// Measurements are treated as terminal: a gate on a qubit after its
    /// measurement is rejected as [`ExecutorError::InvalidCircuit`].
    pub fn from_circuit(circuit: &Circuit) -> ExecutorResult<Self> {
        let mut sv = Self::new(circuit.num_qubits() as usize);
        let mut measured = vec![false; sv.num_qubits];
        for (index, inst) in circuit.instructions().iter().enumerate() {
            if inst.is_measure() {
                measured[inst.qubits[0].index()] = true;
                continue;
            }
            if inst.is_gate() {
                if let Some(q) = inst.qubits.iter().find(|q| measured[q.index()]) {
                    return Err(ExecutorError::InvalidCircuit(format!(
                        "'{}' at index {index} acts on {q} after it was measured",
                        inst.name()
                    )));
                }
            }
            sv.apply(inst)?;
        }
        Ok(sv)
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The amplitudes, indexed by basis state.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// `|⟨self|other⟩|²`.
    pub fn fidelity(&self, other: &Statevector) -> f64 {
        self.amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum::<Complex64>()
            .norm_sqr()
    }

    /// Apply an instruction to the statevector.
    pub fn apply(&mut self, instruction: &Instruction) -> ExecutorResult<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
                match &gate.kind {
                    GateKind::Standard(g) => self.apply_standard_gate(g, &qubits),
                    GateKind::Custom(g) => Err(ExecutorError::UnsupportedGate(g.name.clone())),
                }
            }
            // Neither changes the state before the final readout.
            InstructionKind::Measure | InstructionKind::Barrier => Ok(()),
        }
    }

    /// Apply a standard gate.
    fn apply_standard_gate(&mut self, gate: &StandardGate, qubits: &[usize]) -> ExecutorResult<()> {
        if let Some(m) = Unitary2x2::from_standard(gate) {
            self.apply_single(qubits[0], &m);
            return Ok(());
        }

        match gate {
            // Two-qubit gates
            StandardGate::CX => self.apply_controlled(qubits[0], qubits[1], &Unitary2x2::x()),
            StandardGate::CY => self.apply_controlled(qubits[0], qubits[1], &Unitary2x2::y()),
            StandardGate::CZ => self.apply_controlled(qubits[0], qubits[1], &Unitary2x2::z()),
            StandardGate::CH => self.apply_controlled(qubits[0], qubits[1], &Unitary2x2::h()),
            StandardGate::CRx(t) => {
                self.apply_controlled(qubits[0], qubits[1], &Unitary2x2::rx(*t));
            }
            StandardGate::CRy(t) => {
                self.apply_controlled(qubits[0], qubits[1], &Unitary2x2::ry(*t));
            }
            StandardGate::CRz(t) => {
                self.apply_controlled(qubits[0], qubits[1], &Unitary2x2::rz(*t));
            }
            StandardGate::CP(t) => {
                self.apply_controlled(qubits[0], qubits[1], &Unitary2x2::p(*t));
            }
            StandardGate::Swap => self.apply_swap(qubits[0], qubits[1]),
            StandardGate::RZZ(t) => self.apply_rzz(qubits[0], qubits[1], *t),
            StandardGate::RXX(t) => {
                // (H ⊗ H) RZZ (H ⊗ H)
                let h = Unitary2x2::h();
                self.apply_single(qubits[0], &h);
                self.apply_single(qubits[1], &h);
                self.apply_rzz(qubits[0], qubits[1], *t);
                self.apply_single(qubits[0], &h);
                self.apply_single(qubits[1], &h);
            }
            StandardGate::RYY(t) => {
                // (SH ⊗ SH) RZZ (H·Sdg ⊗ H·Sdg)
                let basis_in = Unitary2x2::h() * Unitary2x2::p(-std::f64::consts::FRAC_PI_2);
                let basis_out = basis_in.dagger();
                self.apply_single(qubits[0], &basis_in);
                self.apply_single(qubits[1], &basis_in);
                self.apply_rzz(qubits[0], qubits[1], *t);
                self.apply_single(qubits[0], &basis_out);
                self.apply_single(qubits[1], &basis_out);
            }

            // Three-qubit gates
            StandardGate::CCX => self.apply_ccx(qubits[0], qubits[1], qubits[2]),
            StandardGate::CSwap => self.apply_cswap(qubits[0], qubits[1], qubits[2]),

            other => return Err(ExecutorError::UnsupportedGate(other.name().to_string())),
        }
        Ok(())
    }

    // =========================================================================
    // Gate kernels
    // =========================================================================

    fn apply_single(&mut self, qubit: usize, m: &Unitary2x2) {
        let mask = 1 << qubit;
        let [a, b, c, d] = m.data;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let x = self.amplitudes[i];
                let y = self.amplitudes[j];
                self.amplitudes[i] = a * x + b * y;
                self.amplitudes[j] = c * x + d * y;
            }
        }
    }

    fn apply_controlled(&mut self, control: usize, target: usize, m: &Unitary2x2) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        let [a, b, c, d] = m.data;
        for i in 0..(1 << self.num_qubits) {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let x = self.amplitudes[i];
                let y = self.amplitudes[j];
                self.amplitudes[i] = a * x + b * y;
                self.amplitudes[j] = c * x + d * y;
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..(1 << self.num_qubits) {
            let b1 = (i & mask1) != 0;
            let b2 = (i & mask2) != 0;
            if b1 && !b2 {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_rzz(&mut self, q1: usize, q2: usize, theta: f64) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        let even = Complex64::from_polar(1.0, -theta / 2.0);
        let odd = Complex64::from_polar(1.0, theta / 2.0);
        for i in 0..(1 << self.num_qubits) {
            let parity = ((i & mask1) != 0) ^ ((i & mask2) != 0);
            self.amplitudes[i] *= if parity { odd } else { even };
        }
    }

    fn apply_ccx(&mut self, c1: usize, c2: usize, target: usize) {
        let c1_mask = 1 << c1;
        let c2_mask = 1 << c2;
        let tgt_mask = 1 << target;
        for i in 0..(1 << self.num_qubits) {
            if (i & c1_mask != 0) && (i & c2_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_cswap(&mut self, control: usize, t1: usize, t2: usize) {
        let ctrl_mask = 1 << control;
        let t1_mask = 1 << t1;
        let t2_mask = 1 << t2;
        for i in 0..(1 << self.num_qubits) {
            if i & ctrl_mask != 0 {
                let b1 = (i & t1_mask) != 0;
                let b2 = (i & t2_mask) != 0;
                if b1 && !b2 {
                    let j = (i & !t1_mask) | t2_mask;
                    self.amplitudes.swap(i, j);
                }
            }
        }
    }
}

/// Probability that measuring `circuit` yields `target` on its classical bits.
///
/// `target` lists the classical bits highest index first, so `"10"` means
/// `c1 = 1, c0 = 0`. Bits never written by a measurement read as 0. When
/// several measurements write the same bit the last one counts.
pub fn outcome_probability(circuit: &Circuit, target: &str) -> ExecutorResult<f64> {
    let num_clbits = circuit.num_clbits() as usize;
    if target.len() != num_clbits || target.chars().any(|c| c != '0' && c != '1') {
        return Err(ExecutorError::InvalidCircuit(format!(
            "target '{target}' does not match {num_clbits} classical bits"
        )));
    }
    let wanted: Vec<bool> = target.bytes().rev().map(|b| b == b'1').collect();

    let mut source: Vec<Option<usize>> = vec![None; num_clbits];
    for inst in circuit.instructions().iter().filter(|i| i.is_measure()) {
        source[inst.clbits[0].index()] = Some(inst.qubits[0].index());
    }
    if source
        .iter()
        .zip(&wanted)
        .any(|(src, want)| src.is_none() && *want)
    {
        return Ok(0.0);
    }
    let checks: Vec<(usize, bool)> = source
        .iter()
        .zip(&wanted)
        .filter_map(|(src, want)| src.map(|q| (1usize << q, *want)))
        .collect();

    let sv = Statevector::from_circuit(circuit)?;
    let p: f64 = sv
        .amplitudes()
        .iter()
        .enumerate()
        .filter(|(i, _)| checks.iter().all(|&(mask, want)| (i & mask != 0) == want))
        .map(|(_, amp)| amp.norm_sqr())
        .sum();
    Ok(p.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmit_ir::{ClbitId, CustomGate, QubitId};

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(sv.amplitudes[1..].iter().all(|a| a.norm() < 1e-12));
    }

    #[test]
    fn test_bell_state() {
        let sv = Statevector::from_circuit(&Circuit::bell().unwrap()).unwrap();
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(sqrt2_inv, 0.0)));
    }

    #[test]
    fn test_bell_outcomes() {
        let bell = Circuit::bell().unwrap();
        assert!(approx(outcome_probability(&bell, "11").unwrap(), 0.5));
        assert!(approx(outcome_probability(&bell, "00").unwrap(), 0.5));
        assert!(approx(outcome_probability(&bell, "01").unwrap(), 0.0));
    }

    #[test]
    fn test_bit_order() {
        // only q0 flipped: c0 = 1, c1 = 0
        let mut c = Circuit::with_size("t", 2, 2);
        c.x(QubitId(0)).unwrap().measure_all().unwrap();
        assert!(approx(outcome_probability(&c, "01").unwrap(), 1.0));
        assert!(approx(outcome_probability(&c, "10").unwrap(), 0.0));
    }

    #[test]
    fn test_grover_finds_marked_state() {
        // one iteration over 8 states: 25/32
        let p = outcome_probability(&Circuit::grover3().unwrap(), "111").unwrap();
        assert!(approx(p, 0.78125), "p = {p}");
    }

    #[test]
    fn test_ghz() {
        let ghz = Circuit::ghz(4).unwrap();
        assert!(approx(outcome_probability(&ghz, "1111").unwrap(), 0.5));
    }

    #[test]
    fn test_parametric_two_qubit_gates() {
        let theta = 0.7;
        // RXX(θ)|00⟩ = cos(θ/2)|00⟩ - i sin(θ/2)|11⟩
        for gate in ["rxx", "ryy"] {
            let mut c = Circuit::with_size(gate, 2, 2);
            if gate == "rxx" {
                c.rxx(theta, QubitId(0), QubitId(1)).unwrap();
            } else {
                c.ryy(theta, QubitId(0), QubitId(1)).unwrap();
            }
            c.measure_all().unwrap();
            let p11 = outcome_probability(&c, "11").unwrap();
            assert!(approx(p11, (theta / 2.0).sin().powi(2)), "{gate}: {p11}");
        }

        // RZZ only adds phases
        let mut c = Circuit::with_size("rzz", 2, 2);
        c.h(QubitId(0)).unwrap();
        c.rzz(theta, QubitId(0), QubitId(1)).unwrap();
        c.h(QubitId(0)).unwrap();
        c.measure_all().unwrap();
        let p00 = outcome_probability(&c, "00").unwrap();
        assert!(approx(p00, (theta / 2.0).cos().powi(2)));
    }

    #[test]
    fn test_controlled_rotation() {
        let mut c = Circuit::with_size("cry", 2, 2);
        c.x(QubitId(0)).unwrap();
        c.cry(std::f64::consts::PI, QubitId(0), QubitId(1)).unwrap();
        c.measure_all().unwrap();
        assert!(approx(outcome_probability(&c, "11").unwrap(), 1.0));
    }

    #[test]
    fn test_unmeasured_bit_reads_zero() {
        let mut c = Circuit::with_size("t", 1, 2);
        c.x(QubitId(0)).unwrap();
        c.measure(QubitId(0), ClbitId(0)).unwrap();
        assert!(approx(outcome_probability(&c, "01").unwrap(), 1.0));
        assert!(approx(outcome_probability(&c, "11").unwrap(), 0.0));
    }

    #[test]
    fn test_bad_target() {
        let bell = Circuit::bell().unwrap();
        assert!(matches!(
            outcome_probability(&bell, "1"),
            Err(ExecutorError::InvalidCircuit(_))
        ));
        assert!(outcome_probability(&bell, "1x").is_err());
    }

    #[test]
    fn test_gate_after_measure_rejected() {
        let mut c = Circuit::with_size("t", 1, 1);
        c.measure(QubitId(0), ClbitId(0)).unwrap();
        c.x(QubitId(0)).unwrap();
        assert!(matches!(
            Statevector::from_circuit(&c),
            Err(ExecutorError::InvalidCircuit(_))
        ));
    }

    #[test]
    fn test_custom_gate_unsupported() {
        let mut c = Circuit::with_size("t", 1, 0);
        c.gate(CustomGate::new("g", 1).self_inverse(), [QubitId(0)])
            .unwrap();
        assert!(matches!(
            Statevector::from_circuit(&c),
            Err(ExecutorError::UnsupportedGate(ref name)) if name == "g"
        ));
    }

    #[test]
    fn test_fidelity() {
        let a = Statevector::from_circuit(&Circuit::bell().unwrap()).unwrap();
        assert!(approx(a.fidelity(&a), 1.0));
        assert!(approx(a.fidelity(&Statevector::new(2)), 0.5));
    }
}
