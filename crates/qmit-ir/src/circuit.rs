//! Circuit value type and builder API.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// A quantum circuit: fixed-size registers and an ordered instruction list.
///
/// Program order is the only ordering the circuit carries. Every qubit and
/// classical bit referenced by an instruction lies within the declared
/// register sizes; [`Circuit::push`] enforces this on insertion and
/// deserialization rejects documents that break it.
///
/// Circuits are plain values. Transformations take `&Circuit` and return a
/// new owned circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedCircuit")]
pub struct Circuit {
    name: String,
    num_qubits: u32,
    num_clbits: u32,
    #[serde(default)]
    instructions: Vec<Instruction>,
}

/// Wire form of [`Circuit`], checked before it becomes one.
#[derive(Deserialize)]
struct UncheckedCircuit {
    name: String,
    num_qubits: u32,
    num_clbits: u32,
    #[serde(default)]
    instructions: Vec<Instruction>,
}

impl TryFrom<UncheckedCircuit> for Circuit {
    type Error = IrError;

    fn try_from(raw: UncheckedCircuit) -> IrResult<Self> {
        let circuit = Circuit {
            name: raw.name,
            num_qubits: raw.num_qubits,
            num_clbits: raw.num_clbits,
            instructions: raw.instructions,
        };
        circuit.validate()?;
        Ok(circuit)
    }
}

impl Circuit {
    /// Create a new empty circuit with no qubits.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_size(name, 0, 0)
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            instructions: vec![],
        }
    }

    /// An empty circuit with the same name and register sizes.
    pub fn empty_like(other: &Circuit) -> Self {
        Self::with_size(other.name.clone(), other.num_qubits, other.num_clbits)
    }

    /// Build a circuit from an instruction list, validating every operand.
    pub fn from_instructions(
        name: impl Into<String>,
        num_qubits: u32,
        num_clbits: u32,
        instructions: impl IntoIterator<Item = Instruction>,
    ) -> IrResult<Self> {
        let mut circuit = Self::with_size(name, num_qubits, num_clbits);
        for inst in instructions {
            circuit.push(inst)?;
        }
        Ok(circuit)
    }

    /// Append an instruction after checking its operands.
    pub fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.check(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    /// Re-check every instruction, e.g. after deserializing.
    pub fn validate(&self) -> IrResult<()> {
        self.instructions.iter().try_for_each(|inst| self.check(inst))
    }

    fn check(&self, inst: &Instruction) -> IrResult<()> {
        let gate_name = || Some(inst.name().to_string());

        for (i, &q) in inst.qubits.iter().enumerate() {
            if q.0 >= self.num_qubits {
                return Err(IrError::QubitNotFound {
                    qubit: q,
                    num_qubits: self.num_qubits,
                    gate_name: gate_name(),
                });
            }
            if inst.qubits[..i].contains(&q) {
                return Err(IrError::DuplicateQubit {
                    qubit: q,
                    gate_name: gate_name(),
                });
            }
        }
        for &c in &inst.clbits {
            if c.0 >= self.num_clbits {
                return Err(IrError::ClbitNotFound {
                    clbit: c,
                    num_clbits: self.num_clbits,
                    gate_name: gate_name(),
                });
            }
        }

        match &inst.kind {
            InstructionKind::Gate(g) => {
                if g.num_qubits() as usize != inst.qubits.len() {
                    return Err(IrError::QubitCountMismatch {
                        gate_name: g.name().to_string(),
                        expected: g.num_qubits(),
                        got: inst.qubits.len() as u32,
                    });
                }
            }
            InstructionKind::Measure => {
                if inst.qubits.len() != 1 || inst.clbits.len() != 1 {
                    return Err(IrError::InvalidMeasurement(format!(
                        "expected one qubit and one classical bit, got {} and {}",
                        inst.qubits.len(),
                        inst.clbits.len()
                    )));
                }
            }
            InstructionKind::Barrier => {}
        }
        Ok(())
    }

    fn apply(&mut self, gate: StandardGate, qubits: &[QubitId]) -> IrResult<&mut Self> {
        self.push(Instruction::gate(gate, qubits.iter().copied()))
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply identity gate.
    pub fn id(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::I, &[qubit])
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::H, &[qubit])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::X, &[qubit])
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Y, &[qubit])
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Z, &[qubit])
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::S, &[qubit])
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Sdg, &[qubit])
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::T, &[qubit])
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Tdg, &[qubit])
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::SX, &[qubit])
    }

    /// Apply sqrt(X)-dagger gate.
    pub fn sxdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::SXdg, &[qubit])
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Rx(theta), &[qubit])
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Ry(theta), &[qubit])
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Rz(theta), &[qubit])
    }

    /// Apply phase gate.
    pub fn p(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::P(theta), &[qubit])
    }

    /// Apply U gate.
    pub fn u(&mut self, theta: f64, phi: f64, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::U(theta, phi, lambda), &[qubit])
    }

    // =========================================================================
    // Multi-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CX, &[control, target])
    }

    /// Apply CY gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CY, &[control, target])
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CZ, &[control, target])
    }

    /// Apply controlled-Hadamard gate.
    pub fn ch(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CH, &[control, target])
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Swap, &[q1, q2])
    }

    /// Apply controlled Rx gate.
    pub fn crx(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CRx(theta), &[control, target])
    }

    /// Apply controlled Ry gate.
    pub fn cry(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CRy(theta), &[control, target])
    }

    /// Apply controlled Rz gate.
    pub fn crz(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CRz(theta), &[control, target])
    }

    /// Apply controlled phase gate.
    pub fn cp(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CP(theta), &[control, target])
    }

    /// Apply XX rotation gate.
    pub fn rxx(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::RXX(theta), &[q1, q2])
    }

    /// Apply YY rotation gate.
    pub fn ryy(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::RYY(theta), &[q1, q2])
    }

    /// Apply ZZ rotation gate.
    pub fn rzz(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::RZZ(theta), &[q1, q2])
    }

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CCX, &[c1, c2, target])
    }

    /// Apply Fredkin (CSWAP) gate.
    pub fn cswap(&mut self, control: QubitId, t1: QubitId, t2: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CSwap, &[control, t1, t2])
    }

    /// Apply an arbitrary gate.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::gate(gate, qubits))
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.push(Instruction::measure(qubit, clbit))
    }

    /// Measure qubit `i` into classical bit `i` for every qubit.
    ///
    /// Grows the classical register if it is smaller than the quantum one.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        self.num_clbits = self.num_clbits.max(self.num_qubits);
        for i in 0..self.num_qubits {
            self.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(self)
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.push(Instruction::barrier(qubits))
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = (0..self.num_qubits).map(QubitId).collect();
        self.push(Instruction::barrier(qubits))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Consume the circuit and return its instructions.
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Total number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of gate instructions (everything except barriers and measurements).
    pub fn num_unitary_ops(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_gate()).count()
    }

    /// Count instructions by name.
    pub fn count_ops(&self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for inst in &self.instructions {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Circuit depth: the longest chain of instructions sharing qubits.
    ///
    /// Barriers synchronize their qubits but do not add a layer.
    pub fn depth(&self) -> usize {
        let mut level = vec![0usize; self.num_qubits as usize];
        let mut clbit_level = vec![0usize; self.num_clbits as usize];
        for inst in &self.instructions {
            let start = inst
                .qubits
                .iter()
                .map(|q| level[q.index()])
                .chain(inst.clbits.iter().map(|c| clbit_level[c.index()]))
                .max()
                .unwrap_or(0);
            let end = if inst.is_barrier() { start } else { start + 1 };
            for q in &inst.qubits {
                level[q.index()] = end;
            }
            for c in &inst.clbits {
                clbit_level[c.index()] = end;
            }
        }
        level.into_iter().max().unwrap_or(0)
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        let q0 = QubitId(0);
        let q1 = QubitId(1);

        circuit
            .h(q0)?
            .cx(q0, q1)?
            .measure(q0, ClbitId(0))?
            .measure(q1, ClbitId(1))?;

        Ok(circuit)
    }

    /// Create a GHZ state circuit.
    pub fn ghz(n: u32) -> IrResult<Self> {
        if n == 0 {
            return Ok(Self::new("ghz_0"));
        }

        let mut circuit = Self::with_size("ghz", n, n);
        circuit.h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }
        circuit.measure_all()?;

        Ok(circuit)
    }

    /// One Grover iteration on three qubits marking |111⟩.
    ///
    /// The ideal probability of measuring `111` is 25/32.
    pub fn grover3() -> IrResult<Self> {
        let mut circuit = Self::with_size("grover3", 3, 3);
        let [q0, q1, q2] = [QubitId(0), QubitId(1), QubitId(2)];

        for q in [q0, q1, q2] {
            circuit.h(q)?;
        }

        // Oracle: CCZ
        circuit.h(q2)?.ccx(q0, q1, q2)?.h(q2)?;

        // Diffusion
        for q in [q0, q1, q2] {
            circuit.h(q)?.x(q)?;
        }
        circuit.h(q2)?.ccx(q0, q1, q2)?.h(q2)?;
        for q in [q0, q1, q2] {
            circuit.x(q)?.h(q)?;
        }

        circuit.measure_all()?;
        Ok(circuit)
    }
}
