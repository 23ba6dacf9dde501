//! Dynamical-decoupling insertion into idle windows.

use rustc_hash::FxHashMap;
use tracing::debug;

use qmit_ir::{Circuit, Instruction, QubitId};

use crate::durations::DurationTable;
use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::passes::target::scheduling::{Schedule, alap_schedule};
use crate::property::PropertySet;
use crate::pulse::PulseSequence;

/// Pad idle windows of `circuit` with `sequence`.
///
/// The circuit is scheduled ALAP with `durations`. Every idle window at least
/// as long as the sequence (on that qubit) receives exactly one copy of it,
/// spliced directly before the instruction that ends the window so that the
/// pulses finish when the window does. Shorter windows are left alone, and so
/// is everything after a qubit's first measurement.
///
/// Original instructions keep their order and operands. Pulses placed before
/// the same instruction are grouped by qubit in ascending order.
pub fn insert_decoupling(
    circuit: &Circuit,
    sequence: &PulseSequence,
    durations: &DurationTable,
) -> CompileResult<Circuit> {
    sequence.validate()?;
    let schedule = alap_schedule(circuit, durations)?;

    let mut seq_len: FxHashMap<QubitId, u64> = FxHashMap::default();
    let mut pad_before: Vec<Vec<QubitId>> = vec![Vec::new(); circuit.len()];
    let mut padded = 0usize;
    for window in &schedule.idle {
        let needed = match seq_len.get(&window.qubit) {
            Some(&d) => d,
            None => {
                let d = sequence.total_duration(window.qubit, durations)?;
                seq_len.insert(window.qubit, d);
                d
            }
        };
        if window.len() >= needed {
            pad_before[window.next_instruction].push(window.qubit);
            padded += 1;
        }
    }

    let pulses = sequence.gates();
    let mut out = Circuit::empty_like(circuit);
    for (inst, mut qubits) in circuit.instructions().iter().zip(pad_before) {
        qubits.sort_unstable();
        for q in qubits {
            for gate in &pulses {
                out.push(Instruction::gate(gate.clone(), [q]))?;
            }
        }
        out.push(inst.clone())?;
    }

    debug!(
        "Inserted '{}' into {} of {} idle windows of '{}'",
        sequence.name(),
        padded,
        schedule.idle.len(),
        circuit.name()
    );
    Ok(out)
}

/// Transformation pass wrapping [`insert_decoupling`].
///
/// Requires [`PropertySet::durations`]. Any previously stored [`Schedule`]
/// describes the unpadded circuit and is dropped.
#[derive(Debug, Clone, Default)]
pub struct PadDynamicalDecoupling {
    sequence: PulseSequence,
}

impl PadDynamicalDecoupling {
    /// Pad with the given sequence.
    pub fn new(sequence: PulseSequence) -> Self {
        Self { sequence }
    }
}

impl Pass for PadDynamicalDecoupling {
    fn name(&self) -> &'static str {
        "pad_dynamical_decoupling"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        *circuit = insert_decoupling(circuit, &self.sequence, properties.require_durations()?)?;
        properties.remove::<Schedule>();
        Ok(())
    }
}
