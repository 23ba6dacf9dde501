//! As-late-as-possible scheduling and idle-window analysis.

use serde::{Deserialize, Serialize};
use tracing::debug;

use qmit_ir::{Circuit, QubitId};

use crate::durations::DurationTable;
use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Timing of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Position of the instruction in the circuit.
    pub instruction_index: usize,
    /// Start time, measured from the start of the circuit.
    pub start_time: u64,
    /// `start_time + duration`.
    pub end_time: u64,
}

impl ScheduleEntry {
    /// Duration of the instruction.
    pub fn duration(&self) -> u64 {
        self.end_time - self.start_time
    }
}

/// A window during which a qubit does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdleInterval {
    /// The idle qubit.
    pub qubit: QubitId,
    /// End of the previous instruction on the qubit, or 0.
    pub start: u64,
    /// Start of `next_instruction`.
    pub end: u64,
    /// Index of the instruction that ends the window.
    pub next_instruction: usize,
}

impl IdleInterval {
    /// Length of the window.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Whether the window has zero length.
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Result of [`alap_schedule`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// One entry per instruction, in program order.
    pub entries: Vec<ScheduleEntry>,
    /// End time of the last instruction.
    pub total_duration: u64,
    /// Non-empty idle windows eligible for padding, ordered by qubit then time.
    ///
    /// A qubit contributes windows up to and including the one that ends at
    /// its first measurement. Time after a qubit's last instruction is not
    /// reported.
    pub idle: Vec<IdleInterval>,
}

impl Schedule {
    /// Idle windows of one qubit.
    pub fn idle_on(&self, qubit: QubitId) -> impl Iterator<Item = &IdleInterval> + '_ {
        self.idle.iter().filter(move |w| w.qubit == qubit)
    }

    /// Sum of all idle window lengths.
    pub fn total_idle(&self) -> u64 {
        self.idle.iter().map(IdleInterval::len).sum()
    }
}

/// Schedule every instruction as late as possible.
///
/// Walks the circuit backwards keeping one cursor per qubit and per classical
/// bit, measured from the end of the circuit. Each instruction ends where the
/// latest of its operand cursors sits and pushes those cursors back by its
/// duration. The circuit's total duration is the largest cursor; flipping the
/// reverse times gives forward start/end times. Linear in the instruction
/// count.
pub fn alap_schedule(circuit: &Circuit, durations: &DurationTable) -> CompileResult<Schedule> {
    let insts = circuit.instructions();
    let mut qubit_cursor = vec![0u64; circuit.num_qubits() as usize];
    let mut clbit_cursor = vec![0u64; circuit.num_clbits() as usize];

    // (finish, start) measured from the end
    let mut reverse = vec![(0u64, 0u64); insts.len()];
    for (i, inst) in insts.iter().enumerate().rev() {
        let duration = durations.duration_of(inst)?;
        let finish = inst
            .qubits
            .iter()
            .map(|q| qubit_cursor[q.index()])
            .chain(inst.clbits.iter().map(|c| clbit_cursor[c.index()]))
            .max()
            .unwrap_or(0);
        let start = finish + duration;
        for q in &inst.qubits {
            qubit_cursor[q.index()] = start;
        }
        for c in &inst.clbits {
            clbit_cursor[c.index()] = start;
        }
        reverse[i] = (finish, start);
    }

    let total_duration = qubit_cursor
        .iter()
        .chain(clbit_cursor.iter())
        .copied()
        .max()
        .unwrap_or(0);

    let entries: Vec<ScheduleEntry> = reverse
        .iter()
        .enumerate()
        .map(|(i, &(finish, start))| ScheduleEntry {
            instruction_index: i,
            start_time: total_duration - start,
            end_time: total_duration - finish,
        })
        .collect();

    // Forward pass for idle windows. Program order per qubit equals time
    // order under ALAP, so one sweep suffices.
    let num_qubits = circuit.num_qubits() as usize;
    let mut last_end = vec![0u64; num_qubits];
    let mut measured = vec![false; num_qubits];
    let mut per_qubit: Vec<Vec<IdleInterval>> = vec![Vec::new(); num_qubits];
    for (inst, entry) in insts.iter().zip(&entries) {
        for q in &inst.qubits {
            let qi = q.index();
            if measured[qi] {
                continue;
            }
            if entry.start_time > last_end[qi] {
                per_qubit[qi].push(IdleInterval {
                    qubit: *q,
                    start: last_end[qi],
                    end: entry.start_time,
                    next_instruction: entry.instruction_index,
                });
            }
            last_end[qi] = entry.end_time;
            if inst.is_measure() {
                measured[qi] = true;
            }
        }
    }
    let idle: Vec<IdleInterval> = per_qubit.into_iter().flatten().collect();

    debug!(
        "ALAP schedule for '{}': total {} over {} instructions, {} idle windows",
        circuit.name(),
        total_duration,
        entries.len(),
        idle.len()
    );

    Ok(Schedule {
        entries,
        total_duration,
        idle,
    })
}

/// Analysis pass that stores the ALAP [`Schedule`] in the property set.
///
/// Requires [`PropertySet::durations`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AlapScheduleAnalysis;

impl Pass for AlapScheduleAnalysis {
    fn name(&self) -> &'static str {
        "alap_schedule_analysis"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let schedule = alap_schedule(circuit, properties.require_durations()?)?;
        properties.insert(schedule);
        Ok(())
    }
}
