//! Benchmarks for folding and decoupling
//!
//! Run with: cargo bench -p qmit-compile

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qmit_compile::{DurationTable, PulseSequence, alap_schedule, fold, insert_decoupling};
use qmit_ir::{Circuit, QubitId};

/// A layered circuit with staggered idle time on every other qubit.
fn layered(num_qubits: u32, layers: u32) -> Circuit {
    let mut circuit = Circuit::with_size("bench", num_qubits, num_qubits);
    for layer in 0..layers {
        for q in 0..num_qubits {
            if (q + layer) % 2 == 0 {
                circuit.h(QubitId(q)).unwrap();
            }
        }
        for q in (layer % 2..num_qubits.saturating_sub(1)).step_by(2) {
            circuit.cx(QubitId(q), QubitId(q + 1)).unwrap();
        }
    }
    circuit.measure_all().unwrap();
    circuit
}

fn bench_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("fold");
    let circuit = layered(10, 50);

    for scale in &[1u32, 3, 5, 9] {
        group.bench_with_input(BenchmarkId::new("exact", scale), scale, |b, &s| {
            b.iter(|| fold(black_box(&circuit), black_box(s)).unwrap());
        });
    }

    group.finish();
}

fn bench_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("alap_schedule");
    let durations = DurationTable::ibm_eagle();

    for num_qubits in &[5u32, 20, 50] {
        let circuit = layered(*num_qubits, 100);
        group.bench_with_input(
            BenchmarkId::new("layered", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| alap_schedule(black_box(circuit), &durations).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_decoupling(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_decoupling");
    let durations = DurationTable::ibm_eagle();
    let circuit = layered(20, 100);

    for (name, seq) in [("xx", PulseSequence::Xx), ("xy4", PulseSequence::Xy4)] {
        group.bench_function(name, |b| {
            b.iter(|| insert_decoupling(black_box(&circuit), &seq, &durations).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fold, bench_schedule, bench_decoupling);
criterion_main!(benches);
