//! Folding and decoupling leave the ideal final state unchanged.

use proptest::prelude::*;
use qmit_adapter_sim::{Statevector, outcome_probability};
use qmit_compile::{
    DurationTable, FoldPolicy, PulseSequence, ScaleFactor, fold, fold_with_policy,
    insert_decoupling,
};
use qmit_ir::{Circuit, QubitId};

#[derive(Debug, Clone)]
enum Op {
    H(u32),
    X(u32),
    S(u32),
    T(u32),
    Rz(f64, u32),
    Ry(f64, u32),
    Cx(u32, u32),
    Cz(u32, u32),
    Swap(u32, u32),
    Rxx(f64, u32, u32),
    Ccx(u32, u32, u32),
}

impl Op {
    fn apply(self, circuit: &mut Circuit) {
        // invalid operand combinations are rejected by the builder and dropped
        let _ = match self {
            Op::H(q) => circuit.h(QubitId(q)),
            Op::X(q) => circuit.x(QubitId(q)),
            Op::S(q) => circuit.s(QubitId(q)),
            Op::T(q) => circuit.t(QubitId(q)),
            Op::Rz(t, q) => circuit.rz(t, QubitId(q)),
            Op::Ry(t, q) => circuit.ry(t, QubitId(q)),
            Op::Cx(a, b) => circuit.cx(QubitId(a), QubitId(b)),
            Op::Cz(a, b) => circuit.cz(QubitId(a), QubitId(b)),
            Op::Swap(a, b) => circuit.swap(QubitId(a), QubitId(b)),
            Op::Rxx(t, a, b) => circuit.rxx(t, QubitId(a), QubitId(b)),
            Op::Ccx(a, b, c) => circuit.ccx(QubitId(a), QubitId(b), QubitId(c)),
        };
    }
}

fn arb_op(n: u32) -> impl Strategy<Value = Op> {
    let q = 0..n;
    let angle = -3.0f64..3.0;
    prop_oneof![
        q.clone().prop_map(Op::H),
        q.clone().prop_map(Op::X),
        q.clone().prop_map(Op::S),
        q.clone().prop_map(Op::T),
        (angle.clone(), q.clone()).prop_map(|(t, q)| Op::Rz(t, q)),
        (angle.clone(), q.clone()).prop_map(|(t, q)| Op::Ry(t, q)),
        (q.clone(), q.clone()).prop_map(|(a, b)| Op::Cx(a, b)),
        (q.clone(), q.clone()).prop_map(|(a, b)| Op::Cz(a, b)),
        (q.clone(), q.clone()).prop_map(|(a, b)| Op::Swap(a, b)),
        (angle, q.clone(), q.clone()).prop_map(|(t, a, b)| Op::Rxx(t, a, b)),
        (q.clone(), q.clone(), q).prop_map(|(a, b, c)| Op::Ccx(a, b, c)),
    ]
}

/// Random unitary circuits on 1-4 qubits, measured at the end.
fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (1_u32..=4).prop_flat_map(|n| {
        prop::collection::vec(arb_op(n), 0..=20).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("prop", n, n);
            for op in ops {
                op.apply(&mut circuit);
            }
            let _ = circuit.measure_all();
            circuit
        })
    })
}

fn durations() -> DurationTable {
    DurationTable::uniform(["h", "x", "y", "s", "t", "rz", "ry"], 40)
        .with_gate("cx", 200)
        .with_gate("cz", 200)
        .with_gate("swap", 600)
        .with_gate("rxx", 250)
        .with_gate("ccx", 500)
        .with_gate("measure", 300)
}

fn same_state(a: &Circuit, b: &Circuit) -> bool {
    let sa = Statevector::from_circuit(a).unwrap();
    let sb = Statevector::from_circuit(b).unwrap();
    (sa.fidelity(&sb) - 1.0).abs() < 1e-9
}

proptest! {
    #[test]
    fn fold_round_trip(circuit in arb_circuit(), k in 0_u32..3) {
        let folded = fold(&circuit, 2 * k + 1).unwrap();
        prop_assert!(same_state(&circuit, &folded));
    }

    #[test]
    fn local_fold_round_trip_on_self_inverse_gates(n in 1_u32..=3, picks in prop::collection::vec(0_u32..3, 0..12)) {
        let mut circuit = Circuit::with_size("clifford", n, n);
        for (i, p) in picks.into_iter().enumerate() {
            let q = QubitId(i as u32 % n);
            let _ = match p {
                0 => circuit.h(q),
                1 => circuit.x(q),
                _ => circuit.z(q),
            };
        }
        let folded = fold_with_policy(&circuit, ScaleFactor::new(5).unwrap(), FoldPolicy::Local).unwrap();
        prop_assert!(same_state(&circuit, &folded));
    }

    #[test]
    fn decoupling_is_non_destructive(circuit in arb_circuit(), xy4 in any::<bool>()) {
        let seq = if xy4 { PulseSequence::Xy4 } else { PulseSequence::Xx };
        let padded = insert_decoupling(&circuit, &seq, &durations()).unwrap();
        prop_assert!(same_state(&circuit, &padded));
    }

    #[test]
    fn hybrid_is_non_destructive(circuit in arb_circuit()) {
        let padded = insert_decoupling(&circuit, &PulseSequence::Xx, &durations()).unwrap();
        let hybrid = fold(&padded, 3).unwrap();
        prop_assert!(same_state(&circuit, &hybrid));
    }
}

#[test]
fn test_grover_probability_survives_transforms() {
    let c = Circuit::grover3().unwrap();
    let table = DurationTable::ibm_eagle();
    let base = outcome_probability(&c, "111").unwrap();

    let padded = insert_decoupling(&c, &PulseSequence::Xx, &table).unwrap();
    assert!(padded.len() > c.len());
    for circuit in [fold(&c, 3).unwrap(), padded.clone(), fold(&padded, 5).unwrap()] {
        let p = outcome_probability(&circuit, "111").unwrap();
        assert!((p - base).abs() < 1e-9);
    }
}
