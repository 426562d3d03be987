//! Compiled circuits must produce the same measurement statistics as their
//! sources, for every supported basis and optimization level.

use std::f64::consts::PI;

use grover_adapter_sim::Statevector;
use grover_compile::{BasisGates, PassManager};
use grover_ir::{Circuit, QubitId};
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-9;

fn probabilities(circuit: &Circuit) -> Vec<f64> {
    let mut sv = Statevector::new(circuit.num_qubits());
    for inst in circuit.instructions() {
        sv.apply(inst);
    }
    sv.probabilities()
}

fn assert_equivalent(source: &Circuit, compiled: &Circuit) {
    let expected = probabilities(source);
    let actual = probabilities(compiled);
    for (i, (e, a)) in expected.iter().zip(&actual).enumerate() {
        assert!(
            (e - a).abs() < TOLERANCE,
            "basis state {i}: expected {e}, got {a}"
        );
    }
}

fn only_native(circuit: &Circuit, basis: &BasisGates) -> bool {
    circuit.gate_counts().keys().all(|g| basis.contains(g))
}

#[derive(Debug, Clone)]
enum GateOp {
    H(u32),
    X(u32),
    Z(u32),
    S(u32),
    T(u32),
    Tdg(u32),
    P(f64, u32),
    CX(u32, u32),
    CZ(u32, u32),
    CP(f64, u32, u32),
    CCX(u32, u32, u32),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        let _ = match self {
            GateOp::H(q) => circuit.h(QubitId(q)),
            GateOp::X(q) => circuit.x(QubitId(q)),
            GateOp::Z(q) => circuit.z(QubitId(q)),
            GateOp::S(q) => circuit.s(QubitId(q)),
            GateOp::T(q) => circuit.t(QubitId(q)),
            GateOp::Tdg(q) => circuit.tdg(QubitId(q)),
            GateOp::P(a, q) => circuit.p(a, QubitId(q)),
            GateOp::CX(c, t) => circuit.cx(QubitId(c), QubitId(t)),
            GateOp::CZ(c, t) => circuit.cz(QubitId(c), QubitId(t)),
            GateOp::CP(a, c, t) => circuit.cp(a, QubitId(c), QubitId(t)),
            GateOp::CCX(a, b, t) => circuit.ccx(QubitId(a), QubitId(b), QubitId(t)),
        };
    }
}

fn arb_gate_op(num_qubits: u32) -> impl Strategy<Value = GateOp> {
    let q = 0..num_qubits;
    let pair = (0..num_qubits, 0..num_qubits).prop_filter("distinct", |(a, b)| a != b);
    let triple = (0..num_qubits, 0..num_qubits, 0..num_qubits)
        .prop_filter("distinct", |(a, b, c)| a != b && b != c && a != c);
    prop_oneof![
        q.clone().prop_map(GateOp::H),
        q.clone().prop_map(GateOp::X),
        q.clone().prop_map(GateOp::Z),
        q.clone().prop_map(GateOp::S),
        q.clone().prop_map(GateOp::T),
        q.clone().prop_map(GateOp::Tdg),
        (-PI..PI, q).prop_map(|(a, q)| GateOp::P(a, q)),
        pair.clone().prop_map(|(c, t)| GateOp::CX(c, t)),
        pair.clone().prop_map(|(c, t)| GateOp::CZ(c, t)),
        (-PI..PI, pair).prop_map(|(a, (c, t))| GateOp::CP(a, c, t)),
        triple.prop_map(|(a, b, t)| GateOp::CCX(a, b, t)),
    ]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (3_u32..=4).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_gate_op(num_qubits), 1..=12).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("random", num_qubits, 0);
            // start from a superposition so phases show up in the statistics
            for q in circuit.qubits() {
                let _ = circuit.h(q);
            }
            for op in ops {
                op.apply(&mut circuit);
            }
            for q in circuit.qubits() {
                let _ = circuit.h(q);
            }
            circuit
        })
    })
}

#[test]
fn test_toffoli_truth_table_survives_compilation() {
    let pm = PassManager::for_target(BasisGates::ibm(), 1).unwrap();
    for input in 0..8_u32 {
        let mut circuit = Circuit::with_size("toffoli", 3, 0);
        for q in 0..3 {
            if input & (1 << q) != 0 {
                circuit.x(QubitId(q)).unwrap();
            }
        }
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();

        let compiled = pm.run(&circuit).unwrap();
        assert!(only_native(&compiled, pm.basis()));
        assert_equivalent(&circuit, &compiled);
    }
}

#[test]
fn test_controlled_phase_interference() {
    let mut circuit = Circuit::with_size("cp", 2, 0);
    circuit.h(QubitId(0)).unwrap();
    circuit.h(QubitId(1)).unwrap();
    circuit.cp(PI / 2.0, QubitId(0), QubitId(1)).unwrap();
    circuit.h(QubitId(0)).unwrap();
    circuit.h(QubitId(1)).unwrap();

    for basis in [BasisGates::ibm(), BasisGates::heron()] {
        let compiled = PassManager::for_target(basis, 0)
            .unwrap()
            .run(&circuit)
            .unwrap();
        assert_equivalent(&circuit, &compiled);
    }
}

#[test]
fn test_measurements_are_kept_in_place() {
    let mut circuit = Circuit::with_size("measured", 2, 0);
    circuit.h(QubitId(0)).unwrap();
    circuit.cz(QubitId(0), QubitId(1)).unwrap();
    circuit.measure_all().unwrap();

    let compiled = PassManager::for_target(BasisGates::ibm(), 1)
        .unwrap()
        .run(&circuit)
        .unwrap();
    assert_eq!(compiled.num_clbits(), 2);
    assert_eq!(compiled.gate_counts().get("measure"), Some(&2));
    assert!(compiled.is_measured());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_ibm_compilation_preserves_statistics(circuit in arb_circuit(), level in 0_u8..=1) {
        let pm = PassManager::for_target(BasisGates::ibm(), level).unwrap();
        let compiled = pm.run(&circuit).unwrap();

        prop_assert!(only_native(&compiled, pm.basis()));
        let expected = probabilities(&circuit);
        let actual = probabilities(&compiled);
        for (e, a) in expected.iter().zip(&actual) {
            prop_assert!((e - a).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_heron_compilation_preserves_statistics(circuit in arb_circuit()) {
        let pm = PassManager::for_target(BasisGates::heron(), 1).unwrap();
        let compiled = pm.run(&circuit).unwrap();

        prop_assert!(only_native(&compiled, pm.basis()));
        prop_assert_eq!(compiled.num_qubits(), circuit.num_qubits());
        let expected = probabilities(&circuit);
        let actual = probabilities(&compiled);
        for (e, a) in expected.iter().zip(&actual) {
            prop_assert!((e - a).abs() < TOLERANCE);
        }
    }
}
