//! Basis translation onto IBM native gates.
//!
//! Every rule holds up to global phase, which sampling cannot observe.

use std::f64::consts::FRAC_PI_2;

use grover_ir::{CircuitDag, Instruction, InstructionKind, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::property::{BasisGates, EntanglingGate};

/// Lowers every gate to `rz`, `sx`, `x` and the basis' entangling gate.
pub struct BasisTranslation;

impl Pass for BasisTranslation {
    fn name(&self) -> &'static str {
        "BasisTranslation"
    }

    fn run(&self, dag: &mut CircuitDag, basis: &BasisGates) -> CompileResult<()> {
        let entangler = basis
            .entangling_gate()
            .ok_or_else(|| CompileError::UnsupportedBasis(basis.gates().to_vec()))?;

        let mut out = dag.empty_like();
        for inst in dag.ops() {
            match &inst.kind {
                InstructionKind::Gate(gate) => {
                    for lowered in lower(*gate, &inst.qubits, entangler)? {
                        out.apply(lowered)?;
                    }
                }
                InstructionKind::Measure | InstructionKind::Barrier => {
                    out.apply(inst.clone())?;
                }
            }
        }
        *dag = out;
        Ok(())
    }
}

fn gate(gate: StandardGate, qubits: &[QubitId]) -> Instruction {
    Instruction::gate(gate, qubits.iter().copied())
}

/// Expand one gate into native instructions.
fn lower(
    g: StandardGate,
    qubits: &[QubitId],
    entangler: EntanglingGate,
) -> CompileResult<Vec<Instruction>> {
    use StandardGate as G;

    if let Some(phase) = g.diagonal_phase() {
        return Ok(vec![gate(G::Rz(phase), qubits)]);
    }

    let expanded = match (g, qubits) {
        (G::X | G::SX, _) => return Ok(vec![gate(g, qubits)]),
        (G::H, [q]) => {
            return Ok(vec![
                gate(G::Rz(FRAC_PI_2), &[*q]),
                gate(G::SX, &[*q]),
                gate(G::Rz(FRAC_PI_2), &[*q]),
            ]);
        }
        (G::CX, [c, t]) => match entangler {
            EntanglingGate::CX => return Ok(vec![gate(G::CX, qubits)]),
            EntanglingGate::CZ => vec![
                gate(G::H, &[*t]),
                gate(G::CZ, &[*c, *t]),
                gate(G::H, &[*t]),
            ],
        },
        (G::CZ, [c, t]) => match entangler {
            EntanglingGate::CZ => return Ok(vec![gate(G::CZ, qubits)]),
            EntanglingGate::CX => vec![
                gate(G::H, &[*t]),
                gate(G::CX, &[*c, *t]),
                gate(G::H, &[*t]),
            ],
        },
        (G::CP(lambda), [c, t]) => vec![
            gate(G::P(lambda / 2.0), &[*c]),
            gate(G::CX, &[*c, *t]),
            gate(G::P(-lambda / 2.0), &[*t]),
            gate(G::CX, &[*c, *t]),
            gate(G::P(lambda / 2.0), &[*t]),
        ],
        (G::CCX, [a, b, t]) => toffoli(*a, *b, *t),
        _ => return Err(CompileError::GateNotInBasis(g.name().to_string())),
    };

    let mut lowered = Vec::with_capacity(expanded.len() * 3);
    for inst in expanded {
        let Some(inner) = inst.as_gate().copied() else {
            lowered.push(inst);
            continue;
        };
        lowered.extend(lower(inner, &inst.qubits, entangler)?);
    }
    Ok(lowered)
}

/// Six-CX Toffoli with T/T† phases.
fn toffoli(a: QubitId, b: QubitId, t: QubitId) -> Vec<Instruction> {
    use StandardGate as G;
    vec![
        gate(G::H, &[t]),
        gate(G::CX, &[b, t]),
        gate(G::Tdg, &[t]),
        gate(G::CX, &[a, t]),
        gate(G::T, &[t]),
        gate(G::CX, &[b, t]),
        gate(G::Tdg, &[t]),
        gate(G::CX, &[a, t]),
        gate(G::T, &[b]),
        gate(G::T, &[t]),
        gate(G::H, &[t]),
        gate(G::CX, &[a, b]),
        gate(G::T, &[a]),
        gate(G::Tdg, &[b]),
        gate(G::CX, &[a, b]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use grover_ir::Circuit;

    fn translate(circuit: &Circuit, basis: &BasisGates) -> CircuitDag {
        let mut dag = circuit.dag().clone();
        BasisTranslation.run(&mut dag, basis).unwrap();
        dag
    }

    fn only_native(dag: &CircuitDag, basis: &BasisGates) -> bool {
        dag.ops().all(|inst| basis.contains(inst.name()))
    }

    #[test]
    fn test_h_to_ibm() {
        let mut circuit = Circuit::with_size("h", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        let dag = translate(&circuit, &BasisGates::ibm());

        let names: Vec<_> = dag.ops().map(Instruction::name).collect();
        assert_eq!(names, vec!["rz", "sx", "rz"]);
    }

    #[test]
    fn test_cz_to_ibm() {
        let mut circuit = Circuit::with_size("cz", 2, 0);
        circuit.cz(QubitId(0), QubitId(1)).unwrap();
        let dag = translate(&circuit, &BasisGates::ibm());

        // H, CX, H with each H lowered to three gates
        assert_eq!(dag.num_ops(), 7);
        assert!(only_native(&dag, &BasisGates::ibm()));
    }

    #[test]
    fn test_cx_to_heron() {
        let mut circuit = Circuit::with_size("cx", 2, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let dag = translate(&circuit, &BasisGates::heron());

        assert_eq!(dag.num_ops(), 7);
        assert!(only_native(&dag, &BasisGates::heron()));
    }

    #[test]
    fn test_ccx_and_cp_are_native_after_translation() {
        let mut circuit = Circuit::with_size("mixed", 3, 0);
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        circuit.cp(0.7, QubitId(2), QubitId(0)).unwrap();
        circuit.t(QubitId(1)).unwrap();
        circuit.measure_all().unwrap();

        let dag = translate(&circuit, &BasisGates::ibm());
        let cx = dag.ops().filter(|i| i.name() == "cx").count();
        assert_eq!(cx, 8);
        assert_eq!(dag.ops().filter(|i| i.is_measure()).count(), 3);
        assert!(
            dag.ops()
                .filter(|i| !i.is_measure())
                .all(|i| BasisGates::ibm().contains(i.name()))
        );
    }
}
