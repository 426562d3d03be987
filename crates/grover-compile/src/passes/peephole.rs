//! Local cleanup after translation.

use std::f64::consts::{PI, TAU};

use grover_ir::{CircuitDag, Instruction, StandardGate};

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::property::BasisGates;

const ANGLE_TOLERANCE: f64 = 1e-9;

/// Merges adjacent `rz` rotations and cancels adjacent self-inverse pairs
/// (`x·x`, `cx·cx`, `cz·cz`) on the same wires.
///
/// Translation of the oracle and diffuser leaves many `rz` runs behind
/// (every `h` becomes `rz·sx·rz`), so this roughly halves the single-qubit
/// gate count of a Grover circuit.
pub struct PeepholeOptimization;

impl Pass for PeepholeOptimization {
    fn name(&self) -> &'static str {
        "PeepholeOptimization"
    }

    fn run(&self, dag: &mut CircuitDag, _basis: &BasisGates) -> CompileResult<()> {
        let mut slots: Vec<Option<Instruction>> = Vec::with_capacity(dag.num_ops());
        // Per qubit, indices into `slots` of the live operations on that wire.
        let mut wires: Vec<Vec<usize>> = vec![vec![]; dag.num_qubits() as usize];

        for inst in dag.ops() {
            let action = common_top(&wires, inst)
                .and_then(|i| slots[i].as_ref().map(|prev| (i, combine(inst, prev))));

            match action {
                Some((i, Combine::Replace(merged))) => {
                    slots[i] = Some(merged);
                    continue;
                }
                Some((i, Combine::Remove)) => {
                    slots[i] = None;
                    pop(&mut wires, inst);
                    continue;
                }
                Some((_, Combine::Keep)) | None => {}
            }

            let idx = slots.len();
            slots.push(Some(inst.clone()));
            for q in &inst.qubits {
                wires[q.index()].push(idx);
            }
        }

        let mut out = dag.empty_like();
        for inst in slots.into_iter().flatten() {
            out.apply(inst)?;
        }
        *dag = out;
        Ok(())
    }
}

enum Combine {
    /// Both operations fold into this one.
    Replace(Instruction),
    /// The two operations cancel.
    Remove,
    Keep,
}

fn combine(inst: &Instruction, prev: &Instruction) -> Combine {
    match (inst.as_gate(), prev.as_gate()) {
        (Some(StandardGate::Rz(theta)), Some(StandardGate::Rz(phi))) => {
            let merged = normalize(theta + phi);
            if merged.abs() < ANGLE_TOLERANCE {
                Combine::Remove
            } else {
                Combine::Replace(Instruction::gate(
                    StandardGate::Rz(merged),
                    inst.qubits.iter().copied(),
                ))
            }
        }
        (Some(g @ (StandardGate::X | StandardGate::CX | StandardGate::CZ)), _)
            if cancels(*g, inst, prev) =>
        {
            Combine::Remove
        }
        _ => Combine::Keep,
    }
}

/// The slot that is the last live operation on every qubit of `inst`.
fn common_top(wires: &[Vec<usize>], inst: &Instruction) -> Option<usize> {
    let mut tops = inst.qubits.iter().map(|q| wires[q.index()].last().copied());
    let first = tops.next()??;
    tops.all(|t| t == Some(first)).then_some(first)
}

fn pop(wires: &mut [Vec<usize>], inst: &Instruction) {
    for q in &inst.qubits {
        wires[q.index()].pop();
    }
}

fn cancels(gate: StandardGate, inst: &Instruction, prev: &Instruction) -> bool {
    if prev.as_gate() != Some(&gate) || prev.qubits.len() != inst.qubits.len() {
        return false;
    }
    match gate {
        // CZ is symmetric in its operands
        StandardGate::CZ => prev.qubits.iter().all(|q| inst.qubits.contains(q)),
        _ => prev.qubits == inst.qubits,
    }
}

/// Map an angle into `(-pi, pi]`.
fn normalize(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grover_ir::{Circuit, QubitId};

    fn optimize(circuit: &Circuit) -> CircuitDag {
        let mut dag = circuit.dag().clone();
        PeepholeOptimization
            .run(&mut dag, &BasisGates::ibm())
            .unwrap();
        dag
    }

    #[test]
    fn test_merges_rz_runs() {
        let mut circuit = Circuit::with_size("rz", 1, 0);
        circuit.rz(0.25, QubitId(0)).unwrap();
        circuit.rz(0.5, QubitId(0)).unwrap();
        circuit.sx(QubitId(0)).unwrap();

        let dag = optimize(&circuit);
        let ops: Vec<_> = dag.ops().cloned().collect();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].as_gate(), Some(&StandardGate::Rz(0.75)));
    }

    #[test]
    fn test_removes_full_turns() {
        let mut circuit = Circuit::with_size("rz", 1, 0);
        circuit.rz(PI, QubitId(0)).unwrap();
        circuit.rz(PI, QubitId(0)).unwrap();
        assert_eq!(optimize(&circuit).num_ops(), 0);
    }

    #[test]
    fn test_cancels_cx_pairs_and_exposes_neighbours() {
        let mut circuit = Circuit::with_size("cx", 2, 0);
        circuit.rz(0.1, QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.rz(0.2, QubitId(1)).unwrap();

        let dag = optimize(&circuit);
        let ops: Vec<_> = dag.ops().cloned().collect();
        assert_eq!(ops.len(), 1);
        match ops[0].as_gate() {
            Some(StandardGate::Rz(a)) => assert!((a - 0.3).abs() < 1e-12),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_keeps_reversed_cx() {
        let mut circuit = Circuit::with_size("cx", 2, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(1), QubitId(0)).unwrap();
        assert_eq!(optimize(&circuit).num_ops(), 2);
    }

    #[test]
    fn test_measure_blocks_merging() {
        let mut circuit = Circuit::with_size("m", 1, 1);
        circuit.x(QubitId(0)).unwrap();
        circuit.measure(QubitId(0), grover_ir::ClbitId(0)).unwrap();
        circuit.x(QubitId(0)).unwrap();
        assert_eq!(optimize(&circuit).num_ops(), 3);
    }

    #[test]
    fn test_normalize() {
        assert!((normalize(3.0 * PI) - PI).abs() < 1e-12);
        assert!((normalize(-PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!(normalize(TAU).abs() < 1e-12);
    }
}
