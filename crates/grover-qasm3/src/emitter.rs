//! OpenQASM 3 emitter.

use std::f64::consts::PI;
use std::fmt::Write;

use grover_ir::{Circuit, Instruction, InstructionKind, QubitId};

use crate::error::{EmitError, EmitResult};

/// Emit a circuit as OpenQASM 3 source.
///
/// The output declares `qubit[n] q;` and `bit[m] c;` and includes
/// `stdgates.inc`, which the IBM runtime requires to resolve `h`, `cx`,
/// `cp` and friends.
pub fn emit(circuit: &Circuit) -> EmitResult<String> {
    if circuit.num_qubits() == 0 {
        return Err(EmitError::NoQubits(circuit.name().to_string()));
    }

    let mut out = String::new();
    writeln!(out, "OPENQASM 3.0;")?;
    writeln!(out, "include \"stdgates.inc\";")?;
    writeln!(out)?;
    writeln!(out, "qubit[{}] q;", circuit.num_qubits())?;
    if circuit.num_clbits() > 0 {
        writeln!(out, "bit[{}] c;", circuit.num_clbits())?;
    }
    writeln!(out)?;

    for instruction in circuit.instructions() {
        emit_instruction(&mut out, instruction)?;
    }
    Ok(out)
}

fn emit_instruction(out: &mut String, instruction: &Instruction) -> EmitResult<()> {
    match &instruction.kind {
        InstructionKind::Gate(gate) => {
            let qubits = operands(&instruction.qubits);
            match gate.angle() {
                Some(angle) if !angle.is_finite() => {
                    return Err(EmitError::NonFiniteAngle {
                        gate: gate.name(),
                        angle,
                    });
                }
                Some(angle) => writeln!(out, "{}({}) {qubits};", gate.name(), format_angle(angle))?,
                None => writeln!(out, "{} {qubits};", gate.name())?,
            }
        }
        InstructionKind::Measure => {
            for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                writeln!(out, "c[{}] = measure q[{}];", c.0, q.0)?;
            }
        }
        InstructionKind::Barrier => {
            writeln!(out, "barrier {};", operands(&instruction.qubits))?;
        }
    }
    Ok(())
}

fn operands(qubits: &[QubitId]) -> String {
    qubits
        .iter()
        .map(|q| format!("q[{}]", q.0))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Write an angle as `pi/2^k` when it is one, otherwise as the shortest
/// decimal that round-trips.
fn format_angle(angle: f64) -> String {
    const TOLERANCE: f64 = 1e-12;

    if angle.abs() < TOLERANCE {
        return "0".into();
    }
    let sign = if angle < 0.0 { "-" } else { "" };
    let ratio = angle.abs() / PI;
    if (ratio - 1.0).abs() < TOLERANCE {
        return format!("{sign}pi");
    }
    let mut denom = 2u32;
    while denom <= 1024 {
        if (ratio - 1.0 / f64::from(denom)).abs() < TOLERANCE {
            return format!("{sign}pi/{denom}");
        }
        denom *= 2;
    }
    format!("{angle}")
}
