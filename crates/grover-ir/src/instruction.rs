//! Circuit instructions.

use serde::{Deserialize, Serialize};

use crate::gate::StandardGate;
use crate::qubit::{ClbitId, QubitId};

/// What an instruction does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A unitary gate.
    Gate(StandardGate),
    /// Measure each qubit into the classical bit at the same position.
    Measure,
    /// Scheduling barrier across the listed qubits.
    Barrier,
}

/// An operation together with the wires it touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The operation.
    pub kind: InstructionKind,
    /// Quantum operands, controls first.
    pub qubits: Vec<QubitId>,
    /// Classical operands.
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    /// A gate applied to the given qubits.
    pub fn gate(gate: StandardGate, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate),
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Measure one qubit into one classical bit.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    /// A barrier across the given qubits.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// The gate, if this is a gate instruction.
    #[inline]
    pub fn as_gate(&self) -> Option<&StandardGate> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    #[inline]
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    #[inline]
    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }

    /// Name used in listings and gate counts.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Barrier => "barrier",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_instruction() {
        let inst = Instruction::gate(StandardGate::CX, [QubitId(0), QubitId(1)]);
        assert_eq!(inst.name(), "cx");
        assert_eq!(inst.qubits, vec![QubitId(0), QubitId(1)]);
        assert!(inst.as_gate().is_some());
        assert!(!inst.is_measure());
    }

    #[test]
    fn test_measure_instruction() {
        let inst = Instruction::measure(QubitId(2), ClbitId(2));
        assert!(inst.is_measure());
        assert!(inst.as_gate().is_none());
        assert_eq!(inst.clbits, vec![ClbitId(2)]);
    }
}
