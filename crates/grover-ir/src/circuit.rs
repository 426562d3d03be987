//! Circuit builder.

use std::collections::BTreeMap;

use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::Instruction;
use crate::qubit::{ClbitId, QubitId};

/// A named quantum circuit over one qubit register and one classical
/// register.
///
/// Gate methods validate their operands and return `&mut Self` so calls can
/// be chained with `?`.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    dag: CircuitDag,
}

impl Circuit {
    /// Create a circuit with the given register sizes.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self::from_dag(name, CircuitDag::with_wires(num_qubits, num_clbits))
    }

    /// Wrap an existing DAG.
    pub fn from_dag(name: impl Into<String>, dag: CircuitDag) -> Self {
        Self {
            name: name.into(),
            dag,
        }
    }

    /// Append a classical bit.
    pub fn add_clbit(&mut self) -> ClbitId {
        self.dag.add_clbit()
    }

    /// Append a prepared instruction.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.dag.apply(instruction)?;
        Ok(self)
    }

    /// Apply any standard gate to the given qubits.
    pub fn gate(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(gate, qubits))
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::H, [qubit])
    }

    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::X, [qubit])
    }

    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Z, [qubit])
    }

    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::S, [qubit])
    }

    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Sdg, [qubit])
    }

    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::SX, [qubit])
    }

    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::T, [qubit])
    }

    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Tdg, [qubit])
    }

    /// Rotation around Z by `theta` radians.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Rz(theta), [qubit])
    }

    /// Phase gate diag(1, e^{iλ}).
    pub fn p(&mut self, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::P(lambda), [qubit])
    }

    // =========================================================================
    // Multi-qubit gates
    // =========================================================================

    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CX, [control, target])
    }

    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CZ, [control, target])
    }

    /// Controlled phase by `lambda` radians.
    pub fn cp(&mut self, lambda: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CP(lambda), [control, target])
    }

    /// Toffoli gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CCX, [c1, c2, target])
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))
    }

    /// Measure every qubit into the classical bit with the same index,
    /// growing the classical register when it is too small.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.dag.num_clbits() < self.dag.num_qubits() {
            self.dag.add_clbit();
        }
        for i in 0..self.dag.num_qubits() {
            self.dag.apply(Instruction::measure(QubitId(i), ClbitId(i)))?;
        }
        Ok(self)
    }

    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        if self.dag.num_qubits() == 0 {
            return Err(IrError::EmptyOperands("barrier"));
        }
        let qubits: Vec<_> = self.qubits().collect();
        self.apply(Instruction::barrier(qubits))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.dag.num_qubits() as usize
    }

    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.dag.num_clbits() as usize
    }

    /// Qubit ids in register order.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + use<> {
        (0..self.dag.num_qubits()).map(QubitId)
    }

    /// Operations in program order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.dag.ops()
    }

    pub fn num_ops(&self) -> usize {
        self.dag.num_ops()
    }

    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Whether the circuit contains at least one measurement.
    pub fn is_measured(&self) -> bool {
        self.instructions().any(Instruction::is_measure)
    }

    /// Operation counts keyed by name, sorted by name.
    pub fn gate_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for inst in self.instructions() {
            *counts.entry(inst.name()).or_default() += 1;
        }
        counts
    }

    #[inline]
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    pub fn into_dag(self) -> CircuitDag {
        self.dag
    }
}
