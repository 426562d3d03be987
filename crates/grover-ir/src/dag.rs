//! DAG view of a circuit.
//!
//! Nodes are wire inputs and operations; every edge carries the wire it
//! belongs to. Operations are only ever appended, so node insertion order
//! is a valid topological order and no sort is needed to walk the circuit.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Start of a wire.
    In(WireId),
    /// An operation.
    Op(Instruction),
}

impl DagNode {
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            DagNode::In(_) => None,
        }
    }
}

/// Identifier for a wire in the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// Edge payload: the wire connecting two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    pub wire: WireId,
}

/// Wire-connected graph of circuit operations.
///
/// `wire_front` tracks the last node on every wire so appending an
/// operation is O(operands).
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    graph: DiGraph<DagNode, DagEdge, u32>,
    wire_front: FxHashMap<WireId, NodeIndex>,
    num_qubits: u32,
    num_clbits: u32,
}

impl CircuitDag {
    /// Create an empty DAG.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a DAG with the given number of qubit and classical wires.
    pub fn with_wires(num_qubits: u32, num_clbits: u32) -> Self {
        let mut dag = Self::new();
        for _ in 0..num_qubits {
            dag.add_qubit();
        }
        for _ in 0..num_clbits {
            dag.add_clbit();
        }
        dag
    }

    /// An empty DAG with the same wires as this one.
    pub fn empty_like(&self) -> Self {
        Self::with_wires(self.num_qubits, self.num_clbits)
    }

    /// Add the next qubit wire and return its id.
    pub fn add_qubit(&mut self) -> QubitId {
        let qubit = QubitId(self.num_qubits);
        self.num_qubits += 1;
        self.add_wire(WireId::Qubit(qubit));
        qubit
    }

    /// Add the next classical wire and return its id.
    pub fn add_clbit(&mut self) -> ClbitId {
        let clbit = ClbitId(self.num_clbits);
        self.num_clbits += 1;
        self.add_wire(WireId::Clbit(clbit));
        clbit
    }

    fn add_wire(&mut self, wire: WireId) {
        let node = self.graph.add_node(DagNode::In(wire));
        self.wire_front.insert(wire, node);
    }

    /// Append an instruction after validating its operands.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        let gate_name = instruction.as_gate().map(|g| g.name());

        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                if gate.num_qubits() != instruction.qubits.len() {
                    return Err(IrError::QubitCountMismatch {
                        gate_name: gate.name(),
                        expected: gate.num_qubits(),
                        got: instruction.qubits.len(),
                    });
                }
            }
            InstructionKind::Measure => {
                if instruction.qubits.len() != instruction.clbits.len() {
                    return Err(IrError::MeasureMismatch {
                        qubits: instruction.qubits.len(),
                        clbits: instruction.clbits.len(),
                    });
                }
            }
            InstructionKind::Barrier => {}
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if qubit.0 >= self.num_qubits {
                return Err(IrError::QubitNotFound { qubit, gate_name });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit { qubit, gate_name });
            }
        }
        for &clbit in &instruction.clbits {
            if clbit.0 >= self.num_clbits {
                return Err(IrError::ClbitNotFound { clbit, gate_name });
            }
        }

        let wires: Vec<WireId> = instruction
            .qubits
            .iter()
            .map(|&q| WireId::Qubit(q))
            .chain(instruction.clbits.iter().map(|&c| WireId::Clbit(c)))
            .collect();

        let op_node = self.graph.add_node(DagNode::Op(instruction));
        for wire in wires {
            let prev = self.wire_front[&wire];
            self.graph.add_edge(prev, op_node, DagEdge { wire });
            self.wire_front.insert(wire, op_node);
        }
        Ok(op_node)
    }

    /// Operations in the order they were applied.
    pub fn ops(&self) -> impl Iterator<Item = &Instruction> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph[idx].instruction())
    }

    /// Number of operation nodes.
    pub fn num_ops(&self) -> usize {
        self.graph.node_count() - self.wire_front.len()
    }

    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    #[inline]
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    /// Length of the longest operation chain along any wire.
    ///
    /// Barriers synchronise wires but do not add a layer.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.graph.node_count()];
        let mut max_depth = 0;

        for node in self.graph.node_indices() {
            let pred = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|p| depths[p.index()])
                .max()
                .unwrap_or(0);
            let depth = match &self.graph[node] {
                DagNode::Op(inst) if !inst.is_barrier() => pred + 1,
                _ => pred,
            };
            depths[node.index()] = depth;
            max_depth = max_depth.max(depth);
        }
        max_depth
    }

    /// Operations that directly precede `node` on any wire.
    pub fn predecessors(&self, node: NodeIndex) -> impl Iterator<Item = &Instruction> {
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .filter_map(|p| self.graph[p].instruction())
    }
}
