//! Circuit representation for the Grover search pipeline.
//!
//! A [`Circuit`] is a named sequence of gates and measurements over a single
//! qubit register `q` and classical register `c`. It is stored as a
//! [`CircuitDag`] so depth and per-wire ordering are available to the
//! compiler and the report.
//!
//! # Example
//!
//! ```rust
//! use grover_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2, 0);
//! circuit.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
//! circuit.measure_all()?;
//!
//! assert_eq!(circuit.num_clbits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! # Ok::<(), grover_ir::IrError>(())
//! ```
//!
//! # Bit order
//!
//! Qubit `i` is bit `i` of a basis-state index. When an outcome is written
//! as a bit string, qubit 0 is the rightmost character.

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
