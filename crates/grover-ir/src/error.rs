//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors raised while building a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit index is outside the circuit.
    #[error("Qubit {qubit} not found in circuit{}", gate_context(.gate_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Gate being applied, if any.
        gate_name: Option<&'static str>,
    },

    /// Classical bit index is outside the circuit.
    #[error("Classical bit {clbit} not found in circuit{}", gate_context(.gate_name))]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
        /// Gate being applied, if any.
        gate_name: Option<&'static str>,
    },

    /// Gate applied to the wrong number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: &'static str,
        /// Expected number of qubits.
        expected: usize,
        /// Actual number of qubits provided.
        got: usize,
    },

    /// The same qubit appears twice in one operation.
    #[error("Duplicate qubit {qubit} in operation{}", gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Gate being applied, if any.
        gate_name: Option<&'static str>,
    },

    /// Measurement operands do not pair up.
    #[error("Measurement needs one classical bit per qubit ({qubits} qubits, {clbits} bits)")]
    MeasureMismatch {
        /// Number of measured qubits.
        qubits: usize,
        /// Number of target classical bits.
        clbits: usize,
    },

    /// A multi-qubit construction received no qubits.
    #[error("Operation '{0}' needs at least one qubit")]
    EmptyOperands(&'static str),
}

#[allow(clippy::ref_option)]
fn gate_context(gate_name: &Option<&'static str>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_gate_context() {
        let err = IrError::QubitNotFound {
            qubit: QubitId(4),
            gate_name: Some("cz"),
        };
        assert_eq!(err.to_string(), "Qubit q4 not found in circuit (gate: cz)");

        let err = IrError::ClbitNotFound {
            clbit: ClbitId(1),
            gate_name: None,
        };
        assert_eq!(err.to_string(), "Classical bit c1 not found in circuit");
    }
}
