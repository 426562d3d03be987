//! Gate set used by the search circuits.
//!
//! Only the gates the Grover construction and the IBM basis translation
//! produce are modelled. Angles are plain radians; the pipeline never
//! builds symbolic circuits.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Gates with fixed, known semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Cliffords
    /// Hadamard gate.
    H,
    /// Pauli-X gate.
    X,
    /// Pauli-Z gate.
    Z,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// sqrt(X) gate, native on IBM devices.
    SX,

    // Single-qubit phases
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// Rotation around Z by the given angle.
    Rz(f64),
    /// Phase gate diag(1, e^{iλ}).
    P(f64),

    // Two-qubit gates
    /// Controlled-X (CNOT).
    CX,
    /// Controlled-Z.
    CZ,
    /// Controlled phase.
    CP(f64),

    // Three-qubit gates
    /// Toffoli gate.
    CCX,
}

impl StandardGate {
    /// OpenQASM 3 name of the gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::H => "h",
            StandardGate::X => "x",
            StandardGate::Z => "z",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::SX => "sx",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::CP(_) => "cp",
            StandardGate::CCX => "ccx",
        }
    }

    /// Number of qubits this gate acts on.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        match self {
            StandardGate::CX | StandardGate::CZ | StandardGate::CP(_) => 2,
            StandardGate::CCX => 3,
            _ => 1,
        }
    }

    /// The angle of a parameterized gate.
    #[inline]
    pub fn angle(&self) -> Option<f64> {
        match self {
            StandardGate::Rz(a) | StandardGate::P(a) | StandardGate::CP(a) => Some(*a),
            _ => None,
        }
    }

    /// The phase this gate applies to `|1⟩` if it is diagonal and
    /// single-qubit, up to global phase.
    pub fn diagonal_phase(&self) -> Option<f64> {
        match self {
            StandardGate::Z => Some(PI),
            StandardGate::S => Some(FRAC_PI_2),
            StandardGate::Sdg => Some(-FRAC_PI_2),
            StandardGate::T => Some(FRAC_PI_4),
            StandardGate::Tdg => Some(-FRAC_PI_4),
            StandardGate::Rz(a) | StandardGate::P(a) => Some(*a),
            _ => None,
        }
    }
}

impl std::fmt::Display for StandardGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.angle() {
            Some(a) => write!(f, "{}({a:.4})", self.name()),
            None => f.write_str(self.name()),
        }
    }
}
