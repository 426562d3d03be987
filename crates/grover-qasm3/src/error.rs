//! Error types for QASM emission.

use thiserror::Error;

/// Errors that can occur while emitting OpenQASM.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Circuit has no qubits to declare.
    #[error("Circuit '{0}' has no qubits")]
    NoQubits(String),

    /// An angle cannot be written as a literal.
    #[error("Gate '{gate}' has a non-finite angle {angle}")]
    NonFiniteAngle {
        /// Gate name.
        gate: &'static str,
        /// The offending value.
        angle: f64,
    },

    /// Writing into the output buffer failed.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// Result type for emission.
pub type EmitResult<T> = Result<T, EmitError>;
