//! Error types for compilation.

use grover_ir::IrError;
use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    /// No rule lowers this gate into the target basis.
    #[error("Gate '{0}' cannot be expressed in the target basis")]
    GateNotInBasis(String),

    /// The basis has no entangling gate this crate can target.
    #[error("Unsupported basis {0:?}: expected one of cx or cz with rz, sx and x")]
    UnsupportedBasis(Vec<String>),

    /// Rebuilding the circuit failed.
    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;
