//! Error types for the search pipeline.

use grover_compile::CompileError;
use grover_hal::HalError;
use grover_ir::IrError;
use thiserror::Error;

/// Errors raised while building, running or analysing a search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search range must hold at least 2 entries, got {0}")]
    RangeTooSmall(u64),

    #[error("Search width of {0} qubits is outside 1..={max}", max = crate::target::MAX_SEARCH_QUBITS)]
    InvalidWidth(u32),

    #[error("Target index {index} is outside [0, {range_size})")]
    TargetOutOfRange { index: u64, range_size: u64 },

    #[error("'{0}' is not a bit string")]
    InvalidBitString(String),

    #[error("Bit string '{bits}' has width {got}, expected {expected}")]
    WidthMismatch {
        bits: String,
        expected: u32,
        got: usize,
    },

    #[error("At least one iteration count is required")]
    EmptyBatch,

    #[error("Expected {expected} distributions, got {got}")]
    ResultMismatch { expected: usize, got: usize },

    #[error("Distribution for {iterations} iterations is empty")]
    EmptyDistribution { iterations: u32 },

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error(transparent)]
    Backend(#[from] HalError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;
