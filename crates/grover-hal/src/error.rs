//! Error types for the HAL.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in backend operations.
#[derive(Debug, Error)]
pub enum HalError {
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("A saved account already exists at {0} (use overwrite to replace it)")]
    AccountExists(PathBuf),

    #[error("Job submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Job cancelled: {0}")]
    JobCancelled(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    #[error("Cannot submit an empty batch")]
    EmptyBatch,

    #[error("Batch of {got} circuits exceeds the backend limit of {max}")]
    BatchTooLarge { got: usize, max: u32 },

    #[error("Circuit too large: {qubits} qubits, backend supports {max}")]
    CircuitTooLarge { qubits: usize, max: u32 },

    #[error("Invalid shot count: {0}")]
    InvalidShots(String),

    #[error("Timeout waiting for job: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
