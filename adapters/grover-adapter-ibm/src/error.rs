//! Error types for the IBM Quantum adapter.

use grover_hal::HalError;
use thiserror::Error;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Errors that can occur when talking to IBM Quantum.
#[derive(Debug, Error)]
pub enum IbmError {
    #[error(
        "IBM Quantum credentials not found. Set IBM_QUANTUM_TOKEN, or IBM_API_KEY and IBM_SERVICE_CRN, or run `grover auth save`."
    )]
    MissingToken,

    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    #[error("IAM token exchange failed: {0}")]
    IamTokenExchange(String),

    #[error("IBM_SERVICE_CRN is required when using an IBM Cloud API key")]
    MissingServiceCrn,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the runtime.
    #[error("IBM Quantum API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    #[error("Circuit conversion error: {0}")]
    Circuit(String),

    /// Results that cannot be mapped back onto the submitted circuits.
    #[error("Malformed job result: {0}")]
    MalformedResult(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Saved account could not be read.
    #[error(transparent)]
    Account(HalError),
}

impl From<IbmError> for HalError {
    fn from(e: IbmError) -> Self {
        match e {
            IbmError::MissingToken
            | IbmError::InvalidToken
            | IbmError::IamTokenExchange(_)
            | IbmError::MissingServiceCrn => HalError::Auth(e.to_string()),
            IbmError::Api { status: 401 | 403, .. } => HalError::Auth(e.to_string()),
            IbmError::JobNotFound(id) => HalError::JobNotFound(id),
            IbmError::BackendUnavailable(msg) => HalError::BackendUnavailable(msg),
            IbmError::Circuit(msg) => HalError::InvalidCircuit(msg),
            IbmError::Http(e) => HalError::Network(e),
            IbmError::Json(e) => HalError::Serialization(e),
            IbmError::Account(e) => e,
            IbmError::Api { .. } | IbmError::MalformedResult(_) => HalError::Backend(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_mentions_every_source() {
        let msg = IbmError::MissingToken.to_string();
        assert!(msg.contains("IBM_QUANTUM_TOKEN"));
        assert!(msg.contains("IBM_API_KEY"));
        assert!(msg.contains("auth save"));
    }

    #[test]
    fn test_auth_errors_map_to_hal_auth() {
        for e in [
            IbmError::MissingToken,
            IbmError::MissingServiceCrn,
            IbmError::Api {
                status: 401,
                message: "bad token".into(),
            },
        ] {
            assert!(matches!(HalError::from(e), HalError::Auth(_)));
        }
    }

    #[test]
    fn test_other_errors_map_to_hal() {
        assert!(matches!(
            HalError::from(IbmError::JobNotFound("j1".into())),
            HalError::JobNotFound(id) if id == "j1"
        ));
        assert!(matches!(
            HalError::from(IbmError::BackendUnavailable("ibm_oslo".into())),
            HalError::BackendUnavailable(_)
        ));
        assert!(matches!(
            HalError::from(IbmError::Api {
                status: 500,
                message: "oops".into()
            }),
            HalError::Backend(_)
        ));
    }
}
