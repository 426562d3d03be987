//! IBM Quantum runtime backend.
//!
//! Submits a batch of circuits as one sampler job (one PUB per circuit,
//! OpenQASM 3) and converts the sampled outcomes back into per-circuit
//! distributions. Also runs free-form runtime programs such as
//! `hello-world`.
//!
//! # Authentication
//!
//! Credentials are resolved by [`Credentials::resolve`]:
//!
//! ```bash
//! # IBM Cloud
//! export IBM_API_KEY="your-api-key"
//! export IBM_SERVICE_CRN="crn:v1:bluemix:public:quantum-computing:..."
//!
//! # legacy platform
//! export IBM_QUANTUM_TOKEN="your-token"
//! ```
//!
//! or a saved account (`grover auth save --token ...`).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use grover_adapter_ibm::{Credentials, IbmBackend};
//! use grover_hal::{AccountStore, Backend};
//!
//! let store = AccountStore::default_location()?;
//! let client = Credentials::resolve(Some(&store))?.client().await?;
//! let backend = IbmBackend::connect(Arc::new(client), "ibm_oslo").await?;
//! let job_id = backend.submit(&circuits, 1000).await?;
//! let result = backend.wait(&job_id).await?;
//! ```

mod api;
mod backend;
mod credentials;
mod error;

pub use api::{
    BackendInfo, BackendStatus, CLOUD_ENDPOINT, DEFAULT_INSTANCE, IbmClient, LEGACY_ENDPOINT,
    ProcessorType,
};
pub use backend::{DEFAULT_HARDWARE_BACKEND, DEFAULT_SIMULATOR_BACKEND, IbmBackend};
pub use credentials::{API_KEY_VAR, CredentialSource, Credentials, SERVICE_CRN_VAR, TOKEN_VAR};
pub use error::{IbmError, IbmResult};
