//! Backend abstraction for the Grover search pipeline.
//!
//! The pipeline submits a *batch* of circuits as one job and blocks until
//! one result distribution per circuit comes back. This crate defines the
//! pieces every backend shares:
//!
//! - [`Backend`]: batch submission, status polling, results, cancellation
//! - [`Capabilities`]: qubit count, native gates and limits
//! - [`ExecutionResult`], [`QuasiDistribution`], [`Counts`]: per-circuit
//!   outcomes with deterministic label order
//! - [`auth`]: the saved account file
//!
//! | Backend | Crate | Authentication |
//! |---------|-------|----------------|
//! | Local simulator | `grover-adapter-sim` | None |
//! | IBM Quantum | `grover-adapter-ibm` | `IBM_QUANTUM_TOKEN`, `IBM_API_KEY` + `IBM_SERVICE_CRN`, or saved account |

pub mod auth;
pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use auth::{AccountStore, Channel, SavedAccount};
pub use backend::{Backend, BackendAvailability, ValidationResult, WaitPolicy};
pub use capability::Capabilities;
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{CircuitResult, Counts, ExecutionResult, QuasiDistribution, bit_label};
