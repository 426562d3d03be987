//! Local state-vector simulator backend.
//!
//! Runs a batch of circuits in-process and returns one distribution per
//! circuit, either sampled from the requested number of shots or exact.
//! Memory grows as `16 · 2^n` bytes, so the default limit is 20 qubits.
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | ~16 KB |
//! | 15 | ~512 KB |
//! | 20 | ~16 MB |
//!
//! # Example
//!
//! ```ignore
//! use grover_adapter_sim::SimulatorBackend;
//! use grover_hal::Backend;
//!
//! let backend = SimulatorBackend::new().with_seed(42);
//! let job_id = backend.submit(&circuits, 1000).await?;
//! let result = backend.wait(&job_id).await?;
//! for dist in result.distributions() {
//!     println!("{dist}");
//! }
//! ```

mod simulator;
mod statevector;

pub use simulator::{DEFAULT_NAME, SimulatorBackend};
pub use statevector::Statevector;
