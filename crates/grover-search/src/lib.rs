//! Grover search over a small index range.
//!
//! The pipeline picks a hidden index, marks its bit-string with a phase
//! oracle, builds one amplification circuit per iteration count, runs the
//! batch as a single job, and checks which counts made the target the most
//! likely outcome.
//!
//! ```text
//! TargetSelector ─► AmplificationProblem ─► CircuitBatch ─► Dispatcher ─► analyze
//! ```
//!
//! # Example
//!
//! ```rust
//! use grover_search::{AmplificationProblem, TargetSelector, build_batch, optimal_iterations};
//!
//! let selector = TargetSelector::for_qubits(3).unwrap();
//! let target = selector.target(5).unwrap();
//! assert_eq!(target.bits.as_str(), "101");
//!
//! let problem = AmplificationProblem::new(target.bits);
//! let batch = build_batch(&problem, &[0, optimal_iterations(3)]).unwrap();
//! assert_eq!(batch.len(), 2);
//! ```

pub mod analysis;
pub mod batch;
pub mod dispatch;
pub mod error;
pub mod grover;
pub mod problem;
pub mod report;
pub mod target;

pub use analysis::{Analysis, IterationReport, Verdict, analyze};
pub use batch::{BatchEntry, CircuitBatch, DEFAULT_ITERATIONS, build_batch};
pub use dispatch::{BackendProvider, DispatchOutcome, Dispatcher, Execution, ExecutionMode};
pub use error::{SearchError, SearchResult};
pub use grover::{grover_circuit, multi_controlled_z, optimal_iterations, success_probability};
pub use problem::{AmplificationProblem, PhaseOracle};
pub use report::Histogram;
pub use target::{BitString, MAX_SEARCH_QUBITS, Target, TargetSelector};
