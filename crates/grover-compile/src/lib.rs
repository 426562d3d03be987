//! Compilation of search circuits for IBM hardware.
//!
//! IBM devices execute `rz`, `sx`, `x` and one entangling gate (`cx` on
//! Eagle/Falcon processors, `cz` on Heron). The Grover construction uses
//! `h`, `x`, `cz`, `cp` and `ccx`, so circuits must be lowered before they
//! are submitted to a physical backend.
//!
//! ```text
//! Circuit ──► BasisTranslation ──► PeepholeOptimization ──► Circuit (native)
//! ```
//!
//! Qubit layout and routing onto the coupling map are left to the runtime,
//! which transpiles submitted programs at optimization level 1.
//!
//! # Example
//!
//! ```rust
//! use grover_compile::{BasisGates, PassManager};
//! use grover_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2, 0);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! let pm = PassManager::for_target(BasisGates::ibm(), 1).unwrap();
//! let native = pm.run(&circuit).unwrap();
//! assert!(native.instructions().all(|i| BasisGates::ibm().contains(i.name())));
//! ```

pub mod error;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod property;

pub use error::{CompileError, CompileResult};
pub use manager::PassManager;
pub use pass::Pass;
pub use passes::{BasisTranslation, PeepholeOptimization};
pub use property::{BasisGates, EntanglingGate};
