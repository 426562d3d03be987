//! OpenQASM 3 output for [`grover_ir::Circuit`].
//!
//! Used both to show circuits to the user and as the program text submitted
//! to the IBM runtime sampler.
//!
//! ```rust
//! use grover_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("x", 1, 0);
//! circuit.x(QubitId(0)).unwrap();
//! let qasm = grover_qasm3::emit(&circuit).unwrap();
//! assert!(qasm.contains("x q[0];"));
//! ```

mod emitter;
mod error;

pub use emitter::emit;
pub use error::{EmitError, EmitResult};
