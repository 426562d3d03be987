//! Pass trait for compilation passes.

use grover_ir::CircuitDag;

use crate::error::CompileResult;
use crate::property::BasisGates;

/// A compilation step over a circuit DAG.
///
/// The DAG only supports appending, so passes build a replacement with
/// [`CircuitDag::empty_like`] and swap it in.
pub trait Pass: Send + Sync {
    fn name(&self) -> &'static str;

    /// Transform `dag` for the given target basis.
    fn run(&self, dag: &mut CircuitDag, basis: &BasisGates) -> CompileResult<()>;
}
