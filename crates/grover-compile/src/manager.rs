//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use grover_ir::Circuit;

use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::passes::{BasisTranslation, PeepholeOptimization};
use crate::property::BasisGates;

/// Runs a fixed sequence of passes against one target basis.
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
    basis: BasisGates,
}

impl PassManager {
    /// An empty manager for `basis`.
    pub fn new(basis: BasisGates) -> Self {
        Self {
            passes: vec![],
            basis,
        }
    }

    /// The standard pipeline for a target.
    ///
    /// - Level 0: basis translation only
    /// - Level 1 and above: translation followed by peephole cleanup
    pub fn for_target(basis: BasisGates, optimization_level: u8) -> CompileResult<Self> {
        if !basis.is_supported() {
            return Err(CompileError::UnsupportedBasis(basis.gates().to_vec()));
        }
        let mut pm = Self::new(basis);
        pm.add_pass(BasisTranslation);
        if optimization_level > 0 {
            pm.add_pass(PeepholeOptimization);
        }
        Ok(pm)
    }

    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Compile one circuit, returning the transformed copy.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &Circuit) -> CompileResult<Circuit> {
        let mut dag = circuit.dag().clone();
        debug!("Compiling with {} passes, {} ops", self.passes.len(), dag.num_ops());

        for pass in &self.passes {
            pass.run(&mut dag, &self.basis)?;
            debug!("Pass {} completed, ops: {}", pass.name(), dag.num_ops());
        }

        info!(
            "Compiled {}: depth {} -> {}, ops {} -> {}",
            circuit.name(),
            circuit.depth(),
            dag.depth(),
            circuit.num_ops(),
            dag.num_ops()
        );
        Ok(Circuit::from_dag(circuit.name(), dag))
    }

    /// Compile every circuit of a batch, preserving order.
    pub fn run_all<'a>(
        &self,
        circuits: impl IntoIterator<Item = &'a Circuit>,
    ) -> CompileResult<Vec<Circuit>> {
        circuits.into_iter().map(|c| self.run(c)).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn basis(&self) -> &BasisGates {
        &self.basis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grover_ir::QubitId;

    #[test]
    fn test_levels() {
        assert_eq!(PassManager::for_target(BasisGates::ibm(), 0).unwrap().len(), 1);
        assert_eq!(PassManager::for_target(BasisGates::ibm(), 1).unwrap().len(), 2);
    }

    #[test]
    fn test_rejects_unknown_basis() {
        let err = PassManager::for_target(BasisGates::new(["prx", "cz"]), 1);
        assert!(matches!(err, Err(CompileError::UnsupportedBasis(_))));
    }

    #[test]
    fn test_run_keeps_name_and_width() {
        let mut circuit = Circuit::with_size("grover_k2", 3, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        circuit.measure_all().unwrap();

        let pm = PassManager::for_target(BasisGates::ibm(), 1).unwrap();
        let compiled = pm.run(&circuit).unwrap();
        assert_eq!(compiled.name(), "grover_k2");
        assert_eq!(compiled.num_qubits(), 3);
        assert_eq!(compiled.num_clbits(), 3);
        assert!(compiled.is_measured());
    }
}
