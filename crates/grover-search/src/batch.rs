//! Batches of measured Grover circuits, one per iteration count.

use grover_ir::Circuit;
use tracing::debug;

use crate::error::{SearchError, SearchResult};
use crate::grover::grover_circuit;
use crate::problem::AmplificationProblem;

/// Iteration counts the demo sweeps by default.
pub const DEFAULT_ITERATIONS: [u32; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

/// One measured circuit and the iteration count it was built with.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub iterations: u32,
    pub circuit: Circuit,
}

/// Circuits submitted together as one job, in iteration-list order.
#[derive(Debug, Clone)]
pub struct CircuitBatch {
    entries: Vec<BatchEntry>,
}

impl CircuitBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BatchEntry> {
        self.entries.iter()
    }

    pub fn circuits(&self) -> Vec<&Circuit> {
        self.entries.iter().map(|e| &e.circuit).collect()
    }

    pub fn iterations(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.iterations).collect()
    }

    /// Owned copies of the circuits, as [`grover_hal::Backend::submit`] takes them.
    pub fn to_circuits(&self) -> Vec<Circuit> {
        self.entries.iter().map(|e| e.circuit.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a CircuitBatch {
    type Item = &'a BatchEntry;
    type IntoIter = std::slice::Iter<'a, BatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Build one measured circuit per iteration count, preserving order.
///
/// Duplicate counts are allowed and produce independent circuits.
pub fn build_batch(problem: &AmplificationProblem, iterations: &[u32]) -> SearchResult<CircuitBatch> {
    if iterations.is_empty() {
        return Err(SearchError::EmptyBatch);
    }

    let entries = iterations
        .iter()
        .map(|&k| {
            let mut circuit = grover_circuit(problem, k)?;
            circuit.measure_all()?;
            debug!(
                "{}: {} ops, depth {}",
                circuit.name(),
                circuit.num_ops(),
                circuit.depth()
            );
            Ok(BatchEntry {
                iterations: k,
                circuit,
            })
        })
        .collect::<SearchResult<Vec<_>>>()?;

    Ok(CircuitBatch { entries })
}
