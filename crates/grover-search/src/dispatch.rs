//! Execution dispatch: simulate, run on hardware, or abort.

use std::fmt;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use grover_compile::{BasisGates, PassManager};
use grover_hal::{Backend, ExecutionResult, JobId, QuasiDistribution, WaitPolicy};
use grover_ir::Circuit;

use crate::batch::CircuitBatch;
use crate::error::{SearchError, SearchResult};

/// What the user asked the run to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Simulate,
    Hardware,
    Abort,
}

impl ExecutionMode {
    /// Interpret the interactive menu answer: `1` simulates, `2` runs on
    /// hardware, anything else aborts.
    pub fn from_selection(input: &str) -> Self {
        match input.trim() {
            "1" => ExecutionMode::Simulate,
            "2" => ExecutionMode::Hardware,
            _ => ExecutionMode::Abort,
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Simulate => f.write_str("simulator"),
            ExecutionMode::Hardware => f.write_str("hardware"),
            ExecutionMode::Abort => f.write_str("abort"),
        }
    }
}

/// Supplies the backend for each execution mode.
///
/// Backends are only requested once the mode is known, so an aborted run
/// never authenticates or opens a connection.
#[async_trait]
pub trait BackendProvider: Send + Sync {
    async fn simulator(&self) -> SearchResult<Box<dyn Backend>>;

    /// Authenticate and resolve the hardware backend.
    async fn hardware(&self) -> SearchResult<Box<dyn Backend>>;
}

/// A finished job.
#[derive(Debug, Clone)]
pub struct Execution {
    pub mode: ExecutionMode,
    pub backend: String,
    pub job_id: JobId,
    pub result: ExecutionResult,
}

impl Execution {
    /// One distribution per submitted circuit, in batch order.
    pub fn distributions(&self) -> Vec<QuasiDistribution> {
        self.result.distributions().cloned().collect()
    }
}

#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Completed(Execution),
    Aborted,
}

/// Runs a batch on the backend the mode selects.
pub struct Dispatcher<P> {
    provider: P,
    wait: WaitPolicy,
    optimization_level: u8,
}

impl<P: BackendProvider> Dispatcher<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            wait: WaitPolicy::default(),
            optimization_level: 1,
        }
    }

    #[must_use]
    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// Optimization level for hardware compilation (0 = translation only).
    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.optimization_level = level;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Submit the whole batch as one job and block until it finishes.
    #[instrument(skip(self, batch), fields(circuits = batch.len()))]
    pub async fn dispatch(
        &self,
        batch: &CircuitBatch,
        shots: u32,
        mode: ExecutionMode,
    ) -> SearchResult<DispatchOutcome> {
        let (backend, circuits) = match mode {
            ExecutionMode::Abort => {
                info!("Run aborted before submission");
                return Ok(DispatchOutcome::Aborted);
            }
            ExecutionMode::Simulate => (self.provider.simulator().await?, batch.to_circuits()),
            ExecutionMode::Hardware => {
                let backend = self.provider.hardware().await?;
                info!("The used backend is: {}", backend.name());
                let circuits = self.compile_for(backend.as_ref(), batch)?;
                (backend, circuits)
            }
        };

        let job_id = backend.submit(&circuits, shots).await?;
        info!("Submitted job {} to {}", job_id, backend.name());
        let result = backend.wait_with(&job_id, self.wait).await?;

        if result.len() != batch.len() {
            return Err(SearchError::ResultMismatch {
                expected: batch.len(),
                got: result.len(),
            });
        }

        Ok(DispatchOutcome::Completed(Execution {
            mode,
            backend: backend.name().to_string(),
            job_id,
            result,
        }))
    }

    /// Translate the batch into the backend's native gates.
    ///
    /// Bases the passes cannot target are submitted untranslated and left to
    /// the runtime's own transpiler.
    fn compile_for(&self, backend: &dyn Backend, batch: &CircuitBatch) -> SearchResult<Vec<Circuit>> {
        let basis = BasisGates::new(backend.capabilities().basis_gates.clone());
        if !basis.is_supported() {
            warn!(
                "{} basis {:?} is not supported locally, leaving translation to the backend",
                backend.name(),
                basis.gates()
            );
            return Ok(batch.to_circuits());
        }
        let pm = PassManager::for_target(basis, self.optimization_level)?;
        Ok(pm.run_all(batch.circuits())?)
    }
}
