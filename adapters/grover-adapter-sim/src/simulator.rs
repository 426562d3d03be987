//! Simulator backend implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use grover_hal::{
    Backend, BackendAvailability, Capabilities, CircuitResult, Counts, ExecutionResult, HalError,
    HalResult, Job, JobId, JobStatus, QuasiDistribution, bit_label,
};
use grover_ir::{Circuit, InstructionKind};

use crate::statevector::Statevector;

/// Default name reported by the backend.
pub const DEFAULT_NAME: &str = "local_simulator";
const DEFAULT_MAX_QUBITS: u32 = 20;
/// Outcomes below this probability are dropped from exact distributions.
const PROBABILITY_FLOOR: f64 = 1e-12;

struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local state-vector simulator.
///
/// Each circuit is simulated once; the requested shots are then drawn from
/// the final state. With a seed, results are reproducible. In exact mode the
/// returned distributions are the ideal probabilities instead of sampled
/// frequencies.
pub struct SimulatorBackend {
    capabilities: Capabilities,
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    seed: Option<u64>,
    exact: bool,
}

impl SimulatorBackend {
    pub fn new() -> Self {
        Self::with_max_qubits(DEFAULT_MAX_QUBITS)
    }

    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self {
            capabilities: Capabilities::simulator(DEFAULT_NAME, max_qubits),
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            seed: None,
            exact: false,
        }
    }

    /// Make sampling reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Return ideal probabilities instead of sampled frequencies.
    #[must_use]
    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Simulate one circuit and read out its measured classical bits.
    #[instrument(skip(self, circuit, rng), fields(circuit = circuit.name()))]
    fn run_circuit(
        &self,
        circuit: &Circuit,
        shots: u32,
        rng: &mut StdRng,
    ) -> HalResult<CircuitResult> {
        let start = Instant::now();
        let mut sv = Statevector::new(circuit.num_qubits());
        // (qubit, clbit) pairs, in measurement order
        let mut measured: Vec<(usize, usize)> = vec![];

        for inst in circuit.instructions() {
            match &inst.kind {
                InstructionKind::Measure => {
                    measured.extend(
                        inst.qubits
                            .iter()
                            .zip(&inst.clbits)
                            .map(|(q, c)| (q.index(), c.index())),
                    );
                }
                InstructionKind::Gate(gate) => {
                    let collapsed = inst
                        .qubits
                        .iter()
                        .find(|q| measured.iter().any(|&(m, _)| m == q.index()));
                    if let Some(q) = collapsed {
                        return Err(HalError::InvalidCircuit(format!(
                            "{}: gate {} acts on {} after it was measured",
                            circuit.name(),
                            gate.name(),
                            q
                        )));
                    }
                    sv.apply(inst);
                }
                InstructionKind::Barrier => {}
            }
        }

        let outcomes = readout(&sv, &measured);
        let width = circuit.num_clbits();
        let result = if self.exact {
            CircuitResult::from_distribution(
                outcomes
                    .iter()
                    .filter(|(_, p)| **p > PROBABILITY_FLOOR)
                    .map(|(&k, &p)| (bit_label(k, width), p))
                    .collect::<QuasiDistribution>(),
            )
        } else {
            CircuitResult::from_counts(sample(&outcomes, shots, width, rng))
        };

        debug!(
            "Simulated {} qubits in {:?}",
            circuit.num_qubits(),
            start.elapsed()
        );
        Ok(result.with_metadata(serde_json::json!({
            "simulator": DEFAULT_NAME,
            "shots": shots,
            "exact": self.exact,
        })))
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn with_jobs<T>(&self, f: impl FnOnce(&mut FxHashMap<String, SimJob>) -> T) -> T {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut jobs)
    }
}

/// Probability of each classical outcome, keyed by the integer the clbits
/// spell.
fn readout(sv: &Statevector, measured: &[(usize, usize)]) -> BTreeMap<u64, f64> {
    let mut outcomes = BTreeMap::new();
    for (basis, p) in sv.probabilities().into_iter().enumerate() {
        let mut key = 0u64;
        for &(q, c) in measured {
            if basis & (1 << q) != 0 {
                key |= 1 << c;
            }
        }
        *outcomes.entry(key).or_insert(0.0) += p;
    }
    outcomes
}

fn sample(outcomes: &BTreeMap<u64, f64>, shots: u32, width: usize, rng: &mut impl Rng) -> Counts {
    let mut keys = Vec::with_capacity(outcomes.len());
    let mut cumulative = Vec::with_capacity(outcomes.len());
    let mut total = 0.0;
    for (&k, &p) in outcomes {
        total += p;
        keys.push(k);
        cumulative.push(total);
    }

    let mut tally: BTreeMap<u64, u64> = BTreeMap::new();
    for _ in 0..shots {
        let r: f64 = rng.r#gen::<f64>() * total;
        let idx = cumulative.partition_point(|&c| c <= r).min(keys.len() - 1);
        *tally.entry(keys[idx]).or_default() += 1;
    }
    tally
        .into_iter()
        .map(|(k, n)| (bit_label(k, width), n))
        .collect()
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.capabilities.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    #[instrument(skip(self, circuits))]
    async fn submit(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId> {
        self.check_batch(circuits, shots)?;

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let mut job = Job::new(job_id.clone(), shots, circuits.len()).with_backend(self.name());
        job.transition(JobStatus::Running);
        info!("Simulating {} circuits, {} shots each", circuits.len(), shots);

        let start = Instant::now();
        let mut rng = self.rng();
        let results = circuits
            .iter()
            .map(|c| self.run_circuit(c, shots, &mut rng))
            .collect::<HalResult<Vec<_>>>();

        let result = match results {
            Ok(results) => {
                job.transition(JobStatus::Completed);
                let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                Some(ExecutionResult::new(results, shots).with_execution_time(elapsed))
            }
            Err(e) => {
                job.transition(JobStatus::Failed(e.to_string()));
                None
            }
        };

        self.with_jobs(|jobs| jobs.insert(job_id.0.clone(), SimJob { job, result }));
        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.with_jobs(|jobs| {
            jobs.get(&job_id.0)
                .map(|j| j.job.status.clone())
                .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
        })
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.with_jobs(|jobs| {
            let sim_job = jobs
                .get(&job_id.0)
                .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
            match (&sim_job.job.status, &sim_job.result) {
                (JobStatus::Completed, Some(result)) => Ok(result.clone()),
                (JobStatus::Failed(msg), _) => Err(HalError::JobFailed(msg.clone())),
                (JobStatus::Cancelled, _) => Err(HalError::JobCancelled(job_id.0.clone())),
                (status, _) => Err(HalError::Backend(format!(
                    "Job {job_id} has no result yet ({status})"
                ))),
            }
        })
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.with_jobs(|jobs| {
            let sim_job = jobs
                .get_mut(&job_id.0)
                .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
            sim_job.job.transition(JobStatus::Cancelled);
            Ok(())
        })
    }
}
