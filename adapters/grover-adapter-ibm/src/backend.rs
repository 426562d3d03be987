//! IBM Quantum backend implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use grover_hal::{
    Backend, BackendAvailability, Capabilities, CircuitResult, Counts, ExecutionResult, HalError,
    HalResult, JobId, JobStatus, QuasiDistribution, WaitPolicy, bit_label,
};
use grover_ir::Circuit;

use crate::api::{BackendInfo, IbmClient, JobStatusResponse, PubResult, SamplerResults};
use crate::error::{IbmError, IbmResult};

/// Device the hardware mode targets unless configured otherwise.
pub const DEFAULT_HARDWARE_BACKEND: &str = "ibm_oslo";

/// Cloud simulator used by the simulate mode and the hello-world program.
pub const DEFAULT_SIMULATOR_BACKEND: &str = "ibmq_qasm_simulator";

/// How long cached backend info stays fresh.
const BACKEND_INFO_TTL: Duration = Duration::from_secs(5 * 60);

/// Gates IBM devices accept when the runtime does not report any.
const FALLBACK_BASIS: [&str; 5] = ["id", "rz", "sx", "x", "cx"];

/// IBM Quantum backend adapter.
pub struct IbmBackend {
    client: Arc<IbmClient>,
    capabilities: Capabilities,
    backend_info: Arc<RwLock<Option<(BackendInfo, Instant)>>>,
    /// Classical register width of every circuit, per submitted job.
    widths: Arc<RwLock<HashMap<String, Vec<usize>>>>,
}

impl IbmBackend {
    /// Resolve `target` on the runtime and cache its configuration.
    pub async fn connect(client: Arc<IbmClient>, target: &str) -> IbmResult<Self> {
        let info = client.get_backend(target).await?;
        info!(
            "resolved {} ({} qubits, {})",
            info.name,
            info.num_qubits,
            if info.simulator { "simulator" } else { "device" }
        );
        Ok(Self::with_info(client, info))
    }

    /// Build from already fetched backend info.
    pub fn with_info(client: Arc<IbmClient>, info: BackendInfo) -> Self {
        let capabilities = capabilities_from(&info);
        Self {
            client,
            capabilities,
            backend_info: Arc::new(RwLock::new(Some((info, Instant::now())))),
            widths: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The runtime target name.
    pub fn target(&self) -> &str {
        &self.capabilities.name
    }

    async fn backend_info(&self) -> IbmResult<BackendInfo> {
        {
            let cached = self.backend_info.read().await;
            if let Some((info, fetched_at)) = cached.as_ref() {
                if fetched_at.elapsed() < BACKEND_INFO_TTL {
                    return Ok(info.clone());
                }
            }
        }

        let info = self.client.get_backend(self.target()).await?;
        *self.backend_info.write().await = Some((info.clone(), Instant::now()));
        Ok(info)
    }

    /// Submit a runtime program job, e.g. `hello-world`.
    pub async fn run_program(
        &self,
        program_id: &str,
        params: serde_json::Value,
    ) -> HalResult<JobId> {
        let response = self
            .client
            .run_program(program_id, self.target(), params)
            .await
            .map_err(|e| HalError::SubmissionFailed(e.to_string()))?;
        Ok(JobId::new(response.id))
    }

    /// Block until a program job completes and return its raw result.
    pub async fn wait_program(
        &self,
        job_id: &JobId,
        policy: WaitPolicy,
    ) -> HalResult<serde_json::Value> {
        self.wait_for_completion(job_id, policy).await?;
        Ok(self.client.get_job_results(&job_id.0).await?)
    }

    /// Decode a finished sampler job. The job's recorded register widths
    /// are dropped once decoding succeeds.
    async fn decode_job(
        &self,
        job_id: &JobId,
        raw: serde_json::Value,
    ) -> HalResult<Vec<CircuitResult>> {
        let results: SamplerResults = serde_json::from_value(raw)?;
        let widths = self
            .widths
            .read()
            .await
            .get(&job_id.0)
            .cloned()
            .unwrap_or_default();

        let circuits = decode_results(results, &widths)?;
        self.widths.write().await.remove(&job_id.0);
        Ok(circuits)
    }
}

fn capabilities_from(info: &BackendInfo) -> Capabilities {
    let basis = if info.basis_gates.is_empty() {
        FALLBACK_BASIS.iter().map(|g| (*g).to_string()).collect()
    } else {
        info.basis_gates.clone()
    };
    let mut caps = Capabilities::ibm(&info.name, info.num_qubits, basis, info.simulator);
    if let Some(max) = info.max_shots {
        caps.max_shots = max;
    }
    if info.max_circuits.is_some() {
        caps.max_circuits = info.max_circuits;
    }
    caps
}

/// Map a runtime job status onto the HAL status.
fn map_status(status: &JobStatusResponse) -> JobStatus {
    match status.status.to_uppercase().as_str() {
        "QUEUED" | "INITIALIZING" => JobStatus::Queued,
        "COMPLETED" | "DONE" => JobStatus::Completed,
        "FAILED" | "ERROR" => JobStatus::Failed(
            status
                .error_message()
                .unwrap_or_else(|| "Unknown error".to_string()),
        ),
        "CANCELLED" | "CANCELLED - RAN TOO LONG" => JobStatus::Cancelled,
        // VALIDATING, RUNNING and anything new
        _ => JobStatus::Running,
    }
}

fn parse_sample(sample: &str) -> IbmResult<u64> {
    let parsed = match sample.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => sample.parse(),
    };
    parsed.map_err(|_| IbmError::MalformedResult(format!("unreadable outcome '{sample}'")))
}

fn bit_length(value: u64) -> usize {
    (64 - value.leading_zeros() as usize).max(1)
}

fn decode_pub(result: PubResult, width: Option<usize>) -> IbmResult<CircuitResult> {
    // registers in name order so labels are stable across runs
    let registers: BTreeMap<_, _> = result.data.into_iter().collect();
    let mut counts = Counts::new();
    for (name, register) in registers {
        let values = register
            .samples
            .iter()
            .map(|s| parse_sample(s))
            .collect::<IbmResult<Vec<_>>>()?;
        let width = register.num_bits.or(width).unwrap_or_else(|| {
            let inferred = values.iter().copied().map(bit_length).max().unwrap_or(1);
            warn!("register {name} has no width, inferred {inferred} bits");
            inferred
        });
        for value in values {
            counts.insert(bit_label(value, width), 1);
        }
    }

    Ok(CircuitResult::from_counts(counts))
}

/// Convert a sampler result document into one result per circuit.
///
/// `widths` holds the classical register width of each submitted circuit,
/// when known; outcome labels are padded to it.
fn decode_results(
    results: SamplerResults,
    widths: &[usize],
) -> IbmResult<Vec<CircuitResult>> {
    if !results.results.is_empty() {
        return results
            .results
            .into_iter()
            .enumerate()
            .map(|(i, pub_result)| {
                let metadata = pub_result.metadata.clone().unwrap_or_default();
                decode_pub(pub_result, widths.get(i).copied())
                    .map(|result| result.with_metadata(metadata))
            })
            .collect();
    }

    let Some(quasi_dists) = results.quasi_dists else {
        return Err(IbmError::MalformedResult(
            "neither sampler PUB results nor quasi distributions".into(),
        ));
    };
    quasi_dists
        .into_iter()
        .enumerate()
        .map(|(i, dist)| {
            let entries = dist
                .into_iter()
                .map(|(key, p)| parse_sample(&key).map(|v| (v, p)))
                .collect::<IbmResult<Vec<_>>>()?;
            let width = widths.get(i).copied().unwrap_or_else(|| {
                entries
                    .iter()
                    .map(|(v, _)| bit_length(*v))
                    .max()
                    .unwrap_or(1)
            });
            Ok(CircuitResult::from_distribution(
                entries
                    .into_iter()
                    .map(|(v, p)| (bit_label(v, width), p))
                    .collect::<QuasiDistribution>(),
            ))
        })
        .collect()
}

#[async_trait]
impl Backend for IbmBackend {
    fn name(&self) -> &str {
        self.target()
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        match self.backend_info().await {
            Ok(info) if info.status.operational => Ok(BackendAvailability {
                is_available: true,
                queue_depth: info.status.pending_jobs,
                status_message: info.status.status_msg,
            }),
            Ok(info) => Ok(BackendAvailability::unavailable(
                info.status
                    .status_msg
                    .unwrap_or_else(|| "backend offline".to_string()),
            )),
            Err(e) => {
                warn!("IBM backend availability check failed: {e}");
                Ok(BackendAvailability::unavailable("failed to query backend"))
            }
        }
    }

    #[instrument(skip(self, circuits))]
    async fn submit(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId> {
        self.check_batch(circuits, shots)?;

        let info = self.backend_info().await?;
        if !info.status.operational {
            return Err(HalError::BackendUnavailable(
                info.status
                    .status_msg
                    .unwrap_or_else(|| format!("{} is offline", info.name)),
            ));
        }

        let qasm = circuits
            .iter()
            .map(|c| grover_qasm3::emit(c).map_err(|e| HalError::InvalidCircuit(e.to_string())))
            .collect::<HalResult<Vec<_>>>()?;

        let response = self
            .client
            .submit_sampler_job(self.target(), &qasm, shots)
            .await
            .map_err(|e| match e {
                IbmError::Http(e) => HalError::Network(e),
                other => HalError::SubmissionFailed(other.to_string()),
            })?;
        info!(
            "submitted job {} with {} circuits to {}",
            response.id,
            circuits.len(),
            self.target()
        );

        let widths = circuits.iter().map(Circuit::num_clbits).collect();
        self.widths.write().await.insert(response.id.clone(), widths);
        Ok(JobId::new(response.id))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let status = self.client.get_job_status(&job_id.0).await?;
        let mapped = map_status(&status);
        debug!("job {} raw status {} -> {}", job_id, status.status, mapped);
        Ok(mapped)
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let status = self.client.get_job_status(&job_id.0).await?;
        match map_status(&status) {
            JobStatus::Completed => {}
            JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
            JobStatus::Cancelled => return Err(HalError::JobCancelled(job_id.0.clone())),
            other => {
                return Err(HalError::Backend(format!(
                    "Job {job_id} has no result yet ({other})"
                )));
            }
        }

        let raw = self.client.get_job_results(&job_id.0).await?;
        let circuits = self.decode_job(job_id, raw).await?;
        let shots = circuits
            .first()
            .and_then(|c| c.counts.as_ref())
            .map_or(0, |c| u32::try_from(c.total_shots()).unwrap_or(u32::MAX));
        Ok(ExecutionResult::new(circuits, shots).with_metadata(serde_json::json!({
            "backend": self.target(),
            "job_id": job_id.0,
        })))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client.cancel_job(&job_id.0).await?;
        self.widths.write().await.remove(&job_id.0);
        Ok(())
    }
}
