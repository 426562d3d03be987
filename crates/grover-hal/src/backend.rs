//! Backend trait and polling.
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit(batch) ──→ status() ──→ result()
//!    (sync, &ref)        (sync)          (async)         (async)      (async)
//! ```
//!
//! A job is always a whole batch of circuits. `submit` validates every
//! circuit before anything is sent, so a batch is either accepted in full
//! or not at all.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use grover_ir::Circuit;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// How [`Backend::wait_with`] polls for completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    /// Give up after this long. `None` blocks until the job finishes.
    pub timeout: Option<Duration>,
}

impl WaitPolicy {
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: None,
        }
    }
}

/// A quantum execution target.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    /// Capabilities, cached at construction.
    fn capabilities(&self) -> &Capabilities;

    /// Lightweight liveness and queue check.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Check one circuit against the backend's constraints.
    fn validate(&self, circuit: &Circuit) -> ValidationResult {
        let caps = self.capabilities();
        let mut reasons = vec![];

        if circuit.num_qubits() > caps.num_qubits as usize {
            reasons.push(format!(
                "{} uses {} qubits, backend has {}",
                circuit.name(),
                circuit.num_qubits(),
                caps.num_qubits
            ));
        }
        if !circuit.is_measured() {
            reasons.push(format!("{} has no measurements", circuit.name()));
        }
        if !reasons.is_empty() {
            return ValidationResult::Invalid { reasons };
        }

        let foreign: Vec<_> = circuit
            .gate_counts()
            .into_keys()
            .filter(|g| !matches!(*g, "measure" | "barrier") && !caps.supports_gate(g))
            .collect();
        if foreign.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::RequiresTranspilation {
                details: format!("non-native gates: {}", foreign.join(", ")),
            }
        }
    }

    /// Check a whole batch before submission.
    ///
    /// Circuits that merely need transpilation pass; the backend is expected
    /// to transpile them (the IBM runtime does) or to run them natively.
    fn check_batch(&self, circuits: &[Circuit], shots: u32) -> HalResult<()> {
        let caps = self.capabilities();
        if circuits.is_empty() {
            return Err(HalError::EmptyBatch);
        }
        if shots == 0 || shots > caps.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} (allowed 1..={})",
                caps.max_shots
            )));
        }
        if let Some(max) = caps.max_circuits {
            if circuits.len() > max as usize {
                return Err(HalError::BatchTooLarge {
                    got: circuits.len(),
                    max,
                });
            }
        }
        for circuit in circuits {
            if circuit.num_qubits() > caps.num_qubits as usize {
                return Err(HalError::CircuitTooLarge {
                    qubits: circuit.num_qubits(),
                    max: caps.num_qubits,
                });
            }
            if let ValidationResult::Invalid { reasons } = self.validate(circuit) {
                return Err(HalError::InvalidCircuit(reasons.join("; ")));
            }
        }
        Ok(())
    }

    /// Submit a batch as one job. Each circuit runs `shots` times.
    async fn submit(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId>;

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Results of a completed job, one per submitted circuit.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Block until the job finishes, polling with the default policy.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.wait_with(job_id, WaitPolicy::default()).await
    }

    /// Block until the job finishes and fetch its results.
    async fn wait_with(&self, job_id: &JobId, policy: WaitPolicy) -> HalResult<ExecutionResult> {
        self.wait_for_completion(job_id, policy).await?;
        self.result(job_id).await
    }

    /// Poll until the job completes. Failure and cancellation are errors.
    async fn wait_for_completion(&self, job_id: &JobId, policy: WaitPolicy) -> HalResult<()> {
        let started = tokio::time::Instant::now();
        let mut last = None;

        loop {
            let status = self.status(job_id).await?;
            if last.as_ref() != Some(&status) {
                debug!("Job {} is {}", job_id, status);
                last = Some(status.clone());
            }
            match status {
                JobStatus::Completed => return Ok(()),
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled(job_id.0.clone())),
                JobStatus::Queued | JobStatus::Running => {}
            }
            if let Some(timeout) = policy.timeout {
                if started.elapsed() >= timeout {
                    return Err(HalError::Timeout(job_id.0.clone()));
                }
            }
            tokio::time::sleep(policy.poll_interval).await;
        }
    }
}

/// Backend liveness and queue information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendAvailability {
    pub is_available: bool,
    /// Jobs ahead in the queue, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl BackendAvailability {
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: None,
            status_message: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Outcome of [`Backend::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationResult {
    Valid,
    Invalid { reasons: Vec<String> },
    /// Runnable once lowered to the native gate set.
    RequiresTranspilation { details: String },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use grover_ir::QubitId;

    use crate::result::{CircuitResult, Counts};

    /// Backend that reports `Running` a fixed number of times, then a final
    /// status.
    struct ScriptedBackend {
        caps: Capabilities,
        polls_before_done: u32,
        polls: AtomicU32,
        final_status: JobStatus,
        submitted: Mutex<usize>,
    }

    impl ScriptedBackend {
        fn new(polls_before_done: u32, final_status: JobStatus) -> Self {
            Self {
                caps: Capabilities::simulator("scripted", 3),
                polls_before_done,
                polls: AtomicU32::new(0),
                final_status,
                submitted: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl Backend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        fn capabilities(&self) -> &Capabilities {
            &self.caps
        }

        async fn availability(&self) -> HalResult<BackendAvailability> {
            Ok(BackendAvailability::always_available())
        }

        async fn submit(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId> {
            self.check_batch(circuits, shots)?;
            *self.submitted.lock().unwrap() = circuits.len();
            Ok(JobId::new("scripted-1"))
        }

        async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst);
            if n < self.polls_before_done {
                Ok(JobStatus::Running)
            } else {
                Ok(self.final_status.clone())
            }
        }

        async fn result(&self, _job_id: &JobId) -> HalResult<ExecutionResult> {
            let n = *self.submitted.lock().unwrap();
            let counts: Counts = [("000", 10)].into_iter().collect();
            Ok(ExecutionResult::new(
                vec![CircuitResult::from_counts(counts); n],
                10,
            ))
        }

        async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
            Ok(())
        }
    }

    fn measured(n: u32) -> Circuit {
        let mut c = Circuit::with_size("m", n, 0);
        c.h(QubitId(0)).unwrap();
        c.measure_all().unwrap();
        c
    }

    #[test]
    fn test_validate() {
        let backend = ScriptedBackend::new(0, JobStatus::Completed);
        assert!(backend.validate(&measured(3)).is_valid());
        assert!(matches!(
            backend.validate(&measured(4)),
            ValidationResult::Invalid { .. }
        ));

        let unmeasured = Circuit::with_size("bare", 2, 0);
        assert!(!backend.validate(&unmeasured).is_valid());
    }

    #[test]
    fn test_check_batch_is_all_or_nothing() {
        let backend = ScriptedBackend::new(0, JobStatus::Completed);
        let batch = vec![measured(2), measured(5)];
        assert!(matches!(
            backend.check_batch(&batch, 100),
            Err(HalError::CircuitTooLarge { qubits: 5, max: 3 })
        ));
        assert!(matches!(backend.check_batch(&[], 100), Err(HalError::EmptyBatch)));
        assert!(matches!(
            backend.check_batch(&[measured(2)], 0),
            Err(HalError::InvalidShots(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_polls_until_complete() {
        let backend = ScriptedBackend::new(3, JobStatus::Completed);
        let job = backend.submit(&[measured(2), measured(2)], 10).await.unwrap();
        let result = backend.wait(&job).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(backend.polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_reports_failure() {
        let backend = ScriptedBackend::new(1, JobStatus::Failed("calibration".into()));
        let job = backend.submit(&[measured(1)], 10).await.unwrap();
        let err = backend.wait(&job).await.unwrap_err();
        assert!(matches!(err, HalError::JobFailed(msg) if msg == "calibration"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let backend = ScriptedBackend::new(u32::MAX, JobStatus::Completed);
        let job = backend.submit(&[measured(1)], 10).await.unwrap();
        let policy = WaitPolicy::default().with_timeout(Some(Duration::from_secs(2)));
        let err = backend.wait_with(&job, policy).await.unwrap_err();
        assert!(matches!(err, HalError::Timeout(_)));
    }
}
