//! IBM Quantum runtime REST client.
//!
//! Covers what the pipeline needs from the runtime:
//! - IAM token exchange for IBM Cloud API keys
//! - backend listing and configuration
//! - sampler jobs (one PUB per circuit) and free-form program jobs
//! - job status, results and cancellation
//!
//! Both the IBM Cloud API (`quantum.cloud.ibm.com/api`) and the legacy
//! platform (`api.quantum-computing.ibm.com`) are supported.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode, header};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{IbmError, IbmResult};

/// IBM Cloud quantum API endpoint.
pub const CLOUD_ENDPOINT: &str = "https://quantum.cloud.ibm.com/api";

/// Legacy IBM Quantum platform endpoint.
pub const LEGACY_ENDPOINT: &str = "https://api.quantum-computing.ibm.com";

/// Open-plan instance on the legacy platform.
pub const DEFAULT_INSTANCE: &str = "ibm-q/open/main";

const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

const IBM_API_VERSION: &str = "2025-01-01";

/// The default reqwest user agent is rejected by the API gateway.
const USER_AGENT: &str = concat!("grover/", env!("CARGO_PKG_VERSION"));

/// Sampler transpilation level; the runtime maps onto the device layout.
const OPTIMIZATION_LEVEL: u8 = 1;

/// IBM Quantum API client.
pub struct IbmClient {
    client: Client,
    endpoint: String,
    /// hub/group/project, legacy platform only.
    instance: Option<String>,
    cloud_api: bool,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("instance", &self.instance)
            .field("cloud_api", &self.cloud_api)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
}

fn default_headers(bearer: &str) -> IbmResult<header::HeaderMap> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {bearer}"))
            .map_err(|_| IbmError::InvalidToken)?,
    );
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    Ok(headers)
}

fn build_client(headers: header::HeaderMap) -> IbmResult<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

/// Turn a non-success response into an [`IbmError`].
async fn api_error(response: Response, context: &str) -> IbmError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());
    // The API wraps messages as {"errors": [{"message": ...}]} or {"message": ...}
    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(ApiErrorResponse::into_message)
        .unwrap_or(body);
    IbmError::Api {
        status: status.as_u16(),
        message: format!("{context}: {message}"),
    }
}

impl IbmClient {
    /// Client for a bearer token (legacy platform, or a custom endpoint).
    pub fn new(endpoint: impl Into<String>, token: &str) -> IbmResult<Self> {
        Ok(Self {
            client: build_client(default_headers(token)?)?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            instance: None,
            cloud_api: false,
        })
    }

    /// Client for the IBM Cloud API.
    ///
    /// Exchanges the API key for an IAM bearer token. Every request carries
    /// the `Service-CRN` header naming the runtime instance.
    pub async fn connect(api_key: &str, service_crn: &str) -> IbmResult<Self> {
        let iam_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let response = iam_client
            .post(IAM_TOKEN_URL)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(format!(
                "grant_type=urn:ibm:params:oauth:grant-type:apikey&apikey={api_key}"
            ))
            .send()
            .await
            .map_err(|e| IbmError::IamTokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(IbmError::IamTokenExchange(format!(
                "IAM returned {status}: {body}"
            )));
        }
        let iam: IamTokenResponse = response.json().await.map_err(|e| {
            IbmError::IamTokenExchange(format!("failed to parse IAM response: {e}"))
        })?;

        let mut headers = default_headers(&iam.access_token)?;
        headers.insert(
            header::HeaderName::from_static("service-crn"),
            header::HeaderValue::from_str(service_crn).map_err(|_| IbmError::MissingServiceCrn)?,
        );
        headers.insert(
            header::HeaderName::from_static("ibm-api-version"),
            header::HeaderValue::from_static(IBM_API_VERSION),
        );

        Ok(Self {
            client: build_client(headers)?,
            endpoint: CLOUD_ENDPOINT.to_string(),
            instance: None,
            cloud_api: true,
        })
    }

    /// Set the hub/group/project used for legacy job submission.
    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn is_cloud_api(&self) -> bool {
        self.cloud_api
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// All backends visible to the account.
    pub async fn list_backends(&self) -> IbmResult<Vec<BackendInfo>> {
        let url = format!("{}/v1/backends", self.endpoint);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response, "list backends failed").await);
        }

        let listing: BackendListing = response.json().await?;
        let mut backends = Vec::new();
        for name in listing.names() {
            match self.get_backend(&name).await {
                Ok(info) => backends.push(info),
                Err(e) => warn!("skipping backend {name}: {e}"),
            }
        }
        Ok(backends)
    }

    /// Configuration and status of one backend.
    pub async fn get_backend(&self, name: &str) -> IbmResult<BackendInfo> {
        let url = format!("{}/v1/backends/{name}/configuration", self.endpoint);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::BackendUnavailable(name.to_string()));
        }
        if !response.status().is_success() {
            return Err(api_error(response, &format!("configuration of {name}")).await);
        }
        let config: BackendConfigResponse = response.json().await?;

        let url = format!("{}/v1/backends/{name}/status", self.endpoint);
        let response = self.client.get(&url).send().await?;
        let status: BackendStatus = if response.status().is_success() {
            response.json::<BackendStatusResponse>().await?.into()
        } else {
            // configuration succeeded, so the device exists
            debug!("no status for {name}, assuming operational");
            BackendStatus {
                operational: true,
                status_msg: None,
                pending_jobs: None,
            }
        };

        Ok(BackendInfo::from_parts(config, status))
    }

    /// Submit a sampler job with one PUB per circuit.
    pub async fn submit_sampler_job(
        &self,
        backend: &str,
        circuits: &[String],
        shots: u32,
    ) -> IbmResult<SubmitResponse> {
        let pubs: Vec<serde_json::Value> = circuits
            .iter()
            .map(|qasm| serde_json::json!([qasm, {}, shots]))
            .collect();
        let params = serde_json::json!({
            "version": 2,
            "pubs": pubs,
            "options": { "optimization_level": OPTIMIZATION_LEVEL },
        });
        self.run_program("sampler", backend, params).await
    }

    /// Submit a job for an arbitrary runtime program.
    pub async fn run_program(
        &self,
        program_id: &str,
        backend: &str,
        params: serde_json::Value,
    ) -> IbmResult<SubmitResponse> {
        let url = format!("{}/v1/jobs", self.endpoint);
        let mut body = serde_json::json!({
            "program_id": program_id,
            "backend": backend,
            "params": params,
        });
        if let (false, Some(hub)) = (self.cloud_api, &self.instance) {
            body["hub"] = serde_json::json!(hub);
        }

        debug!("submitting {program_id} job to {backend}");
        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response, "job submission failed").await);
        }
        Ok(response.json().await?)
    }

    pub async fn get_job_status(&self, job_id: &str) -> IbmResult<JobStatusResponse> {
        let url = format!("{}/v1/jobs/{job_id}", self.endpoint);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(api_error(response, "job status").await);
        }
        Ok(response.json().await?)
    }

    /// Raw result document of a completed job.
    pub async fn get_job_results(&self, job_id: &str) -> IbmResult<serde_json::Value> {
        let url = format!("{}/v1/jobs/{job_id}/results", self.endpoint);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(api_error(response, "job results").await);
        }
        // hello-world returns a bare JSON string, so parse loosely
        let text = response.text().await?;
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }

    pub async fn cancel_job(&self, job_id: &str) -> IbmResult<()> {
        let url = format!("{}/v1/jobs/{job_id}/cancel", self.endpoint);
        let response = self.client.post(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(api_error(response, "job cancellation").await);
        }
        Ok(())
    }
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEntry {
    message: String,
}

impl ApiErrorResponse {
    fn into_message(self) -> Option<String> {
        self.message
            .or_else(|| self.errors.into_iter().next().map(|e| e.message))
    }
}

/// `/v1/backends`: `{"devices": [...]}` on the cloud API, `{"backends": [...]}` on legacy.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BackendListing {
    Cloud { devices: Vec<NamedEntry> },
    Legacy { backends: Vec<NamedEntry> },
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    #[serde(alias = "backend_name")]
    name: String,
}

impl BackendListing {
    fn names(self) -> Vec<String> {
        let entries = match self {
            BackendListing::Cloud { devices } => devices,
            BackendListing::Legacy { backends } => backends,
        };
        entries.into_iter().map(|e| e.name).collect()
    }
}

#[derive(Debug, Deserialize)]
struct BackendConfigResponse {
    backend_name: String,
    n_qubits: u32,
    #[serde(default)]
    basis_gates: Vec<String>,
    #[serde(default)]
    processor_type: Option<ProcessorType>,
    #[serde(default)]
    simulator: bool,
    #[serde(default)]
    max_shots: Option<u32>,
    #[serde(default)]
    max_experiments: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct BackendStatusResponse {
    state: bool,
    #[serde(default)]
    status: String,
    #[serde(default)]
    length_queue: u64,
}

impl From<BackendStatusResponse> for BackendStatus {
    fn from(s: BackendStatusResponse) -> Self {
        Self {
            operational: s.state,
            status_msg: Some(s.status).filter(|m| !m.is_empty()),
            pending_jobs: Some(u32::try_from(s.length_queue).unwrap_or(u32::MAX)),
        }
    }
}

/// Backend configuration merged with its live status.
#[derive(Debug, Clone)]
pub struct BackendInfo {
    pub name: String,
    pub num_qubits: u32,
    pub status: BackendStatus,
    pub processor_type: Option<ProcessorType>,
    pub basis_gates: Vec<String>,
    pub simulator: bool,
    pub max_shots: Option<u32>,
    pub max_circuits: Option<u32>,
}

impl BackendInfo {
    fn from_parts(config: BackendConfigResponse, status: BackendStatus) -> Self {
        Self {
            name: config.backend_name,
            num_qubits: config.n_qubits,
            status,
            processor_type: config.processor_type,
            basis_gates: config.basis_gates,
            simulator: config.simulator,
            max_shots: config.max_shots,
            max_circuits: config.max_experiments,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendStatus {
    pub operational: bool,
    pub status_msg: Option<String>,
    pub pending_jobs: Option<u32>,
}

/// Processor family, e.g. "Falcon", "Eagle", "Heron".
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorType {
    pub family: String,
    #[serde(default)]
    pub revision: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// Mixed case on the cloud API ("Completed"), upper case on legacy.
    pub status: String,
    /// Legacy failure details.
    #[serde(default)]
    pub error: Option<JobError>,
    /// Cloud failure details.
    #[serde(default)]
    pub state: Option<JobState>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobError {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    #[serde(default)]
    pub reason: Option<String>,
}

impl JobStatusResponse {
    pub fn error_message(&self) -> Option<String> {
        self.state
            .as_ref()
            .and_then(|s| s.reason.clone())
            .or_else(|| self.error.as_ref().map(|e| e.message.clone()))
    }
}

/// Sampler result document.
///
/// V2 sampler jobs return one entry in `results` per PUB. V1 jobs return a
/// top-level `quasi_dists` list with one distribution per circuit.
#[derive(Debug, Default, Deserialize)]
pub struct SamplerResults {
    #[serde(default)]
    pub results: Vec<PubResult>,
    #[serde(default)]
    pub quasi_dists: Option<Vec<HashMap<String, f64>>>,
}

#[derive(Debug, Deserialize)]
pub struct PubResult {
    /// Classical register name to samples.
    #[serde(default)]
    pub data: HashMap<String, RegisterData>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterData {
    /// One hex string per shot, e.g. `"0x5"`.
    pub samples: Vec<String>,
    #[serde(default)]
    pub num_bits: Option<usize>,
}
