//! Backend selection for the `search` and `hello-world` commands.

use std::sync::Arc;

use async_trait::async_trait;
use grover_adapter_ibm::{Credentials, IbmBackend, IbmResult};
use grover_adapter_sim::SimulatorBackend;
use grover_hal::{AccountStore, Backend, HalError};
use grover_search::{BackendProvider, SearchResult};
use tracing::debug;

use crate::config::{Config, SimulatorKind};

/// Authenticate against the runtime and resolve `target`.
///
/// Environment credentials take precedence over the saved account.
pub async fn connect_ibm(endpoint: Option<&str>, target: &str) -> IbmResult<IbmBackend> {
    let store = AccountStore::default_location().ok();
    let mut credentials = Credentials::resolve(store.as_ref())?;
    if let Some(url) = endpoint {
        credentials = credentials.with_endpoint(url);
    }
    debug!("using {:?}", credentials);
    let client = credentials.client().await?;
    IbmBackend::connect(Arc::new(client), target).await
}

/// Builds the simulator and hardware backends from configuration.
#[derive(Debug, Clone)]
pub struct RuntimeProvider {
    simulator: SimulatorKind,
    cloud_simulator: String,
    hardware: String,
    endpoint: Option<String>,
    seed: Option<u64>,
}

impl RuntimeProvider {
    pub fn from_config(config: &Config) -> Self {
        Self {
            simulator: config.simulator,
            cloud_simulator: config.cloud_simulator_backend.clone(),
            hardware: config.hardware_backend.clone(),
            endpoint: config.endpoint.clone(),
            seed: None,
        }
    }

    #[must_use]
    pub fn with_simulator(mut self, kind: SimulatorKind) -> Self {
        self.simulator = kind;
        self
    }

    #[must_use]
    pub fn with_hardware_backend(mut self, name: impl Into<String>) -> Self {
        self.hardware = name.into();
        self
    }

    /// Seed for the local simulator's sampling.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn simulator_kind(&self) -> SimulatorKind {
        self.simulator
    }

    pub fn hardware_backend(&self) -> &str {
        &self.hardware
    }

    async fn ibm(&self, target: &str) -> SearchResult<Box<dyn Backend>> {
        let backend = connect_ibm(self.endpoint.as_deref(), target)
            .await
            .map_err(HalError::from)?;
        Ok(Box::new(backend))
    }
}

#[async_trait]
impl BackendProvider for RuntimeProvider {
    async fn simulator(&self) -> SearchResult<Box<dyn Backend>> {
        match self.simulator {
            SimulatorKind::Local => {
                let backend = match self.seed {
                    Some(seed) => SimulatorBackend::new().with_seed(seed),
                    None => SimulatorBackend::new(),
                };
                Ok(Box::new(backend))
            }
            SimulatorKind::Ibm => self.ibm(&self.cloud_simulator).await,
        }
    }

    async fn hardware(&self) -> SearchResult<Box<dyn Backend>> {
        self.ibm(&self.hardware).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = Config {
            hardware_backend: "ibm_kyiv".to_string(),
            ..Config::default()
        };
        let provider = RuntimeProvider::from_config(&config)
            .with_simulator(SimulatorKind::Ibm)
            .with_seed(Some(3));
        assert_eq!(provider.hardware_backend(), "ibm_kyiv");
        assert_eq!(provider.simulator_kind(), SimulatorKind::Ibm);

        let provider = provider.with_hardware_backend("ibm_sherbrooke");
        assert_eq!(provider.hardware_backend(), "ibm_sherbrooke");
    }

    #[tokio::test]
    async fn test_local_simulator() {
        let provider = RuntimeProvider::from_config(&Config::default()).with_seed(Some(1));
        let backend = provider.simulator().await.unwrap();
        assert_eq!(backend.name(), grover_adapter_sim::DEFAULT_NAME);
        assert!(backend.capabilities().is_simulator);
    }
}
