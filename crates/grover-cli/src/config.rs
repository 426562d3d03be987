//! Configuration for the `grover` binary.
//!
//! Sources, highest precedence first:
//! 1. Environment variables (`GROVER_` prefix, `.env` included)
//! 2. Configuration file (YAML)
//! 3. Default values

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use grover_adapter_ibm::{DEFAULT_HARDWARE_BACKEND, DEFAULT_SIMULATOR_BACKEND};
use grover_hal::WaitPolicy;
use grover_search::MAX_SEARCH_QUBITS;
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "GROVER_";

/// Which simulator `search` uses in simulate mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulatorKind {
    /// In-process state-vector simulator.
    Local,
    /// The runtime's cloud simulator.
    Ibm,
}

impl fmt::Display for SimulatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulatorKind::Local => f.write_str("local"),
            SimulatorKind::Ibm => f.write_str("ibm"),
        }
    }
}

impl FromStr for SimulatorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(SimulatorKind::Local),
            "ibm" => Ok(SimulatorKind::Ibm),
            other => Err(ConfigError::ValidationError(format!(
                "Unknown simulator: {other} (expected local or ibm)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shots per circuit
    pub shots: u32,

    /// Search register width
    pub qubits: u32,

    pub simulator: SimulatorKind,

    /// Device used in hardware mode
    pub hardware_backend: String,

    /// Runtime simulator used by `--simulator ibm` and `hello-world`
    pub cloud_simulator_backend: String,

    /// Job status poll interval in milliseconds
    pub poll_interval_ms: u64,

    /// Give up waiting after this many seconds (no limit when unset)
    pub wait_timeout_secs: Option<u64>,

    /// Runtime endpoint override
    pub endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            shots: 1000,
            qubits: 3,
            simulator: SimulatorKind::Local,
            hardware_backend: DEFAULT_HARDWARE_BACKEND.to_string(),
            cloud_simulator_backend: DEFAULT_SIMULATOR_BACKEND.to_string(),
            poll_interval_ms: 2000,
            wait_timeout_secs: None,
            endpoint: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.as_ref().display())))?;

        let config: Config = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// `~/.grover/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".grover").join("config.yaml"))
    }

    /// Load with `.env`, then the file (explicit path, else the default
    /// location if it exists), then environment overrides.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(path)?,
                None => Config::default(),
            },
        };

        let config = config.merge_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `GROVER_*` overrides from `env`. Only variables that are set
    /// change anything.
    pub fn merge_env(mut self, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| env(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = var("SHOTS") {
            self.shots = parse_var("SHOTS", &v)?;
        }
        if let Some(v) = var("QUBITS") {
            self.qubits = parse_var("QUBITS", &v)?;
        }
        if let Some(v) = var("SIMULATOR") {
            self.simulator = v.parse()?;
        }
        if let Some(v) = var("HARDWARE_BACKEND") {
            self.hardware_backend = v;
        }
        if let Some(v) = var("CLOUD_SIMULATOR_BACKEND") {
            self.cloud_simulator_backend = v;
        }
        if let Some(v) = var("POLL_INTERVAL_MS") {
            self.poll_interval_ms = parse_var("POLL_INTERVAL_MS", &v)?;
        }
        if let Some(v) = var("WAIT_TIMEOUT_SECS") {
            self.wait_timeout_secs = Some(parse_var("WAIT_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = var("ENDPOINT") {
            self.endpoint = Some(v);
        }

        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shots == 0 {
            return Err(ConfigError::ValidationError(
                "shots must be greater than 0".to_string(),
            ));
        }
        if self.qubits == 0 || self.qubits > MAX_SEARCH_QUBITS {
            return Err(ConfigError::ValidationError(format!(
                "qubits must be between 1 and {MAX_SEARCH_QUBITS}, got {}",
                self.qubits
            )));
        }
        if self.hardware_backend.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "hardware_backend must not be empty".to_string(),
            ));
        }
        if self.cloud_simulator_backend.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "cloud_simulator_backend must not be empty".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if let Some(ref endpoint) = self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "endpoint must be an http(s) URL: {endpoint}"
                )));
            }
        }
        Ok(())
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::default()
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_timeout(self.wait_timeout_secs.map(Duration::from_secs))
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| {
        ConfigError::ValidationError(format!("{ENV_PREFIX}{name} has an invalid value: {value}"))
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.shots, 1000);
        assert_eq!(config.qubits, 3);
        assert_eq!(config.simulator, SimulatorKind::Local);
        assert_eq!(config.hardware_backend, "ibm_oslo");
        assert_eq!(config.cloud_simulator_backend, "ibmq_qasm_simulator");
        assert!(config.wait_timeout_secs.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "shots: 4096\nsimulator: ibm\nwait_timeout_secs: 600").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.shots, 4096);
        assert_eq!(config.simulator, SimulatorKind::Ibm);
        assert_eq!(config.wait_timeout_secs, Some(600));
        assert_eq!(config.qubits, 3);
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "shots: [1, 2]").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::from_file(dir.path().join("absent.yaml")),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .merge_env(env(&[
                ("GROVER_SHOTS", "250"),
                ("GROVER_SIMULATOR", "IBM"),
                ("GROVER_HARDWARE_BACKEND", "ibm_kyiv"),
                ("GROVER_WAIT_TIMEOUT_SECS", "30"),
            ]))
            .unwrap();
        assert_eq!(config.shots, 250);
        assert_eq!(config.simulator, SimulatorKind::Ibm);
        assert_eq!(config.hardware_backend, "ibm_kyiv");
        assert_eq!(config.wait_timeout_secs, Some(30));
        assert_eq!(config.qubits, 3);
    }

    #[test]
    fn test_env_override_bad_number() {
        let err = Config::default()
            .merge_env(env(&[("GROVER_SHOTS", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("GROVER_SHOTS"));
    }

    #[test]
    fn test_validate_rejects_wide_register() {
        let config = Config {
            qubits: MAX_SEARCH_QUBITS + 1,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let config = Config {
            endpoint: Some("quantum.example".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wait_policy() {
        let config = Config {
            poll_interval_ms: 250,
            wait_timeout_secs: Some(5),
            ..Config::default()
        };
        let policy = config.wait_policy();
        assert_eq!(policy.poll_interval, Duration::from_millis(250));
        assert_eq!(policy.timeout, Some(Duration::from_secs(5)));
    }
}
