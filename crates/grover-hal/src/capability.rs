//! Backend capability description.

use serde::{Deserialize, Serialize};

/// What a backend can run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub name: String,
    pub num_qubits: u32,
    /// Native gate names (OpenQASM 3 spelling).
    pub basis_gates: Vec<String>,
    /// Maximum shots per circuit.
    pub max_shots: u32,
    /// Maximum circuits per job, if the backend imposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_circuits: Option<u32>,
    /// Whether the backend is a simulator rather than a device.
    pub is_simulator: bool,
}

impl Capabilities {
    /// A local simulator: every gate is native.
    pub fn simulator(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            basis_gates: [
                "h", "x", "z", "s", "sdg", "sx", "t", "tdg", "rz", "p", "cx", "cz", "cp", "ccx",
            ]
            .iter()
            .map(|g| (*g).to_string())
            .collect(),
            max_shots: 1_000_000,
            max_circuits: None,
            is_simulator: true,
        }
    }

    /// An IBM device or cloud simulator as reported by the runtime.
    pub fn ibm(
        name: impl Into<String>,
        num_qubits: u32,
        basis_gates: Vec<String>,
        is_simulator: bool,
    ) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            basis_gates,
            max_shots: 100_000,
            max_circuits: Some(300),
            is_simulator,
        }
    }

    pub fn supports_gate(&self, gate: &str) -> bool {
        self.basis_gates.iter().any(|g| g == gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_capabilities() {
        let caps = Capabilities::simulator("local", 20);
        assert!(caps.is_simulator);
        assert!(caps.supports_gate("ccx"));
        assert!(caps.max_circuits.is_none());
    }

    #[test]
    fn test_ibm_capabilities() {
        let caps = Capabilities::ibm(
            "ibm_oslo",
            7,
            vec!["rz".into(), "sx".into(), "x".into(), "cx".into()],
            false,
        );
        assert!(!caps.is_simulator);
        assert!(caps.supports_gate("cx"));
        assert!(!caps.supports_gate("ccx"));
    }
}
