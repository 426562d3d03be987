//! Backends command implementation.

use anyhow::Result;
use console::style;

use grover_adapter_ibm::{BackendInfo, Credentials};
use grover_adapter_sim::SimulatorBackend;
use grover_hal::{AccountStore, Backend};

use crate::config::Config;

/// One listing line for an IBM backend.
pub fn describe(info: &BackendInfo) -> String {
    let status = if info.status.operational {
        info.status
            .status_msg
            .clone()
            .unwrap_or_else(|| "active".to_string())
    } else {
        "offline".to_string()
    };
    let pending = info
        .status
        .pending_jobs
        .map_or_else(|| "-".to_string(), |n| n.to_string());
    let kind = if info.simulator { "simulator" } else { "device" };
    format!(
        "{:<24} {:>4} qubits  {:<10} {:>6} pending  {kind}",
        info.name, info.num_qubits, status, pending
    )
}

/// Execute the backends command.
pub async fn execute(config: &Config) -> Result<()> {
    println!("{} Available backends:\n", style("Grover").cyan().bold());

    let sim = SimulatorBackend::new();
    let caps = sim.capabilities();
    let available = sim.availability().await?.is_available;
    println!(
        "  {} {} (local)",
        if available {
            style("●").green()
        } else {
            style("○").red()
        },
        style(sim.name()).bold()
    );
    println!("    Qubits: {}", caps.num_qubits);
    println!("    Max shots: {}", caps.max_shots);
    println!();

    let store = AccountStore::default_location().ok();
    let credentials = match Credentials::resolve(store.as_ref()) {
        Ok(credentials) => credentials,
        Err(e) => {
            println!("  {} {} (not configured)", style("○").dim(), style("ibm").dim());
            println!("    {e}");
            return Ok(());
        }
    };
    let credentials = match config.endpoint.as_deref() {
        Some(url) => credentials.with_endpoint(url),
        None => credentials,
    };
    let client = credentials.client().await?;

    println!("  {} ({})", style("ibm").bold(), client.endpoint());
    let mut backends = client.list_backends().await?;
    backends.sort_by(|a, b| a.name.cmp(&b.name));
    for info in &backends {
        let marker = if info.status.operational {
            style("●").green()
        } else {
            style("○").yellow()
        };
        println!("  {marker} {}", describe(info));
    }
    if backends.is_empty() {
        println!("    No backends visible to this account");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use grover_adapter_ibm::BackendStatus;

    use super::*;

    fn info(operational: bool, pending: Option<u32>) -> BackendInfo {
        BackendInfo {
            name: "ibm_oslo".to_string(),
            num_qubits: 7,
            status: BackendStatus {
                operational,
                status_msg: None,
                pending_jobs: pending,
            },
            processor_type: None,
            basis_gates: vec!["cx".into(), "rz".into(), "sx".into(), "x".into()],
            simulator: false,
            max_shots: None,
            max_circuits: None,
        }
    }

    #[test]
    fn test_describe_online() {
        let line = describe(&info(true, Some(12)));
        assert!(line.starts_with("ibm_oslo"));
        assert!(line.contains("7 qubits"));
        assert!(line.contains("active"));
        assert!(line.contains("12 pending"));
        assert!(line.ends_with("device"));
    }

    #[test]
    fn test_describe_offline() {
        let line = describe(&info(false, None));
        assert!(line.contains("offline"));
        assert!(line.contains("- pending"));
    }
}
