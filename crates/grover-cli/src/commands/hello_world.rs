//! Runs the runtime's `hello-world` program.

use anyhow::{Context, Result};
use console::style;
use serde_json::json;

use crate::config::Config;
use crate::provider::connect_ibm;

pub const PROGRAM_ID: &str = "hello-world";

pub fn program_inputs(iterations: u32) -> serde_json::Value {
    json!({ "iterations": iterations })
}

/// Execute the hello-world command.
pub async fn execute(backend: Option<&str>, iterations: u32, config: &Config) -> Result<()> {
    let target = backend.unwrap_or(&config.cloud_simulator_backend);
    let backend = connect_ibm(config.endpoint.as_deref(), target)
        .await
        .with_context(|| format!("Failed to connect to {target}"))?;

    let job_id = backend
        .run_program(PROGRAM_ID, program_inputs(iterations))
        .await?;
    println!("job id: {job_id}");

    let result = backend.wait_program(&job_id, config.wait_policy()).await?;
    match result {
        serde_json::Value::String(text) => println!("{text}"),
        other => println!("{}", serde_json::to_string_pretty(&other)?),
    }
    println!("{} {}", style("✓").green().bold(), style("done").dim());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_inputs() {
        assert_eq!(program_inputs(1), json!({ "iterations": 1 }));
    }
}
