//! The Grover search demo.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use grover_search::report::{self, Histogram, RESULTS_BANNER};
use grover_search::{
    AmplificationProblem, DEFAULT_ITERATIONS, DispatchOutcome, Dispatcher, Execution,
    ExecutionMode, TargetSelector, analyze, build_batch, grover_circuit, optimal_iterations,
};

use crate::config::{Config, SimulatorKind};
use crate::provider::RuntimeProvider;

pub const MODE_PROMPT: &str = "Press 1 for simulator and 2 for real hardware: ";

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// 1 = simulator, 2 = real hardware, anything else exits. Prompts when omitted
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Search register width (range is 2^qubits entries)
    #[arg(short, long)]
    pub qubits: Option<u32>,

    /// Hidden entry to search for (random when omitted)
    #[arg(short, long)]
    pub target: Option<u64>,

    /// Comma-separated iteration counts, one circuit each
    #[arg(short, long, value_delimiter = ',')]
    pub iterations: Option<Vec<u32>>,

    /// Shots per circuit
    #[arg(short, long)]
    pub shots: Option<u32>,

    /// Seed for target selection and local sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulator for mode 1 (local, ibm)
    #[arg(long)]
    pub simulator: Option<SimulatorKind>,

    /// Hardware backend for mode 2
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Print the OpenQASM of the optimal circuit
    #[arg(long)]
    pub show_circuit: bool,

    /// Skip the text histogram
    #[arg(long)]
    pub no_histogram: bool,
}

/// Read one selection line from `input`.
pub fn read_mode(input: &mut impl BufRead, output: &mut impl Write) -> Result<ExecutionMode> {
    write!(output, "{MODE_PROMPT}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read mode selection")?;
    Ok(ExecutionMode::from_selection(&line))
}

/// Execute the search command.
pub async fn execute(args: SearchArgs, config: &Config) -> Result<()> {
    let qubits = args.qubits.unwrap_or(config.qubits);
    let shots = args.shots.unwrap_or(config.shots);
    let iterations = args
        .iterations
        .clone()
        .unwrap_or_else(|| DEFAULT_ITERATIONS.to_vec());

    let selector = TargetSelector::for_qubits(qubits)?;
    let target = match args.target {
        Some(index) => selector.target(index)?,
        None => match args.seed {
            Some(seed) => selector.pick(&mut StdRng::seed_from_u64(seed)),
            None => selector.pick_random(),
        },
    };
    info!("Searching for {}", target);

    let problem = AmplificationProblem::new(target.bits.clone());
    let batch = build_batch(&problem, &iterations)?;
    let optimal = optimal_iterations(qubits);

    if args.show_circuit {
        let mut circuit = grover_circuit(&problem, optimal)?;
        circuit.measure_all()?;
        println!("{}", grover_qasm3::emit(&circuit)?);
    }

    let mode = match args.mode.as_deref() {
        Some(selection) => ExecutionMode::from_selection(selection),
        None => read_mode(&mut io::stdin().lock(), &mut io::stdout())?,
    };
    if mode == ExecutionMode::Abort {
        println!("Closing program!");
        return Ok(());
    }

    let mut provider = RuntimeProvider::from_config(config).with_seed(args.seed);
    if let Some(kind) = args.simulator {
        provider = provider.with_simulator(kind);
    }
    if let Some(name) = args.backend {
        provider = provider.with_hardware_backend(name);
    }
    info!(
        "simulator: {}, hardware: {}",
        provider.simulator_kind(),
        provider.hardware_backend()
    );
    let dispatcher = Dispatcher::new(provider).with_wait_policy(config.wait_policy());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Running {} circuits ({mode})...", batch.len()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let outcome = dispatcher.dispatch(&batch, shots, mode).await;
    spinner.finish_and_clear();

    let execution = match outcome? {
        DispatchOutcome::Completed(execution) => execution,
        DispatchOutcome::Aborted => {
            println!("Closing program!");
            return Ok(());
        }
    };

    if execution.mode == ExecutionMode::Hardware {
        println!("The used backend is: {}", execution.backend);
        println!("job id: {}", execution.job_id);
    }
    print_raw(&execution)?;

    println!("{}", report::optimal_line(optimal, qubits));
    let analysis = analyze(&batch.iterations(), &execution.distributions(), &target.bits)?;
    println!("{}", report::render_analysis(&analysis));

    if !args.no_histogram {
        println!("{}", Histogram::from_analysis(&analysis));
    }

    println!(
        "{} {}/{} circuits found {}",
        style("Summary:").bold(),
        analysis.successes(),
        analysis.reports().len(),
        style(target).green()
    );
    Ok(())
}

fn print_raw(execution: &Execution) -> Result<()> {
    println!("{RESULTS_BANNER}");
    let dists: Vec<String> = execution
        .result
        .distributions()
        .map(ToString::to_string)
        .collect();
    println!("[{}]", dists.join(", "));
    let metadata: Vec<&serde_json::Value> = execution.result.circuit_metadata().collect();
    println!("{}", serde_json::to_string(&metadata)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_mode_prompts() {
        let mut input = io::Cursor::new("2\n");
        let mut output = Vec::new();
        let mode = read_mode(&mut input, &mut output).unwrap();
        assert_eq!(mode, ExecutionMode::Hardware);
        assert_eq!(String::from_utf8(output).unwrap(), MODE_PROMPT);
    }

    #[test]
    fn test_read_mode_unrecognised() {
        let mut input = io::Cursor::new("3\n");
        let mode = read_mode(&mut input, &mut Vec::new()).unwrap();
        assert_eq!(mode, ExecutionMode::Abort);
    }

    #[test]
    fn test_read_mode_eof_aborts() {
        let mut input = io::Cursor::new("");
        let mode = read_mode(&mut input, &mut Vec::new()).unwrap();
        assert_eq!(mode, ExecutionMode::Abort);
    }
}
