//! `grover`: Grover's search over a small phone book.
//!
//! Picks a hidden entry, builds one amplification circuit per iteration
//! count and runs the batch on a simulator or an IBM Quantum device.
//!
//! ```text
//! $ grover search --mode 1 --qubits 3
//! ===================================== RESULTS =====================================
//! ...
//! The optimal amount of Grover iterations is: 2 with 3 qubits
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod provider;

use commands::{auth, backends, hello_world, search, version};
use config::Config;
use grover_hal::Channel;

/// Grover search demo for simulators and IBM Quantum hardware
#[derive(Parser)]
#[command(name = "grover")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Grover search demo
    Search(search::SearchArgs),

    /// Run the runtime's hello-world program
    HelloWorld {
        /// Runtime backend (defaults to the configured cloud simulator)
        #[arg(short, long)]
        backend: Option<String>,

        /// Program iterations
        #[arg(short, long, default_value = "1")]
        iterations: u32,
    },

    /// Manage the saved IBM Quantum account
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// List available backends
    Backends,

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Save an account to ~/.grover/account.json
    Save {
        /// API token (IBM Quantum) or API key (IBM Cloud)
        #[arg(short, long, env = "IBM_QUANTUM_TOKEN", hide_env_values = true)]
        token: String,

        /// Replace an existing account
        #[arg(long)]
        overwrite: bool,

        /// ibm_quantum or ibm_cloud
        #[arg(long, default_value = "ibm_quantum")]
        channel: Channel,

        /// Service CRN (ibm_cloud) or hub/group/project (ibm_quantum)
        #[arg(long)]
        instance: Option<String>,

        /// Endpoint override
        #[arg(long)]
        url: Option<String>,
    },

    /// Show which credentials would be used
    Status,

    /// Delete the saved account
    Delete,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = || Config::load(cli.config.as_deref()).context("Failed to load configuration");

    match cli.command {
        Commands::Search(args) => search::execute(args, &config()?).await,

        Commands::HelloWorld {
            backend,
            iterations,
        } => hello_world::execute(backend.as_deref(), iterations, &config()?).await,

        Commands::Auth { action } => match action {
            AuthAction::Save {
                token,
                overwrite,
                channel,
                instance,
                url,
            } => {
                let account =
                    auth::build_account(&token, channel, instance.as_deref(), url.as_deref())?;
                auth::execute_save(None, &account, overwrite)
            }
            AuthAction::Status => auth::execute_status(),
            AuthAction::Delete => auth::execute_delete(),
        },

        Commands::Backends => backends::execute(&config()?).await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
