//! wot — OpenPGP web-of-trust resolution and strong-set statistics.
//!
//! Subcommands: init, resolve, analyze, run.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::LoggingConfig;

/// wot — Keyring web-of-trust statistics.
#[derive(Parser, Debug)]
#[command(name = "wot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Resolve the keyring dump into the status table and edge corpus.
    Resolve(commands::resolve::ResolveArgs),
    /// Compute strong-set statistics from the resolved artifacts.
    Analyze(commands::analyze::AnalyzeArgs),
    /// Resolve, then analyze.
    Run(commands::run::RunArgs),
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = match logging.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("installing tracing subscriber: {}", e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Resolve(args) => commands::resolve::run(args),
        Commands::Analyze(args) => commands::analyze::run(args).await,
        Commands::Run(args) => commands::run::run(args).await,
    }
}
