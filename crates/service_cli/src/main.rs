//! FRTB CLI - Command Line Operations for SBM Capital
//!
//! This is the operational entry point for the FRTB SBM capital engine.
//!
//! # Commands
//!
//! - `frtb capital --sensitivities <csv>` - Compute capital for a sensitivities file
//! - `frtb check` - Validate the parameter store
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate wires the parameter store
//! (`infra_config`) and the capital engine (`frtb_sbm`) to files and the
//! terminal. It is the only crate that installs a tracing subscriber.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod input;

use commands::capital::OutputFormat;
pub use error::{CliError, FieldError, FieldReason, Result};

/// FRTB Sensitivities-Based Method CLI
#[derive(Parser)]
#[command(name = "frtb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Parameter file path (falls back to FRTB_CONFIG, then the embedded BCBS set)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute SBM capital for a sensitivities file
    Capital {
        /// Path to the sensitivities CSV
        #[arg(short, long)]
        sensitivities: PathBuf,

        /// Restrict the run to one risk class (e.g. MS_EQDelta)
        #[arg(short, long)]
        risk_class: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Load and validate the parameter store
    Check,
}

fn main() -> Result<()> {
    // Initialise tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Capital {
            sensitivities,
            risk_class,
            format,
        } => commands::capital::run(
            cli.config.as_deref(),
            &sensitivities,
            risk_class.as_deref(),
            format,
        ),
        Commands::Check => commands::check::run(cli.config.as_deref()),
    }
}
