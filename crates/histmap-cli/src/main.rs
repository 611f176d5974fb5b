//! # histmap CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use histmap_cli::build::{run_build, BuildArgs};
use histmap_cli::hash::{run_hash, HashArgs};
use histmap_cli::prepare::{run_prepare, PrepareArgs};
use histmap_cli::report::{run_report, ReportArgs};
use histmap_cli::validate::{run_validate, ValidateArgs};
use histmap_cli::{GlobalOpts, EXIT_OPERATIONAL_ERROR};

/// Historical map build pipeline.
///
/// Publishes per-year tile archives under content-addressed names,
/// validates per-year territory GeoJSON, and aggregates run reports.
#[derive(Parser, Debug)]
#[command(name = "histmap", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the pipeline configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory for published artifacts.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the SHA-256 digest and short id of a file.
    Hash(HashArgs),

    /// Publish one tile archive under its content-addressed name.
    Prepare(PrepareArgs),

    /// Validate one year's merged GeoJSON.
    Validate(ValidateArgs),

    /// Aggregate validation results into a run report.
    Report(ReportArgs),

    /// Run the whole pipeline from a config file.
    Build(BuildArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("histmap CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let globals = GlobalOpts {
        config: cli.config,
        output_dir: cli.output_dir,
    };

    let result = match cli.command {
        Commands::Hash(args) => run_hash(&args).await,
        Commands::Prepare(args) => run_prepare(&args, &globals).await,
        Commands::Validate(args) => run_validate(&args, &globals).await,
        Commands::Report(args) => run_report(&args, &globals).await,
        Commands::Build(args) => run_build(&args, &globals).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_OPERATIONAL_ERROR)
        }
    }
}
