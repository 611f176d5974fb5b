//! # Build Subcommand
//!
//! Runs the full pipeline from a config file (`--config`, default
//! `histmap.yaml`). `--output-dir` overrides the config's output directory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use histmap_core::TracingLogger;
use histmap_pipeline::{run_pipeline, ErrorPolicy};

use crate::{load_config, GlobalOpts, DEFAULT_CONFIG_FILE, EXIT_OK, EXIT_OPERATIONAL_ERROR, EXIT_VALIDATION_FAILURE};

/// Arguments for `histmap build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Override the configured error policy.
    #[arg(long, value_parser = parse_policy)]
    pub error_policy: Option<ErrorPolicy>,

    /// Override the configured per-year concurrency.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

fn parse_policy(s: &str) -> Result<ErrorPolicy, String> {
    match s {
        "halt" => Ok(ErrorPolicy::Halt),
        "exclude" => Ok(ErrorPolicy::Exclude),
        other => Err(format!("unknown error policy {other:?} (expected halt or exclude)")),
    }
}

/// Execute the build subcommand.
pub async fn run_build(args: &BuildArgs, globals: &GlobalOpts) -> Result<u8> {
    let config_path = globals
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = load_config(&config_path)?;
    if let Some(dir) = &globals.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(policy) = args.error_policy {
        config.error_policy = policy;
    }
    if let Some(n) = args.concurrency {
        anyhow::ensure!(n > 0, "--concurrency must be at least 1");
        config.concurrency = n;
    }

    tracing::info!(
        config = %config_path.display(),
        years = config.years.len(),
        output_dir = %config.output_dir.display(),
        "starting build"
    );
    let outcome = run_pipeline(&config, Arc::new(TracingLogger))
        .await
        .context("build failed")?;

    let report = &outcome.report;
    println!(
        "run {}: {} year(s), {} features, {} error(s), {} warning(s), {} repair(s)",
        report.run_id,
        report.total_years,
        report.total_features,
        report.total_errors,
        report.total_warnings,
        report.total_repairs
    );
    for failure in &outcome.failures {
        println!("FAILED {} [{}]: {}", failure.year.label(), failure.stage, failure.error);
    }
    match &outcome.index {
        Some(index) => println!("index: {} year(s) published", index.len()),
        None => println!("index: not written"),
    }

    if !outcome.failures.is_empty() {
        Ok(EXIT_OPERATIONAL_ERROR)
    } else if report.has_errors() {
        Ok(EXIT_VALIDATION_FAILURE)
    } else {
        Ok(EXIT_OK)
    }
}
