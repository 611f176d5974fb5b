//! # Validate Subcommand
//!
//! Validates one year's merged GeoJSON. Stage log lines go through
//! `tracing`; `--json` prints the raw result for later aggregation with
//! `histmap report`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use histmap_core::{TracingLogger, Year};
use histmap_geo::GeoValidator;
use histmap_pipeline::{log_validation, validate_year_file, write_repaired};

use crate::{GlobalOpts, EXIT_OK, EXIT_VALIDATION_FAILURE};

/// Arguments for `histmap validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Year of the collection; negative for BCE.
    #[arg(long, allow_negative_numbers = true)]
    pub year: i32,

    /// Merged GeoJSON feature collection.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Write the repaired collection here when repairs were applied and no
    /// errors were found.
    #[arg(long, value_name = "PATH")]
    pub write_repaired: Option<PathBuf>,

    /// Print the validation result as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

/// Execute the validate subcommand.
pub async fn run_validate(args: &ValidateArgs, globals: &GlobalOpts) -> Result<u8> {
    let year = Year::new(args.year);
    let validator = match globals.load_config()? {
        Some(config) => match config.years.iter().find(|y| y.year == year) {
            Some(year_config) => config.validator_for(year_config),
            None => GeoValidator::new(config.validator.clone()),
        },
        None => GeoValidator::default(),
    };

    let validated = validate_year_file(&validator, year, &args.file)
        .await
        .with_context(|| format!("failed to validate {}", args.file.display()))?;
    log_validation(&validated.result, &TracingLogger);

    if let Some(target) = &args.write_repaired {
        if !validated.result.has_errors() && !validated.result.repairs.is_empty() {
            write_repaired(year, &validated.collection, target)
                .await
                .with_context(|| format!("failed to write {}", target.display()))?;
            tracing::info!(path = %target.display(), "wrote repaired collection");
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&validated.result)?);
    } else {
        for issue in validated
            .result
            .errors
            .iter()
            .chain(&validated.result.warnings)
            .chain(&validated.result.repairs)
        {
            println!("{issue}");
        }
        println!(
            "{}: {} features, {} error(s), {} warning(s), {} repair(s)",
            year.label(),
            validated.result.feature_count,
            validated.result.errors.len(),
            validated.result.warnings.len(),
            validated.result.repairs.len()
        );
    }

    if validated.result.has_errors() {
        Ok(EXIT_VALIDATION_FAILURE)
    } else {
        Ok(EXIT_OK)
    }
}
