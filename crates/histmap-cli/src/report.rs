//! # Report Subcommand
//!
//! Aggregates validation results written by `histmap validate --json` into
//! a run report, prints it, and writes `validation-report.json` when an
//! output directory is given.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use histmap_core::{RunId, ValidationResult};
use histmap_pipeline::{generate_report, write_report};

use crate::{GlobalOpts, EXIT_OK, EXIT_VALIDATION_FAILURE};

/// Arguments for `histmap report`.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Validation result JSON files, in report order.
    #[arg(value_name = "RESULT_JSON")]
    pub results: Vec<PathBuf>,

    /// Run id to stamp on the report. A fresh UUID by default.
    #[arg(long)]
    pub run_id: Option<String>,
}

/// Execute the report subcommand.
pub async fn run_report(args: &ReportArgs, globals: &GlobalOpts) -> Result<u8> {
    let mut results = Vec::with_capacity(args.results.len());
    for path in &args.results {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let result: ValidationResult = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse validation result {}", path.display()))?;
        results.push(result);
    }

    let run_id = args
        .run_id
        .as_deref()
        .map(RunId::from_string)
        .unwrap_or_default();
    let report = generate_report(run_id, &results);

    if let Some(dir) = &globals.output_dir {
        let path = write_report(dir, &report)
            .await
            .with_context(|| format!("failed to write report into {}", dir.display()))?;
        tracing::info!(path = %path.display(), "wrote validation report");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.has_errors() {
        Ok(EXIT_VALIDATION_FAILURE)
    } else {
        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use histmap_core::{IssueType, ValidationIssue, Year};

    fn write_result(dir: &std::path::Path, name: &str, result: &ValidationResult) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_vec(result).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn aggregates_files_and_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let clean = ValidationResult::new(Year::new(1200));
        let mut failing = ValidationResult::new(Year::new(1300));
        failing.record(ValidationIssue::new(IssueType::MissingName, "feature 0 (unnamed)"));

        let args = ReportArgs {
            results: vec![
                write_result(dir.path(), "a.json", &clean),
                write_result(dir.path(), "b.json", &failing),
            ],
            run_id: Some("ci-42".into()),
        };
        let out = dir.path().join("out");
        let globals = GlobalOpts {
            output_dir: Some(out.clone()),
            ..GlobalOpts::default()
        };
        assert_eq!(run_report(&args, &globals).await.unwrap(), EXIT_VALIDATION_FAILURE);

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(out.join("validation-report.json")).unwrap()).unwrap();
        assert_eq!(written["runId"], "ci-42");
        assert_eq!(written["totalYears"], 2);
        assert_eq!(written["totalErrors"], 1);
    }

    #[tokio::test]
    async fn no_inputs_is_an_empty_clean_report() {
        let args = ReportArgs { results: vec![], run_id: None };
        assert_eq!(run_report(&args, &GlobalOpts::default()).await.unwrap(), EXIT_OK);
    }
}
