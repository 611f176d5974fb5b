//! # Report Aggregator
//!
//! Folds every year's [`ValidationResult`] into one [`ValidationReport`].
//! The aggregation is a pure function of the ordered results plus the
//! run id and the current time.

use std::path::{Path, PathBuf};

use histmap_core::{RunId, StageError, Timestamp, ValidationReport, ValidationResult, YearValidationSummary};

use crate::publish;

/// Name of the report file in the output directory.
pub const REPORT_FILENAME: &str = "validation-report.json";

/// Summarize a run. Year order is preserved; an empty slice yields a
/// report with all totals zero.
pub fn generate_report(run_id: RunId, results: &[ValidationResult]) -> ValidationReport {
    let year_summaries: Vec<YearValidationSummary> =
        results.iter().map(YearValidationSummary::from).collect();

    ValidationReport {
        run_id,
        timestamp: Timestamp::now(),
        total_years: year_summaries.len(),
        total_features: year_summaries.iter().map(|s| s.feature_count).sum(),
        total_errors: year_summaries.iter().map(|s| s.errors).sum(),
        total_warnings: year_summaries.iter().map(|s| s.warnings).sum(),
        total_repairs: year_summaries.iter().map(|s| s.repairs).sum(),
        year_summaries,
    }
}

/// Write `report` as pretty JSON to `output_dir/validation-report.json`.
pub async fn write_report(output_dir: impl AsRef<Path>, report: &ValidationReport) -> Result<PathBuf, StageError> {
    let output_dir = output_dir.as_ref();
    publish::ensure_dir(None, output_dir).await?;
    let target = output_dir.join(REPORT_FILENAME);
    let mut json = serde_json::to_vec_pretty(report).map_err(|e| StageError::Io {
        year: None,
        path: target.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;
    json.push(b'\n');
    publish::write_atomic(None, &target, &json).await?;
    Ok(target)
}
