//! # Run-Level Validation Report
//!
//! Counts-only projections of [`ValidationResult`] and the report that
//! aggregates them. Both are plain data; the aggregation itself lives in
//! `histmap-pipeline::report`.

use serde::{Deserialize, Serialize};

use crate::identity::{RunId, Year};
use crate::issue::ValidationResult;
use crate::temporal::Timestamp;

/// Counts for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearValidationSummary {
    pub year: Year,
    pub feature_count: usize,
    /// One feature is one territory boundary.
    pub territory_count: usize,
    pub errors: usize,
    pub warnings: usize,
    pub repairs: usize,
}

impl From<&ValidationResult> for YearValidationSummary {
    fn from(result: &ValidationResult) -> Self {
        Self {
            year: result.year,
            feature_count: result.feature_count,
            territory_count: result.feature_count,
            errors: result.errors.len(),
            warnings: result.warnings.len(),
            repairs: result.repairs.len(),
        }
    }
}

/// Audit artifact for one run. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub run_id: RunId,
    pub timestamp: Timestamp,
    pub total_years: usize,
    pub total_features: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_repairs: usize,
    pub year_summaries: Vec<YearValidationSummary>,
}

impl ValidationReport {
    /// Whether CI should block publishing.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}
