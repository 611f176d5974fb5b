//! # Validate Stage
//!
//! Loads one year's merged GeoJSON, runs [`GeoValidator`], and reports the
//! verdict through a [`StageLogger`]. A year with validation errors is a
//! normal result here; only a missing or unparseable file is a
//! [`StageError`].
//!
//! ## Log Lines
//!
//! All under stage `"validate"`:
//!
//! - with errors: `year {y}: {n} error(s), {m} warning(s)` followed by one
//!   `{TYPE}: {details}` line per error, all at error level;
//! - otherwise: `year {y}: {f} features, 0 errors, {m} warnings` at info;
//! - with repairs, additionally: `year {y}: applied {r} repair(s)` at info.

use std::path::{Path, PathBuf};

use histmap_core::{StageError, StageLogger, ValidationResult, Year};
use histmap_geo::{FeatureCollection, GeoValidator};
use serde_json::Value;

use crate::publish;

/// Stage name used in log lines.
pub const VALIDATE_STAGE: &str = "validate";

/// A year's verdict together with its repaired collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedYear {
    pub result: ValidationResult,
    pub collection: FeatureCollection,
}

/// Read and parse a year's merged GeoJSON.
///
/// # Errors
///
/// [`StageError::Io`] if the file cannot be read; [`StageError::Data`] if it
/// is not JSON or its top-level `type` is absent or not `FeatureCollection`.
pub async fn load_year_collection(year: Year, path: &Path) -> Result<FeatureCollection, StageError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| StageError::io(year, path, source))?;
    let data = |detail: String| StageError::Data {
        year,
        path: path.to_path_buf(),
        detail,
    };
    let doc: Value =
        serde_json::from_slice(&bytes).map_err(|e| data(format!("not valid JSON: {e}")))?;
    match doc.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        Some(other) => {
            return Err(data(format!(
                "top-level type is {other:?}, expected \"FeatureCollection\""
            )))
        }
        None => {
            return Err(data(
                "top-level \"type\" member is missing, expected \"FeatureCollection\"".to_string(),
            ))
        }
    }
    serde_json::from_value(doc).map_err(|e| data(format!("not a GeoJSON feature collection: {e}")))
}

/// Load and validate a year's file without logging.
pub async fn validate_year_file(
    validator: &GeoValidator,
    year: Year,
    path: impl AsRef<Path>,
) -> Result<ValidatedYear, StageError> {
    let collection = load_year_collection(year, path.as_ref()).await?;
    let validation = validator.validate(year, &collection);
    Ok(ValidatedYear {
        result: validation.result,
        collection: validation.collection,
    })
}

/// Validate a year's merged GeoJSON with the default validator and log the
/// verdict.
pub async fn run_validate_for_year(
    year: Year,
    merged_geojson_path: impl AsRef<Path>,
    logger: &dyn StageLogger,
) -> Result<ValidationResult, StageError> {
    run_validate_for_year_with(&GeoValidator::default(), year, merged_geojson_path, logger).await
}

/// Like [`run_validate_for_year`] with a configured validator.
pub async fn run_validate_for_year_with(
    validator: &GeoValidator,
    year: Year,
    merged_geojson_path: impl AsRef<Path>,
    logger: &dyn StageLogger,
) -> Result<ValidationResult, StageError> {
    let validated = validate_year_file(validator, year, merged_geojson_path).await?;
    log_validation(&validated.result, logger);
    Ok(validated.result)
}

/// Emit the stage's log lines for a verdict.
pub fn log_validation(result: &ValidationResult, logger: &dyn StageLogger) {
    let year = result.year;
    if result.has_errors() {
        logger.error(
            VALIDATE_STAGE,
            &format!(
                "year {year}: {} error(s), {} warning(s)",
                result.errors.len(),
                result.warnings.len()
            ),
        );
        for issue in &result.errors {
            logger.error(VALIDATE_STAGE, &issue.to_string());
        }
    } else {
        logger.info(
            VALIDATE_STAGE,
            &format!(
                "year {year}: {} features, 0 errors, {} warnings",
                result.feature_count,
                result.warnings.len()
            ),
        );
    }
    if !result.repairs.is_empty() {
        logger.info(
            VALIDATE_STAGE,
            &format!("year {year}: applied {} repair(s)", result.repairs.len()),
        );
    }
}

/// Write a repaired collection to `target` atomically, creating parent
/// directories as needed.
pub async fn write_repaired(
    year: Year,
    collection: &FeatureCollection,
    target: impl Into<PathBuf>,
) -> Result<PathBuf, StageError> {
    let target = target.into();
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        publish::ensure_dir(Some(year), parent).await?;
    }
    let json = serde_json::to_vec(collection).map_err(|e| StageError::Data {
        year,
        path: target.clone(),
        detail: format!("cannot serialize repaired collection: {e}"),
    })?;
    publish::write_atomic(Some(year), &target, &json).await?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use histmap_core::{IssueType, LogLevel, MemoryLogger, ValidationIssue};

    #[test]
    fn clean_result_logs_one_info_line() {
        let logger = MemoryLogger::new();
        let mut result = ValidationResult::new(Year::new(1200));
        result.feature_count = 12;
        result.record(ValidationIssue::new(IssueType::TinyArea, "feature 3 (Sicily): area"));
        log_validation(&result, &logger);

        let lines = logger.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].level, LogLevel::Info);
        assert_eq!(lines[0].stage, "validate");
        assert_eq!(lines[0].message, "year 1200: 12 features, 0 errors, 1 warnings");
    }

    #[test]
    fn errors_log_summary_then_each_error() {
        let logger = MemoryLogger::new();
        let mut result = ValidationResult::new(Year::new(-300));
        result.record(ValidationIssue::new(IssueType::MissingName, "feature 0 (unnamed)"));
        result.record(ValidationIssue::new(IssueType::OutOfBounds, "feature 1 (Qin)"));
        log_validation(&result, &logger);

        let errors = logger.lines_at(LogLevel::Error);
        let messages: Vec<_> = errors.iter().map(|l| l.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "year -300: 2 error(s), 0 warning(s)",
                "MISSING_NAME: feature 0 (unnamed)",
                "OUT_OF_BOUNDS: feature 1 (Qin)",
            ]
        );
        assert!(logger.lines_at(LogLevel::Info).is_empty());
    }

    #[test]
    fn repairs_add_an_info_line() {
        let logger = MemoryLogger::new();
        let mut result = ValidationResult::new(Year::new(1000));
        result.feature_count = 1;
        result.record(ValidationIssue::new(IssueType::UnclosedRing, "feature 0 (Ghana)"));
        log_validation(&result, &logger);
        let info: Vec<_> = logger
            .lines_at(LogLevel::Info)
            .into_iter()
            .map(|l| l.message)
            .collect();
        assert_eq!(
            info,
            vec![
                "year 1000: 1 features, 0 errors, 0 warnings".to_string(),
                "year 1000: applied 1 repair(s)".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MemoryLogger::new();
        let err = run_validate_for_year(Year::new(1), dir.path().join("none.geojson"), &logger)
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Io { .. }));
        assert!(logger.lines().is_empty());
    }

    #[tokio::test]
    async fn unparseable_and_wrong_shape_are_data_errors() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = dir.path().join("garbage.geojson");
        tokio::fs::write(&garbage, b"{not json").await.unwrap();
        let err = load_year_collection(Year::new(1), &garbage).await.unwrap_err();
        assert!(matches!(err, StageError::Data { .. }));

        let feature = dir.path().join("feature.geojson");
        tokio::fs::write(&feature, br#"{"type":"Feature","properties":{}}"#)
            .await
            .unwrap();
        let err = load_year_collection(Year::new(1), &feature).await.unwrap_err();
        assert!(err.to_string().contains("expected \"FeatureCollection\""));
    }

    #[tokio::test]
    async fn untyped_document_is_a_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let untyped = dir.path().join("untyped.geojson");
        tokio::fs::write(&untyped, b"{}").await.unwrap();
        let err = load_year_collection(Year::new(1), &untyped).await.unwrap_err();
        assert!(matches!(err, StageError::Data { .. }), "{err:?}");
        assert!(err.to_string().contains("missing"), "{err}");

        let logger = MemoryLogger::new();
        let err = run_validate_for_year(Year::new(1), &untyped, &logger).await.unwrap_err();
        assert!(matches!(err, StageError::Data { .. }));
        assert!(logger.lines().is_empty());
    }

    #[tokio::test]
    async fn write_repaired_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("geojson").join("bc500.geojson");
        let written = write_repaired(Year::new(-500), &FeatureCollection::new(vec![]), &target)
            .await
            .unwrap();
        assert_eq!(written, target);
        let back: serde_json::Value =
            serde_json::from_slice(&tokio::fs::read(&target).await.unwrap()).unwrap();
        assert_eq!(back["type"], "FeatureCollection");
    }
}
