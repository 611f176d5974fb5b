//! # Run Orchestrator
//!
//! Drives one build across every configured year:
//!
//! ```text
//! for each year (bounded by `concurrency`):
//!     prepare tile archive  ┐ concurrently
//!     load + validate GeoJSON┘ (validation on the blocking pool)
//! barrier
//! aggregate report ─> write validation-report.json
//! apply error policy ─> write index.json, repaired GeoJSON
//! ```
//!
//! A [`StageError`] for one year, including a failure to write its repaired
//! GeoJSON, is logged and recorded in [`RunOutcome::failures`]; it blocks
//! only that year under the error policy and never aborts the other years. Only a
//! failure to write the run-level outputs, or a year task that panicked,
//! surfaces as a [`RunError`].

use std::path::PathBuf;
use std::sync::Arc;

use histmap_core::{
    PrepareResult, RunId, StageError, StageLogger, ValidationReport, ValidationResult, Year,
    YearEntry, YearIndex,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::config::{ErrorPolicy, PipelineConfig, YearConfig};
use crate::index::{build_year_index, write_year_index};
use crate::prepare::{prepare_tile, PREPARE_STAGE};
use crate::report::{generate_report, write_report};
use crate::validate::{load_year_collection, log_validation, write_repaired, ValidatedYear, VALIDATE_STAGE};

/// Stage name for run-level log lines.
pub const BUILD_STAGE: &str = "build";

/// Stage name for writing a year's repaired GeoJSON.
pub const PUBLISH_STAGE: &str = "publish";

/// Errors that abort a whole run.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    /// A run-level output could not be written.
    #[error(transparent)]
    Output(#[from] StageError),

    /// A year task panicked or was cancelled.
    #[error("year task aborted: {0}")]
    TaskAborted(#[from] tokio::task::JoinError),
}

/// A stage that could not produce a result for a year.
#[derive(Debug)]
pub struct YearFailure {
    pub year: Year,
    pub stage: &'static str,
    pub error: StageError,
}

/// Everything a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: ValidationReport,
    /// `None` when the error policy halted publication.
    pub index: Option<YearIndex>,
    pub failures: Vec<YearFailure>,
    /// Years left out of the index under [`ErrorPolicy::Exclude`].
    pub excluded: Vec<Year>,
    /// Repaired GeoJSON files written this run.
    pub repaired: Vec<PathBuf>,
}

impl RunOutcome {
    /// No validation errors and no stage failures.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.report.has_errors()
    }
}

struct YearOutcome {
    position: usize,
    config: YearConfig,
    prepared: Result<PrepareResult, StageError>,
    validated: Result<ValidatedYear, StageError>,
}

impl YearOutcome {
    fn blocked(&self) -> bool {
        match (&self.prepared, &self.validated) {
            (Ok(_), Ok(v)) => v.result.has_errors(),
            _ => true,
        }
    }
}

/// Run the pipeline over every configured year.
pub async fn run_pipeline(
    config: &PipelineConfig,
    logger: Arc<dyn StageLogger>,
) -> Result<RunOutcome, RunError> {
    let run_id = RunId::new();
    let span = tracing::info_span!("run", run_id = %run_id);
    async move {
        let config = Arc::new(config.clone());
        let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (position, year_config) in config.years.iter().cloned().enumerate() {
            let config = Arc::clone(&config);
            let semaphore = Arc::clone(&semaphore);
            let logger = Arc::clone(&logger);
            let span = tracing::debug_span!("year", year = %year_config.year);
            tasks.spawn(
                async move {
                    // Held until the year is done; the semaphore is never closed.
                    let _permit = semaphore.acquire_owned().await;
                    process_year(&config, position, year_config, logger.as_ref()).await
                }
                .instrument(span),
            );
        }

        let mut outcomes = Vec::with_capacity(config.years.len());
        while let Some(joined) = tasks.join_next().await {
            outcomes.push(joined?);
        }
        outcomes.sort_by_key(|o| o.position);

        finish_run(&config, run_id, outcomes, logger.as_ref()).await
    }
    .instrument(span)
    .await
}

async fn process_year(
    config: &PipelineConfig,
    position: usize,
    year_config: YearConfig,
    logger: &dyn StageLogger,
) -> YearOutcome {
    let year = year_config.year;
    let tile_path = config.tile_path(year);
    let geojson_path = config.geojson_path(year);
    let validator = config.validator_for(&year_config);

    let prepare = prepare_tile(year, &tile_path, &config.output_dir, &config.filename_template);
    let validate = async {
        let collection = load_year_collection(year, &geojson_path).await?;
        let path = geojson_path.clone();
        tokio::task::spawn_blocking(move || {
            let validation = validator.validate(year, &collection);
            ValidatedYear {
                result: validation.result,
                collection: validation.collection,
            }
        })
        .await
        .map_err(|e| StageError::Data {
            year,
            path,
            detail: format!("validation task failed: {e}"),
        })
    };
    let (prepared, validated) = tokio::join!(prepare, validate);

    match &prepared {
        Ok(p) => logger.info(
            PREPARE_STAGE,
            &format!("year {year}: {} ({} bytes)", p.hashed_filename, p.size),
        ),
        Err(e) => logger.error(PREPARE_STAGE, &format!("year {year}: {e}")),
    }
    match &validated {
        Ok(v) => log_validation(&v.result, logger),
        Err(e) => logger.error(VALIDATE_STAGE, &format!("year {year}: {e}")),
    }

    YearOutcome {
        position,
        config: year_config,
        prepared,
        validated,
    }
}

async fn finish_run(
    config: &PipelineConfig,
    run_id: RunId,
    outcomes: Vec<YearOutcome>,
    logger: &dyn StageLogger,
) -> Result<RunOutcome, RunError> {
    let results: Vec<ValidationResult> = outcomes
        .iter()
        .filter_map(|o| o.validated.as_ref().ok().map(|v| v.result.clone()))
        .collect();
    let report = generate_report(run_id, &results);
    write_report(&config.output_dir, &report).await?;

    let blocked = outcomes.iter().filter(|o| o.blocked()).count();
    let halted = config.error_policy == ErrorPolicy::Halt && blocked > 0;

    let mut excluded = Vec::new();
    let mut entries = Vec::new();
    let mut repaired = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        let YearOutcome {
            config: year_config,
            prepared,
            validated,
            ..
        } = outcome;
        let year = year_config.year;
        match (prepared, validated) {
            (Ok(prepared), Ok(validated)) if !validated.result.has_errors() => {
                if halted {
                    continue;
                }
                if !validated.result.repairs.is_empty() {
                    let target = config.repaired_path(year);
                    match write_repaired(year, &validated.collection, target).await {
                        Ok(path) => repaired.push(path),
                        Err(error) => {
                            logger.error(PUBLISH_STAGE, &format!("year {year}: {error}"));
                            failures.push(YearFailure {
                                year,
                                stage: PUBLISH_STAGE,
                                error,
                            });
                            excluded.push(year);
                            continue;
                        }
                    }
                }
                entries.push(YearEntry::from_prepared(year, &prepared, year_config.countries));
            }
            (prepared, validated) => {
                if let Err(error) = prepared {
                    failures.push(YearFailure {
                        year,
                        stage: PREPARE_STAGE,
                        error,
                    });
                }
                if let Err(error) = validated {
                    failures.push(YearFailure {
                        year,
                        stage: VALIDATE_STAGE,
                        error,
                    });
                }
                if !halted {
                    excluded.push(year);
                }
            }
        }
    }

    let publish = match config.error_policy {
        ErrorPolicy::Halt if halted || !excluded.is_empty() => {
            let failed = if halted { blocked } else { excluded.len() };
            logger.error(
                BUILD_STAGE,
                &format!("{failed} year(s) failed; index not written"),
            );
            false
        }
        ErrorPolicy::Halt => true,
        ErrorPolicy::Exclude => {
            for year in &excluded {
                logger.error(BUILD_STAGE, &format!("year {year}: excluded from index"));
            }
            true
        }
    };
    if !publish {
        excluded.clear();
    }

    let index = if publish {
        let index = build_year_index(entries);
        write_year_index(&config.output_dir, &index).await?;
        logger.info(
            BUILD_STAGE,
            &format!("wrote index with {} year(s)", index.len()),
        );
        Some(index)
    } else {
        None
    };

    Ok(RunOutcome {
        report,
        index,
        failures,
        excluded,
        repaired,
    })
}
