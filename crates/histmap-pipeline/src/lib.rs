//! # histmap-pipeline — Build Pipeline Stages
//!
//! Turns raw per-year inputs into the artifacts the viewer loads:
//!
//! - [`prepare`] publishes a year's tile archive under a content-addressed
//!   name.
//! - [`validate`] loads a year's merged GeoJSON, runs the structural
//!   validator, and logs the verdict.
//! - [`report`] aggregates every year's verdict into one run report.
//! - [`index`] assembles and writes the year index.
//! - [`run`] orchestrates all of the above across the configured years.
//!
//! ## Publishing Invariant
//!
//! Nothing is ever visible under a final name until it is complete. Every
//! output file is written to a `.partial` sibling, synced, then renamed
//! (see [`publish`]).

pub mod config;
pub mod index;
pub mod prepare;
pub mod publish;
pub mod report;
pub mod run;
pub mod validate;

pub use config::{ConfigError, ErrorPolicy, PipelineConfig, YearConfig};
pub use index::{build_year_index, write_year_index, INDEX_FILENAME};
pub use prepare::{prepare_tile, PREPARE_STAGE};
pub use report::{generate_report, write_report, REPORT_FILENAME};
pub use run::{run_pipeline, RunError, RunOutcome, YearFailure, BUILD_STAGE, PUBLISH_STAGE};
pub use validate::{
    load_year_collection, log_validation, run_validate_for_year, run_validate_for_year_with,
    validate_year_file, write_repaired, ValidatedYear, VALIDATE_STAGE,
};
