//! # Error Types
//!
//! Defines the error types shared across the pipeline. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - [`StageError`] is what a per-year stage returns when it cannot produce
//!   a result at all. It always carries the path involved and, where known,
//!   the year, so the orchestrator can log and skip that year.
//! - Validation defects are not errors. They travel inside
//!   [`ValidationResult`](crate::ValidationResult).

use std::path::PathBuf;

use thiserror::Error;

use crate::identity::Year;

/// Top-level error type for value parsing in `histmap-core`.
#[derive(Error, Debug)]
pub enum HistmapError {
    /// A digest string was not 64 lowercase hex characters.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}

/// Failure of a single pipeline stage for a single year.
#[derive(Error, Debug)]
pub enum StageError {
    /// A file could not be opened, read, written, or renamed.
    #[error("io error{} at {}: {source}", year_suffix(.year), .path.display())]
    Io {
        /// The year being processed, when the failing call knows it.
        year: Option<Year>,
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A file was present but could not be parsed as the expected format.
    #[error("data error for year {year} at {}: {detail}", .path.display())]
    Data {
        /// The year being processed.
        year: Year,
        /// Path of the malformed file.
        path: PathBuf,
        /// Parser diagnostic.
        detail: String,
    },
}

impl StageError {
    /// Build an I/O error for a known year.
    pub fn io(year: Year, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            year: Some(year),
            path: path.into(),
            source,
        }
    }

    /// The year this error belongs to, if known.
    pub fn year(&self) -> Option<Year> {
        match self {
            Self::Io { year, .. } => *year,
            Self::Data { year, .. } => Some(*year),
        }
    }

    /// The path this error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Data { path, .. } => path,
        }
    }
}

fn year_suffix(year: &Option<Year>) -> String {
    match year {
        Some(y) => format!(" for year {y}"),
        None => String::new(),
    }
}
