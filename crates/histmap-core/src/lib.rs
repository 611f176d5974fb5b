//! # histmap-core — Foundational Types for the Map Build Pipeline
//!
//! This crate is the bedrock of the histmap workspace. It defines the values
//! that flow between pipeline stages. Every other crate in the workspace
//! depends on `histmap-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtypes for domain primitives.** `Year` (negative = BCE), `RunId`,
//!    and `ContentDigest` are newtypes. No bare integers or strings where a
//!    year or a digest is meant.
//!
//! 2. **Validation outcomes are data.** A year with defects produces a
//!    [`ValidationResult`] with a non-empty `errors` list, never an `Err`.
//!    Only I/O and parse failures are errors ([`StageError`]).
//!
//! 3. **Explicit collaborators.** Stages receive a [`StageLogger`] value
//!    rather than reaching for a process-wide logger.
//!
//! 4. **UTC-only timestamps** with seconds precision for report output.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `histmap-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod identity;
pub mod index;
pub mod issue;
pub mod logging;
pub mod report;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use digest::{ContentDigest, SHORT_ID_LEN};
pub use error::{HistmapError, StageError};
pub use identity::{RunId, Year};
pub use index::{PrepareResult, YearEntry, YearIndex};
pub use issue::{IssueBucket, IssueType, ValidationIssue, ValidationResult};
pub use logging::{LogLevel, LogLine, MemoryLogger, StageLogger, TracingLogger};
pub use report::{ValidationReport, YearValidationSummary};
pub use temporal::Timestamp;
