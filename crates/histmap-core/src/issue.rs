//! # Validation Issues
//!
//! The fixed vocabulary of defect categories and the per-year
//! [`ValidationResult`] that collects them.
//!
//! Every [`IssueType`] belongs to exactly one [`IssueBucket`]. Routing
//! through [`ValidationResult::record`] uses that mapping, so an issue can
//! never land in the wrong list.

use serde::{Deserialize, Serialize};

use crate::identity::Year;

/// Which list of a [`ValidationResult`] an issue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueBucket {
    /// Fatal: the year cannot be published.
    Error,
    /// Tolerable: logged, publish proceeds.
    Warning,
    /// Corrected in the output copy.
    Repair,
}

/// Defect category.
///
/// Serialized as `SCREAMING_SNAKE_CASE`, e.g. `"UNCLOSED_RING"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    // Errors
    EmptyCollection,
    InvalidCollection,
    MissingName,
    MissingGeometry,
    MalformedGeometry,
    InvalidPosition,
    TooFewPoints,
    OutOfBounds,
    DuplicateId,
    // Repairs
    UnclosedRing,
    WindingOrder,
    DuplicateVertex,
    // Warnings
    TinyArea,
    UnknownTerritory,
    SelfIntersection,
    UnsupportedGeometry,
}

impl IssueType {
    /// The list this category is always recorded in.
    pub fn bucket(&self) -> IssueBucket {
        match self {
            Self::EmptyCollection
            | Self::InvalidCollection
            | Self::MissingName
            | Self::MissingGeometry
            | Self::MalformedGeometry
            | Self::InvalidPosition
            | Self::TooFewPoints
            | Self::OutOfBounds
            | Self::DuplicateId => IssueBucket::Error,
            Self::UnclosedRing | Self::WindingOrder | Self::DuplicateVertex => IssueBucket::Repair,
            Self::TinyArea
            | Self::UnknownTerritory
            | Self::SelfIntersection
            | Self::UnsupportedGeometry => IssueBucket::Warning,
        }
    }

    /// Wire name, e.g. `"DUPLICATE_ID"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyCollection => "EMPTY_COLLECTION",
            Self::InvalidCollection => "INVALID_COLLECTION",
            Self::MissingName => "MISSING_NAME",
            Self::MissingGeometry => "MISSING_GEOMETRY",
            Self::MalformedGeometry => "MALFORMED_GEOMETRY",
            Self::InvalidPosition => "INVALID_POSITION",
            Self::TooFewPoints => "TOO_FEW_POINTS",
            Self::OutOfBounds => "OUT_OF_BOUNDS",
            Self::DuplicateId => "DUPLICATE_ID",
            Self::UnclosedRing => "UNCLOSED_RING",
            Self::WindingOrder => "WINDING_ORDER",
            Self::DuplicateVertex => "DUPLICATE_VERTEX",
            Self::TinyArea => "TINY_AREA",
            Self::UnknownTerritory => "UNKNOWN_TERRITORY",
            Self::SelfIntersection => "SELF_INTERSECTION",
            Self::UnsupportedGeometry => "UNSUPPORTED_GEOMETRY",
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding: a category plus a locator/explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Defect category.
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    /// Which feature, which ring, and the measurement that triggered it.
    pub details: String,
}

impl ValidationIssue {
    /// Construct an issue.
    pub fn new(issue_type: IssueType, details: impl Into<String>) -> Self {
        Self {
            issue_type,
            details: details.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.issue_type, self.details)
    }
}

/// Verdict for one year's feature collection.
///
/// A non-empty `errors` list means the year is unpublishable. That is a
/// normal outcome, not a failure of the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub year: Year,
    /// Number of features in the repaired output.
    pub feature_count: usize,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub repairs: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// An empty result for `year`.
    pub fn new(year: Year) -> Self {
        Self {
            year,
            feature_count: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            repairs: Vec::new(),
        }
    }

    /// Append an issue to the list its category belongs to.
    pub fn record(&mut self, issue: ValidationIssue) {
        match issue.issue_type.bucket() {
            IssueBucket::Error => self.errors.push(issue),
            IssueBucket::Warning => self.warnings.push(issue),
            IssueBucket::Repair => self.repairs.push(issue),
        }
    }

    /// Whether the year must not be published.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// No errors, warnings, or repairs.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.repairs.is_empty()
    }
}
