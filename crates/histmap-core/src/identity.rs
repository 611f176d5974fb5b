//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers that flow through the pipeline.
//! You cannot pass a bare `i32` where a [`Year`] is expected, nor an
//! arbitrary string where a [`RunId`] is.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A historical snapshot year. Negative values are BCE, positive are CE.
///
/// There is no year zero in the historical calendar, but the pipeline does
/// not reject it: the value is an opaque key into the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Year(i32);

impl Year {
    /// Wrap a signed year.
    pub const fn new(year: i32) -> Self {
        Self(year)
    }

    /// The signed year value.
    pub const fn value(&self) -> i32 {
        self.0
    }

    /// Whether this year is before the common era.
    pub const fn is_bce(&self) -> bool {
        self.0 < 0
    }

    /// Human-readable label, e.g. `"500 BCE"` or `"1453 CE"`.
    pub fn label(&self) -> String {
        if self.is_bce() {
            format!("{} BCE", self.0.unsigned_abs())
        } else {
            format!("{} CE", self.0)
        }
    }

    /// Filename-safe rendering: `"bc500"` for -500, `"1453"` for 1453.
    pub fn file_stem(&self) -> String {
        if self.is_bce() {
            format!("bc{}", self.0.unsigned_abs())
        } else {
            self.0.to_string()
        }
    }
}

impl From<i32> for Year {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for one full pipeline run.
///
/// Callers may supply their own (e.g. a CI build number); [`RunId::new`]
/// generates a random one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Generate a new random run identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Use a caller-supplied identifier.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
