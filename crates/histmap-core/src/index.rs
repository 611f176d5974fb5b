//! # Year Index
//!
//! The manifest the viewer loads at startup, plus the per-artifact result
//! of preparing a tile archive. The index is rebuilt wholesale every run.

use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;
use crate::identity::Year;

/// Outcome of publishing one year's tile archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareResult {
    /// Full digest of the published bytes.
    pub hash: ContentDigest,
    /// Deterministic function of the year and `hash.short_id()`.
    pub hashed_filename: String,
    /// Size in bytes of the published copy.
    pub size: u64,
}

/// One historical snapshot and the artifact that renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearEntry {
    pub year: Year,
    pub filename: String,
    pub countries: Vec<String>,
}

impl YearEntry {
    /// Build the entry for a prepared year.
    pub fn from_prepared(year: Year, prepared: &PrepareResult, countries: Vec<String>) -> Self {
        Self {
            year,
            filename: prepared.hashed_filename.clone(),
            countries,
        }
    }
}

/// The manifest consumed by the viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearIndex {
    pub years: Vec<YearEntry>,
}

impl YearIndex {
    /// Assemble an index, ordering entries by year ascending.
    pub fn from_entries(mut entries: Vec<YearEntry>) -> Self {
        entries.sort_by_key(|e| e.year);
        Self { years: entries }
    }

    /// Look up the entry for a year.
    pub fn get(&self, year: Year) -> Option<&YearEntry> {
        self.years.iter().find(|e| e.year == year)
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}
