//! # Content-Addressed Tile Naming
//!
//! Published tile archives are named after their own bytes:
//! `world_{year}.{hash}.pmtiles` by default, where `{hash}` is the 8-char
//! short id of the archive's digest.
//!
//! ## Integrity Invariant
//!
//! The name is a pure function of `(year, short id)`. Unchanged content
//! re-published on a later run gets the identical name; any byte change
//! gets a new one, so viewers never serve a stale cached archive.
//!
//! ## Template Validation
//!
//! A template must contain both `{year}` and `{hash}` (dropping either would
//! let distinct artifacts collide) and must not contain path separators
//! (the name is joined onto the publish directory).

use histmap_core::{ContentDigest, Year};
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

const YEAR_PLACEHOLDER: &str = "{year}";
const HASH_PLACEHOLDER: &str = "{hash}";

/// Default template for published tile archives.
pub const DEFAULT_TILE_TEMPLATE: &str = "world_{year}.{hash}.pmtiles";

/// A validated filename template with `{year}` and `{hash}` placeholders.
///
/// `{year}` renders [`Year::file_stem`] (`bc500`, `1453`); `{hash}` renders
/// the digest's short id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TileNameTemplate(String);

impl TileNameTemplate {
    /// Validate a template string.
    pub fn new(template: impl Into<String>) -> Result<Self, CryptoError> {
        let template = template.into();
        let invalid = |reason: &str| CryptoError::InvalidTemplate {
            template: template.clone(),
            reason: reason.to_string(),
        };
        if !template.contains(YEAR_PLACEHOLDER) {
            return Err(invalid("missing {year} placeholder"));
        }
        if !template.contains(HASH_PLACEHOLDER) {
            return Err(invalid("missing {hash} placeholder"));
        }
        if template.contains('/') || template.contains('\\') {
            return Err(invalid("must be a bare filename without path separators"));
        }
        if template.starts_with('.') {
            return Err(invalid("must not start with '.'"));
        }
        Ok(Self(template))
    }

    /// The raw template string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render the filename for a year and a short id.
    pub fn render(&self, year: Year, short_id: &str) -> String {
        self.0
            .replace(YEAR_PLACEHOLDER, &year.file_stem())
            .replace(HASH_PLACEHOLDER, short_id)
    }

    /// Render the filename for a year and a full digest.
    pub fn render_digest(&self, year: Year, digest: &ContentDigest) -> String {
        self.render(year, &digest.short_id())
    }
}

impl Default for TileNameTemplate {
    fn default() -> Self {
        Self(DEFAULT_TILE_TEMPLATE.to_string())
    }
}

impl TryFrom<String> for TileNameTemplate {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TileNameTemplate> for String {
    fn from(value: TileNameTemplate) -> Self {
        value.0
    }
}

impl std::fmt::Display for TileNameTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
