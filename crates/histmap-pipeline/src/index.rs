//! # Year Index Writer
//!
//! The index is rebuilt from scratch each run and replaces the previous one
//! in a single rename; it is never patched in place.

use std::path::{Path, PathBuf};

use histmap_core::{StageError, YearEntry, YearIndex};

use crate::publish;

/// Name of the index file in the output directory.
pub const INDEX_FILENAME: &str = "index.json";

/// Assemble the index, ordered by year ascending.
pub fn build_year_index(entries: Vec<YearEntry>) -> YearIndex {
    YearIndex::from_entries(entries)
}

/// Write `index` as pretty JSON to `output_dir/index.json`.
pub async fn write_year_index(output_dir: impl AsRef<Path>, index: &YearIndex) -> Result<PathBuf, StageError> {
    let output_dir = output_dir.as_ref();
    publish::ensure_dir(None, output_dir).await?;
    let target = output_dir.join(INDEX_FILENAME);
    let mut json = serde_json::to_vec_pretty(index).map_err(|e| StageError::Io {
        year: None,
        path: target.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;
    json.push(b'\n');
    publish::write_atomic(None, &target, &json).await?;
    tracing::debug!(path = %target.display(), years = index.len(), "wrote year index");
    Ok(target)
}
