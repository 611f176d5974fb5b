//! # Prepare Stage
//!
//! Publishes one year's pre-built tile archive under its content-addressed
//! name:
//!
//! 1. hash the source archive (streamed),
//! 2. render the filename from the year and the digest's short id,
//! 3. copy into the output directory atomically,
//! 4. report digest, filename, and size.
//!
//! Re-running over unchanged bytes renders the same name and overwrites it
//! with identical content, so the stage is idempotent.

use std::path::Path;

use histmap_core::{PrepareResult, StageError, Year};
use histmap_crypto::{hash_file, CryptoError, TileNameTemplate};

use crate::publish;

/// Stage name used in log lines.
pub const PREPARE_STAGE: &str = "prepare";

/// Hash, name, and publish a year's tile archive.
///
/// # Errors
///
/// [`StageError::Io`] when the source cannot be read or the copy cannot be
/// written. No file is left under the final name on failure.
pub async fn prepare_tile(
    year: Year,
    source_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    template: &TileNameTemplate,
) -> Result<PrepareResult, StageError> {
    let source_path = source_path.as_ref();
    let output_dir = output_dir.as_ref();

    let hash = hash_file(source_path)
        .await
        .map_err(|e| crypto_to_stage(year, source_path, e))?;
    let hashed_filename = template.render(year, &hash.short_id());

    publish::ensure_dir(Some(year), output_dir).await?;
    let target = output_dir.join(&hashed_filename);
    let size = publish::copy_atomic(Some(year), source_path, &target).await?;

    tracing::debug!(
        year = %year,
        source = %source_path.display(),
        filename = %hashed_filename,
        size,
        "published tile archive"
    );

    Ok(PrepareResult {
        hash,
        hashed_filename,
        size,
    })
}

fn crypto_to_stage(year: Year, source_path: &Path, err: CryptoError) -> StageError {
    match err {
        CryptoError::Io { path, source } => StageError::Io {
            year: Some(year),
            path,
            source,
        },
        other => StageError::Data {
            year,
            path: source_path.to_path_buf(),
            detail: other.to_string(),
        },
    }
}
