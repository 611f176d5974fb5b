//! # Atomic Publishing
//!
//! Every artifact is first written to a hidden temporary sibling
//! `.{name}.{uuid}.partial` in the destination directory, synced to disk,
//! and then renamed onto its final name. Rename within one directory is
//! atomic, so readers observe either the previous file or the complete new
//! one. On any failure the temporary is removed.

use std::path::{Path, PathBuf};

use histmap_core::{StageError, Year};
use tokio::io::AsyncWriteExt;

/// Suffix of in-flight temporary files.
pub const PARTIAL_SUFFIX: &str = ".partial";

/// Temporary sibling for `target`.
pub fn partial_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = format!(".{name}.{}{PARTIAL_SUFFIX}", uuid::Uuid::new_v4());
    target.with_file_name(tmp)
}

/// Write `bytes` to `target` atomically. Returns the number of bytes written.
pub async fn write_atomic(
    year: Option<Year>,
    target: &Path,
    bytes: &[u8],
) -> Result<u64, StageError> {
    let tmp = partial_path(target);
    let written = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok::<_, std::io::Error>(bytes.len() as u64)
    }
    .await;
    finish(year, &tmp, target, written).await
}

/// Copy `source` to `target` atomically. Returns the size of the copy.
pub async fn copy_atomic(year: Option<Year>, source: &Path, target: &Path) -> Result<u64, StageError> {
    let tmp = partial_path(target);
    let copied = async {
        tokio::fs::copy(source, &tmp).await?;
        let file = tokio::fs::OpenOptions::new().write(true).open(&tmp).await?;
        file.sync_all().await?;
        Ok::<_, std::io::Error>(file.metadata().await?.len())
    }
    .await;
    // Distinguish an unreadable source from an unwritable destination.
    if let Err(e) = &copied {
        if tokio::fs::metadata(source).await.is_err() {
            discard(&tmp).await;
            return Err(StageError::Io {
                year,
                path: source.to_path_buf(),
                source: std::io::Error::new(e.kind(), e.to_string()),
            });
        }
    }
    finish(year, &tmp, target, copied).await
}

async fn finish(
    year: Option<Year>,
    tmp: &Path,
    target: &Path,
    staged: std::io::Result<u64>,
) -> Result<u64, StageError> {
    let size = match staged {
        Ok(size) => size,
        Err(source) => {
            discard(tmp).await;
            return Err(StageError::Io {
                year,
                path: tmp.to_path_buf(),
                source,
            });
        }
    };
    if let Err(source) = tokio::fs::rename(tmp, target).await {
        discard(tmp).await;
        return Err(StageError::Io {
            year,
            path: target.to_path_buf(),
            source,
        });
    }
    Ok(size)
}

async fn discard(tmp: &Path) {
    if let Err(e) = tokio::fs::remove_file(tmp).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %tmp.display(), error = %e, "failed to remove partial file");
        }
    }
}

/// Create `dir` and its parents.
pub async fn ensure_dir(year: Option<Year>, dir: &Path) -> Result<(), StageError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| StageError::Io {
            year,
            path: dir.to_path_buf(),
            source,
        })
}
