//! # Hashing Error Types
//!
//! Structured errors for the operations in `histmap-crypto`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from hashing and naming operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The file could not be opened, or a read failed mid-stream.
    #[error("I/O error hashing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An expected digest string is not 64 hex characters.
    #[error(transparent)]
    InvalidDigest(#[from] histmap_core::HistmapError),

    /// A filename template is unusable.
    #[error("invalid filename template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },
}

impl CryptoError {
    /// Path involved in an I/O failure.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::InvalidDigest(_) | Self::InvalidTemplate { .. } => None,
        }
    }
}
