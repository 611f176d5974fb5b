//! # SHA-256 Digest Computation
//!
//! Computes [`ContentDigest`] values for tile archives and other payloads.
//!
//! ## Memory Bound
//!
//! [`hash_file`] never loads a whole file: it reads [`HASH_CHUNK_SIZE`]
//! bytes at a time through `tokio::fs` and feeds an incremental hasher,
//! so multi-gigabyte archives hash in constant memory without blocking
//! other years' tasks.
//!
//! ## Determinism
//!
//! The digest depends only on the bytes. The same content hashed through
//! [`hash_file`] or [`hash_content`] yields the same digest.

use std::path::Path;

use histmap_core::{ContentDigest, SHORT_ID_LEN};
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::error::CryptoError;

/// Read size for streamed file hashing.
pub const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// Compute the SHA-256 digest of a file, streamed in bounded chunks.
///
/// # Errors
///
/// Returns [`CryptoError::Io`] if the file cannot be opened or a read fails
/// partway through.
pub async fn hash_file(path: impl AsRef<Path>) -> Result<ContentDigest, CryptoError> {
    let path = path.as_ref();
    let io_err = |source| CryptoError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::open(path).await.map_err(io_err)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf).await.map_err(io_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(finalize(hasher))
}

/// Hash a file and compare it against an expected hex digest.
///
/// Returns the computed digest and whether it matched.
///
/// # Errors
///
/// [`CryptoError::InvalidDigest`] if `expected_hex` is not a digest, or
/// [`CryptoError::Io`] if the file cannot be read.
pub async fn verify_file(
    path: impl AsRef<Path>,
    expected_hex: &str,
) -> Result<(ContentDigest, bool), CryptoError> {
    let expected = ContentDigest::from_hex(expected_hex)?;
    let actual = hash_file(path).await?;
    let matched = actual == expected;
    Ok((actual, matched))
}

/// Compute the SHA-256 digest of an in-memory payload.
///
/// Accepts anything byte-like: `&str`, `String`, `&[u8]`, `Vec<u8>`.
pub fn hash_content(data: impl AsRef<[u8]>) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(data.as_ref());
    finalize(hasher)
}

/// The first 8 characters of a full hex digest.
///
/// Callers must pass a validated digest string (64 hex chars). A shorter
/// string is returned whole rather than panicking.
/// [`ContentDigest::short_id`] is the typed equivalent.
pub fn hash8(digest_hex: &str) -> &str {
    digest_hex.get(..SHORT_ID_LEN).unwrap_or(digest_hex)
}

fn finalize(hasher: Sha256) -> ContentDigest {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    ContentDigest::new(bytes)
}
