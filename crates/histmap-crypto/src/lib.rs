//! # histmap-crypto — Content Hashing
//!
//! Provides the content-addressing building blocks for the pipeline:
//!
//! - **SHA-256** digests of files (streamed in bounded chunks) and of
//!   in-memory payloads, producing [`ContentDigest`](histmap_core::ContentDigest).
//! - **Short ids**: the first 8 hex characters of a digest, used in
//!   published filenames for cache busting.
//! - **Content-addressed naming** ([`TileNameTemplate`]): the deterministic
//!   `(year, short id) -> filename` function.
//!
//! ## Crate Policy
//!
//! - Depends only on `histmap-core` internally.
//! - No mocking of hashing in tests; all tests use real SHA-256.

pub mod cas;
pub mod error;
pub mod sha256;

pub use cas::{TileNameTemplate, DEFAULT_TILE_TEMPLATE};
pub use error::CryptoError;
pub use sha256::{hash8, hash_content, hash_file, verify_file, HASH_CHUNK_SIZE};
