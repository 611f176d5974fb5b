//! # Content Digest — Content-Addressed Identifiers
//!
//! Defines [`ContentDigest`], the SHA-256 fingerprint that names every
//! published tile archive. The digest itself is computed in
//! `histmap-crypto`; this module owns the value type so that results can
//! carry it without depending on the hashing crate.
//!
//! ## Invariant
//!
//! A `ContentDigest` always holds exactly 32 bytes, so its hex rendering is
//! always 64 characters and [`ContentDigest::short_id`] is total.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::HistmapError;

/// Length of the short identifier derived from a digest.
pub const SHORT_ID_LEN: usize = 8;

/// A SHA-256 content digest.
///
/// Serializes as the lowercase 64-character hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Wrap raw digest bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a 64-character hex digest. Upper-case input is accepted and
    /// normalized.
    pub fn from_hex(hex: &str) -> Result<Self, HistmapError> {
        let hex = hex.trim();
        if hex.len() != 64 {
            return Err(HistmapError::InvalidDigest(format!(
                "digest must be 64 hex chars, got {} chars",
                hex.len()
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| HistmapError::InvalidDigest("non-ASCII digest".into()))?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| {
                HistmapError::InvalidDigest(format!("non-hex characters in {pair:?}"))
            })?;
        }
        Ok(Self(bytes))
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// The first [`SHORT_ID_LEN`] hex characters of the digest.
    pub fn short_id(&self) -> String {
        self.0[..SHORT_ID_LEN / 2]
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for ContentDigest {
    type Err = HistmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
