//! # Hash Subcommand
//!
//! Prints the SHA-256 digest and short id of a file. With `--expect`,
//! verifies the file against a known digest instead.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use histmap_crypto::{hash_file, verify_file};

use crate::{EXIT_OK, EXIT_VALIDATION_FAILURE};

/// Arguments for `histmap hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// File to hash.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Expected 64-char hex digest. Exit 1 if the file does not match.
    #[arg(long, value_name = "HEX")]
    pub expect: Option<String>,
}

/// Execute the hash subcommand.
pub async fn run_hash(args: &HashArgs) -> Result<u8> {
    match &args.expect {
        None => {
            let digest = hash_file(&args.file)
                .await
                .with_context(|| format!("failed to hash {}", args.file.display()))?;
            println!("{}  {}", digest.to_hex(), args.file.display());
            println!("short id: {}", digest.short_id());
            Ok(EXIT_OK)
        }
        Some(expected) => {
            let (digest, matched) = verify_file(&args.file, expected)
                .await
                .with_context(|| format!("failed to verify {}", args.file.display()))?;
            if matched {
                println!("OK: {} digest={}", args.file.display(), digest.to_hex());
                Ok(EXIT_OK)
            } else {
                println!(
                    "MISMATCH: {} expected={} actual={}",
                    args.file.display(),
                    expected.to_ascii_lowercase(),
                    digest.to_hex()
                );
                Ok(EXIT_VALIDATION_FAILURE)
            }
        }
    }
}
