//! # Prepare Subcommand
//!
//! Publishes one tile archive under its content-addressed name and prints
//! the resulting [`PrepareResult`](histmap_core::PrepareResult) as JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use histmap_core::Year;
use histmap_crypto::TileNameTemplate;
use histmap_pipeline::prepare_tile;

use crate::{GlobalOpts, EXIT_OK};

/// Output directory when neither `--output-dir` nor a config names one.
pub const DEFAULT_OUTPUT_DIR: &str = "public/data";

/// Arguments for `histmap prepare`.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Year of the archive; negative for BCE.
    #[arg(long, allow_negative_numbers = true)]
    pub year: i32,

    /// Source tile archive.
    #[arg(long, value_name = "FILE")]
    pub source: PathBuf,

    /// Filename template with `{year}` and `{hash}` placeholders.
    #[arg(long)]
    pub template: Option<String>,
}

/// Execute the prepare subcommand.
pub async fn run_prepare(args: &PrepareArgs, globals: &GlobalOpts) -> Result<u8> {
    let config = globals.load_config()?;
    let template = match (&args.template, &config) {
        (Some(t), _) => TileNameTemplate::new(t.as_str())?,
        (None, Some(c)) => c.filename_template.clone(),
        (None, None) => TileNameTemplate::default(),
    };
    let output_dir = globals.resolve_output_dir(config.as_ref(), Path::new(DEFAULT_OUTPUT_DIR));
    let year = Year::new(args.year);

    let result = prepare_tile(year, &args.source, &output_dir, &template)
        .await
        .with_context(|| format!("failed to prepare {} for {}", args.source.display(), year.label()))?;

    tracing::info!(
        year = %year,
        filename = %result.hashed_filename,
        "published into {}",
        output_dir.display()
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepares_into_output_dir_flag() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src.pmtiles");
        std::fs::write(&source, b"tiles").unwrap();
        let out = dir.path().join("out");
        let globals = GlobalOpts {
            output_dir: Some(out.clone()),
            ..GlobalOpts::default()
        };
        let args = PrepareArgs {
            year: -500,
            source,
            template: Some("map_{year}_{hash}.pmtiles".into()),
        };
        assert_eq!(run_prepare(&args, &globals).await.unwrap(), EXIT_OK);
        let names: Vec<String> = std::fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("map_bc500_"));
    }

    #[tokio::test]
    async fn rejects_template_without_hash() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src.pmtiles");
        std::fs::write(&source, b"tiles").unwrap();
        let args = PrepareArgs {
            year: 1,
            source,
            template: Some("world_{year}.pmtiles".into()),
        };
        let globals = GlobalOpts {
            output_dir: Some(dir.path().join("out")),
            ..GlobalOpts::default()
        };
        assert!(run_prepare(&args, &globals).await.is_err());
    }
}
