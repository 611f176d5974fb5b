//! # histmap-cli — Command-Line Interface
//!
//! Provides the `histmap` binary. Each pipeline stage can be run on its own
//! for one file, or the whole build can be driven from a config file:
//!
//! ```bash
//! histmap hash data/tiles/world_1453.pmtiles
//! histmap prepare --year -500 --source data/tiles/world_bc500.pmtiles --output-dir public/data
//! histmap validate --year 1453 data/merged/world_1453.geojson --json > 1453.json
//! histmap report 1453.json bc500.json
//! histmap build --config histmap.yaml
//! ```
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | validation failure (errors found, digest mismatch) |
//! | 2 | operational error (unreadable input, bad config, I/O) |

pub mod build;
pub mod hash;
pub mod prepare;
pub mod report;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use histmap_pipeline::PipelineConfig;

/// Exit code for a clean run.
pub const EXIT_OK: u8 = 0;
/// Exit code when inputs were processed but failed validation.
pub const EXIT_VALIDATION_FAILURE: u8 = 1;
/// Exit code for errors that prevented processing.
pub const EXIT_OPERATIONAL_ERROR: u8 = 2;

/// Default config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "histmap.yaml";

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl GlobalOpts {
    /// Load the config named by `--config`, if any.
    pub fn load_config(&self) -> Result<Option<PipelineConfig>> {
        match &self.config {
            Some(path) => load_config(path).map(Some),
            None => Ok(None),
        }
    }

    /// Output directory: `--output-dir`, then the config's, then `fallback`.
    pub fn resolve_output_dir(&self, config: Option<&PipelineConfig>, fallback: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(|| config.map(|c| c.output_dir.clone()))
            .unwrap_or_else(|| fallback.to_path_buf())
    }
}

/// Read a pipeline config file.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    PipelineConfig::load(path).with_context(|| format!("failed to load config {}", path.display()))
}
