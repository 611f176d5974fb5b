//! # Pipeline Configuration
//!
//! A build is described by a YAML file, conventionally `histmap.yaml`:
//!
//! ```yaml
//! tiles_dir: data/tiles
//! geojson_dir: data/merged
//! output_dir: public/data
//! tile_source: "world_{year}.pmtiles"
//! geojson_source: "world_{year}.geojson"
//! filename_template: "world_{year}.{hash}.pmtiles"
//! concurrency: 4
//! error_policy: halt
//! validator:
//!   min_area: 1.0e-6
//! years:
//!   - year: -500
//!     countries: [Achaemenid Empire, Carthage]
//!   - year: 1453
//!     countries: []
//! ```
//!
//! `{year}` in the source templates renders the year's file stem (`bc500`,
//! `1453`). Relative directories are resolved against the config file's
//! directory by [`PipelineConfig::load`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use histmap_core::Year;
use histmap_crypto::TileNameTemplate;
use histmap_geo::{GeoValidator, ValidatorConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading a pipeline configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in config{}: {source}", display_path(.path))]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

/// What the orchestrator does when a year has validation errors or a stage
/// failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Publish nothing: no index is written for the run.
    #[default]
    Halt,
    /// Publish the index without the failing years.
    Exclude,
}

/// One configured year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearConfig {
    pub year: Year,
    /// Territory names present in this year. Written to the index and, when
    /// non-empty, used as the known-territory list during validation.
    #[serde(default)]
    pub countries: Vec<String>,
}

/// Full build configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tiles_dir: PathBuf,
    pub geojson_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tile_source: String,
    pub geojson_source: String,
    pub filename_template: TileNameTemplate,
    pub concurrency: usize,
    pub error_policy: ErrorPolicy,
    pub validator: ValidatorConfig,
    pub years: Vec<YearConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tiles_dir: PathBuf::from("data/tiles"),
            geojson_dir: PathBuf::from("data/merged"),
            output_dir: PathBuf::from("public/data"),
            tile_source: "world_{year}.pmtiles".to_string(),
            geojson_source: "world_{year}.geojson".to_string(),
            filename_template: TileNameTemplate::default(),
            concurrency: 4,
            error_policy: ErrorPolicy::default(),
            validator: ValidatorConfig::default(),
            years: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Parse and check a YAML document. Paths are left as written.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse { path: None, source })?;
        config.check()?;
        Ok(config)
    }

    /// Read a YAML config file and resolve relative directories against the
    /// file's own directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        config.check()?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Prefix every relative directory with `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        for dir in [&mut self.tiles_dir, &mut self.geojson_dir, &mut self.output_dir] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        for (field, template) in [("tile_source", &self.tile_source), ("geojson_source", &self.geojson_source)] {
            if !template.contains("{year}") {
                return Err(ConfigError::Invalid(format!(
                    "{field} {template:?} must contain a {{year}} placeholder"
                )));
            }
        }
        let mut seen = BTreeSet::new();
        for entry in &self.years {
            if !seen.insert(entry.year) {
                return Err(ConfigError::Invalid(format!("year {} is listed twice", entry.year)));
            }
        }
        Ok(())
    }

    /// Source tile archive for `year`.
    pub fn tile_path(&self, year: Year) -> PathBuf {
        self.tiles_dir.join(self.tile_source.replace("{year}", &year.file_stem()))
    }

    /// Merged GeoJSON for `year`.
    pub fn geojson_path(&self, year: Year) -> PathBuf {
        self.geojson_dir.join(self.geojson_source.replace("{year}", &year.file_stem()))
    }

    /// Where the repaired GeoJSON for `year` is published.
    pub fn repaired_path(&self, year: Year) -> PathBuf {
        self.output_dir
            .join("geojson")
            .join(format!("{}.geojson", year.file_stem()))
    }

    /// Validator for one configured year.
    pub fn validator_for(&self, year: &YearConfig) -> GeoValidator {
        let validator = GeoValidator::new(self.validator.clone());
        if year.countries.is_empty() {
            validator
        } else {
            validator.with_known_territories(year.countries.iter().cloned())
        }
    }
}
