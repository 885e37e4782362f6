//! Configuration file support
//!
//! Settings are read from TOML and merged with command-line overrides; CLI
//! values always win.
//!
//! Search order:
//! 1. `--config <PATH>`
//! 2. `./glyph-restore.toml`
//! 3. `<config_dir>/glyph-restore/config.toml`
//!
//! ```toml
//! [degrade]
//! level = 2
//! seed = 42
//! threads = 4
//! extensions = ["jpg", "png"]
//! jpeg_quality = 95
//!
//! [dataset]
//! image_size = 48
//! per_folder = 10000
//! split_seed = 0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::dataset::{DEFAULT_IMAGE_SIZE, DEFAULT_PER_FOLDER, DEFAULT_SPLIT_SEED};
use crate::degrade::{DegradeOptions, DEFAULT_EXTENSIONS, DEFAULT_JPEG_QUALITY};

/// Local config file name
pub const LOCAL_CONFIG_FILE: &str = "glyph-restore.toml";

/// Config error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// `[degrade]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DegradeSection {
    pub level: u8,
    pub seed: Option<u64>,
    pub threads: Option<usize>,
    pub extensions: Vec<String>,
    pub jpeg_quality: u8,
}

impl Default for DegradeSection {
    fn default() -> Self {
        Self {
            level: 1,
            seed: None,
            threads: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// `[dataset]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSection {
    pub image_size: u32,
    pub per_folder: usize,
    pub split_seed: u64,
}

impl Default for DatasetSection {
    fn default() -> Self {
        Self {
            image_size: DEFAULT_IMAGE_SIZE,
            per_folder: DEFAULT_PER_FOLDER,
            split_seed: DEFAULT_SPLIT_SEED,
        }
    }
}

/// Complete configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub degrade: DegradeSection,
    pub dataset: DatasetSection,
}

/// Values explicitly given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub level: Option<u8>,
    pub seed: Option<u64>,
    pub threads: Option<usize>,
    pub extensions: Option<Vec<String>>,
    pub jpeg_quality: Option<u8>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Config {
    /// Candidate config paths in search order (excluding `--config`)
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("glyph-restore").join("config.toml"));
        }
        paths
    }

    /// Load the first config file found, or defaults when none exists
    pub fn load() -> Result<Self, ConfigError> {
        for path in Self::search_paths() {
            if path.is_file() {
                return Self::load_from_path(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load a specific config file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Resolve degradation options, CLI values taking precedence
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> DegradeOptions {
        let section = &self.degrade;
        DegradeOptions {
            level: cli.level.unwrap_or(section.level),
            seed: cli.seed.or(section.seed),
            threads: cli.threads.or(section.threads),
            extensions: cli
                .extensions
                .clone()
                .unwrap_or_else(|| section.extensions.clone()),
            jpeg_quality: cli.jpeg_quality.unwrap_or(section.jpeg_quality),
        }
    }

    /// Dataset image size as `(width, height)`
    pub fn image_size(&self) -> (u32, u32) {
        (self.dataset.image_size, self.dataset.image_size)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
