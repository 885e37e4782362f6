//! glyph-restore - tooling for a character image restoration workflow
//!
//! Synthetic degradation of clean glyph images, dataset packing (CSV and
//! binary dumps) and inference preprocessing.
//!
//! # Modules
//!
//! - [`degrade`] - fade, crack and stain effects at three severity levels
//! - [`dataset`] - corpus splitting, CSV export/view, binary dump pack/unpack
//! - [`preprocess`] - model input tensors
//! - [`config`] - TOML configuration merged with CLI overrides
//! - [`progress`] - batch progress and summaries
//! - [`cli`] - command-line definitions

pub mod cli;
pub mod config;
pub mod dataset;
pub mod degrade;
pub mod preprocess;
pub mod progress;

pub use cli::{
    BinaryViewArgs, Cli, Commands, CsvViewArgs, DegradeArgs, PackArgs, SplitArgs, ToCsvArgs,
    UnpackArgs,
};
pub use config::{CliOverrides, Config, ConfigError};
pub use dataset::{BinaryDataset, DatasetError, SplitOptions, SplitReport};
pub use degrade::{
    BatchReport, DegradationLevel, DegradationParams, DegradeError, DegradeOptions, Degrader,
    FileOutcome,
};
pub use preprocess::load_and_preprocess;
pub use progress::{BatchProgress, OutputMode};

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_ARGS: i32 = 2;
    pub const INPUT_NOT_FOUND: i32 = 3;
    /// Run completed but some files failed
    pub const PARTIAL_FAILURE: i32 = 4;
}
