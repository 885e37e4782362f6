//! Command-line interface definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CliOverrides;
use crate::dataset::DEFAULT_UNPACK_PREFIX;

/// Synthetic degradation and dataset tooling for character image restoration
#[derive(Parser, Debug)]
#[command(name = "glyph-restore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Degrade every image in a folder at one severity level
    Degrade(DegradeArgs),
    /// Shuffle a clean corpus into set_1, set_2 and set_3
    Split(SplitArgs),
    /// Export a folder of images as a normalized CSV dataset
    ToCsv(ToCsvArgs),
    /// Write one CSV row back out as an image
    CsvView(CsvViewArgs),
    /// Pack a folder of same-sized images into a binary dump
    Pack(PackArgs),
    /// Write every image of a binary dump as JPEG files
    Unpack(UnpackArgs),
    /// Write one image of a binary dump to a file
    BinaryView(BinaryViewArgs),
    /// Show version, system and configuration information
    Info,
}

#[derive(Args, Debug)]
pub struct DegradeArgs {
    /// Folder of clean images
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Folder receiving the degraded images (created if missing)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Degradation level (1 = mild, 2 = moderate, 3 = severe)
    #[arg(short, long, value_name = "1-3")]
    pub level: Option<u8>,

    /// Random seed for reproducible output
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Worker threads (1 = sequential)
    #[arg(short, long, value_name = "INT")]
    pub threads: Option<usize>,

    /// Comma-separated file extensions to process
    #[arg(long, value_delimiter = ',', value_name = "EXT")]
    pub extensions: Option<Vec<String>>,

    /// JPEG quality for .jpg outputs (1-100)
    #[arg(long, value_name = "INT")]
    pub jpeg_quality: Option<u8>,

    /// Write a JSON run report to this path
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v per file, -vv with output paths)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress and summary output
    #[arg(short, long)]
    pub quiet: bool,
}

impl DegradeArgs {
    /// Values given on the command line, for merging over the config file
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            level: self.level,
            seed: self.seed,
            threads: self.threads,
            extensions: self.extensions.clone(),
            jpeg_quality: self.jpeg_quality,
        }
    }
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Folder holding the clean corpus
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Folder receiving set_1, set_2 and set_3
    #[arg(value_name = "DEST")]
    pub dest: PathBuf,

    /// Images per level folder
    #[arg(long, value_name = "INT")]
    pub per_folder: Option<usize>,

    /// Shuffle seed
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Config file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ToCsvArgs {
    /// Folder of images
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// CSV file to create
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Side length images are resized to
    #[arg(long, value_name = "PX")]
    pub size: Option<u32>,

    /// Config file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CsvViewArgs {
    /// CSV dataset
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Data row index (0-based, header excluded)
    #[arg(value_name = "INDEX")]
    pub index: usize,

    /// Image file to write
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Side length of the stored images
    #[arg(long, value_name = "PX")]
    pub size: Option<u32>,

    /// Config file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PackArgs {
    /// Folder of same-sized images
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// Binary dump to create
    #[arg(value_name = "BINARY")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// Binary dump
    #[arg(value_name = "BINARY")]
    pub input: PathBuf,

    /// Folder receiving <prefix>_<i>.jpg files
    #[arg(value_name = "OUTPUT_DIR")]
    pub output: PathBuf,

    /// File name prefix
    #[arg(long, default_value = DEFAULT_UNPACK_PREFIX)]
    pub prefix: String,
}

#[derive(Args, Debug)]
pub struct BinaryViewArgs {
    /// Binary dump
    #[arg(value_name = "BINARY")]
    pub input: PathBuf,

    /// Image index (0-based)
    #[arg(value_name = "INDEX")]
    pub index: usize,

    /// Image file to write
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}
