//! Common types for the dataset module

use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// Side length of the character images the model is trained on
pub const DEFAULT_IMAGE_SIZE: u32 = 48;

/// Images per level folder when splitting a corpus
pub const DEFAULT_PER_FOLDER: usize = 10_000;

/// Seed used for the corpus shuffle unless overridden
pub const DEFAULT_SPLIT_SEED: u64 = 0;

/// Number of level folders produced by a split
pub const SPLIT_FOLDERS: usize = 3;

/// Binary dump header length: width, height, count as big-endian u32
pub const BINARY_HEADER_LEN: usize = 12;

/// Default file name prefix for images unpacked from a binary dump
pub const DEFAULT_UNPACK_PREFIX: &str = "image";

// ============================================================
// Error Types
// ============================================================

/// Dataset error types
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("No images found in {0}")]
    NoImages(PathBuf),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{path} is {actual:?}, expected {expected:?}")]
    DimensionMismatch {
        path: PathBuf,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Binary payload is {actual} bytes, header declares {expected}")]
    PayloadSize { expected: u64, actual: u64 },

    #[error("Binary header declares {count} images of {width}x{height}")]
    EmptyDimensions { width: u32, height: u32, count: u32 },

    #[error("Index {index} out of range ({count} images)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("CSV line {line}: {reason}")]
    Csv { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DatasetError>;

// ============================================================
// Helpers
// ============================================================

/// Regular files in `dir` whose extension is in `extensions`, sorted by name
pub fn list_images(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DatasetError::InputNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
        if path.is_file() && matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// File name of `path` as an owned string
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
