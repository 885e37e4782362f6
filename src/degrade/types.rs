//! Degradation module core types
//!
//! Severity presets, error types and the per-file / per-run result records.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// Lowest intensity a stain patch can take
pub const STAIN_VALUE_MIN: u8 = 180;

/// Highest intensity a stain patch can take
pub const STAIN_VALUE_MAX: u8 = 255;

/// Maximum number of stains placed on one image
pub const MAX_STAINS: u32 = 5;

/// Weight of the crack canvas when blended onto the faded image
pub const CRACK_BLEND_WEIGHT: f64 = 0.5;

/// Crack line thickness range in pixels (inclusive)
pub const CRACK_THICKNESS_MIN: u32 = 1;
pub const CRACK_THICKNESS_MAX: u32 = 3;

/// Default output JPEG quality
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Extensions processed by default (compared case-insensitively)
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

// ============================================================
// Error Types
// ============================================================

/// Degradation error types
#[derive(Debug, Error)]
pub enum DegradeError {
    #[error("Invalid degradation level {0} (expected 1, 2 or 3)")]
    InvalidLevel(u8),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Input directory not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Stain size {stain_size} does not fit in a {width}x{height} image")]
    StainTooLarge {
        width: u32,
        height: u32,
        stain_size: u32,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DegradeError>;

// ============================================================
// Severity presets
// ============================================================

/// Transform parameters selected by a degradation level
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DegradationParams {
    /// Drives both the number of crack lines and the salt-noise probability
    pub crack_intensity: f64,
    /// Fraction of brightness removed by fading
    pub fade_amount: f64,
    /// Alpha weight of each stain patch
    pub stain_intensity: f64,
    /// Side length of each square stain in pixels
    pub stain_size: u32,
}

/// Parameter table indexed by `level - 1`
const LEVEL_PARAMS: [DegradationParams; 3] = [
    DegradationParams {
        crack_intensity: 0.3,
        fade_amount: 0.1,
        stain_intensity: 0.25,
        stain_size: 20,
    },
    DegradationParams {
        crack_intensity: 0.5,
        fade_amount: 0.3,
        stain_intensity: 0.30,
        stain_size: 25,
    },
    DegradationParams {
        crack_intensity: 0.6,
        fade_amount: 0.3,
        stain_intensity: 0.35,
        stain_size: 30,
    },
];

/// Severity preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DegradationLevel {
    /// Somewhat degraded but still readable
    Mild,
    /// Partially degraded, some characters hard to read
    Moderate,
    /// Severely degraded, very hard to read
    Severe,
}

impl DegradationLevel {
    /// All levels in ascending severity
    pub fn all() -> [DegradationLevel; 3] {
        [
            DegradationLevel::Mild,
            DegradationLevel::Moderate,
            DegradationLevel::Severe,
        ]
    }

    /// Numeric level (1-3)
    pub fn number(&self) -> u8 {
        match self {
            DegradationLevel::Mild => 1,
            DegradationLevel::Moderate => 2,
            DegradationLevel::Severe => 3,
        }
    }

    /// Transform parameters for this level
    pub fn params(&self) -> DegradationParams {
        LEVEL_PARAMS[usize::from(self.number() - 1)]
    }
}

impl TryFrom<u8> for DegradationLevel {
    type Error = DegradeError;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            1 => Ok(DegradationLevel::Mild),
            2 => Ok(DegradationLevel::Moderate),
            3 => Ok(DegradationLevel::Severe),
            other => Err(DegradeError::InvalidLevel(other)),
        }
    }
}

impl fmt::Display for DegradationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

// ============================================================
// Intermediate records
// ============================================================

/// A placed stain: top-left corner, side length and fill value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StainPatch {
    pub x: u32,
    pub y: u32,
    pub size: u32,
    pub value: u8,
}

impl StainPatch {
    /// Right edge (exclusive)
    pub fn right(&self) -> u32 {
        self.x + self.size
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> u32 {
        self.y + self.size
    }
}

// ============================================================
// Results
// ============================================================

/// Result of degrading one file in a batch
#[derive(Debug)]
pub enum FileOutcome {
    /// Degraded image written to `output`
    Degraded { file_name: String, output: PathBuf },
    /// File skipped; the run continued
    Failed { file_name: String, error: DegradeError },
}

impl FileOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            FileOutcome::Degraded { file_name, .. } | FileOutcome::Failed { file_name, .. } => {
                file_name
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Degraded { .. })
    }
}

/// Summary of a directory run
#[derive(Debug)]
pub struct BatchReport {
    pub level: DegradationLevel,
    pub outcomes: Vec<FileOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    /// Number of files written
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Outcomes that failed, in processing order
    pub fn failures(&self) -> impl Iterator<Item = (&str, &DegradeError)> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Failed { file_name, error } => Some((file_name.as_str(), error)),
            FileOutcome::Degraded { .. } => None,
        })
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// JSON form written by `degrade --report`
    pub fn to_json(&self) -> serde_json::Value {
        let failures: Vec<serde_json::Value> = self
            .failures()
            .map(|(file, error)| serde_json::json!({ "file": file, "error": error.to_string() }))
            .collect();

        serde_json::json!({
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "level": self.level.number(),
            "params": self.level.params(),
            "total": self.total(),
            "succeeded": self.succeeded(),
            "failed": self.failed(),
            "failures": failures,
            "elapsed_seconds": self.elapsed.as_secs_f64(),
        })
    }
}
