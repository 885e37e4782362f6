//! Synthetic degradation module
//!
//! Turns clean character images into training inputs for a restoration
//! model by composing three effects at one of three severity presets.
//!
//! # Algorithm
//!
//! 1. Collapse to 8-bit grayscale
//! 2. Fade: scale intensity by `1 - fade_amount`
//! 3. Cracks: random thick lines plus salt noise, added with weight 0.5
//! 4. Stains: 1-5 uniform squares alpha-blended at `stain_intensity`
//!
//! | Level | crack | fade | stain | stain size |
//! |-------|-------|------|-------|------------|
//! | 1     | 0.3   | 0.1  | 0.25  | 20         |
//! | 2     | 0.5   | 0.3  | 0.30  | 25         |
//! | 3     | 0.6   | 0.3  | 0.35  | 30         |
//!
//! # Example
//!
//! ```rust,no_run
//! use glyph_restore::{DegradeOptions, Degrader};
//! use std::path::Path;
//!
//! let options = DegradeOptions::builder().level(2).seed(42).build();
//! let mut degrader = Degrader::new(options).unwrap();
//! let report = degrader.run(Path::new("clean"), Path::new("degraded")).unwrap();
//! println!("{} ok, {} failed", report.succeeded(), report.failed());
//! ```

mod effects;
mod pipeline;
mod types;

// Re-export public API
pub use effects::{
    apply_cracks, apply_stains, blend_cracks, blend_stain, check_stain_fits, crack_count,
    crack_mask, degrade_image, fade, stain_patch, to_grayscale, CrackMask,
};
pub use pipeline::{
    save_gray, DegradeOptions, DegradeOptionsBuilder, DegradeProgress, Degrader, NoProgress,
};
pub use types::{
    BatchReport, DegradationLevel, DegradationParams, DegradeError, FileOutcome, Result,
    StainPatch, DEFAULT_EXTENSIONS, DEFAULT_JPEG_QUALITY,
};
