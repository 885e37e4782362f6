//! Corpus splitting
//!
//! Shuffles a folder of clean images with a fixed seed and distributes them
//! into three level folders (`set_1`, `set_2`, `set_3`), converting each
//! image to grayscale on the way. Each folder is later degraded at its own
//! level.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

use super::types::{file_name_of, DatasetError, Result, SPLIT_FOLDERS};
use crate::preprocess::load_gray;

/// Options for splitting a corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOptions {
    /// Images assigned to each level folder
    pub per_folder: usize,
    /// Shuffle seed
    pub seed: u64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            per_folder: super::types::DEFAULT_PER_FOLDER,
            seed: super::types::DEFAULT_SPLIT_SEED,
        }
    }
}

/// Result of a split
#[derive(Debug, Default)]
pub struct SplitReport {
    /// Destination folders, index 0 is `set_1`
    pub folders: Vec<PathBuf>,
    /// Images successfully written per folder
    pub written: [usize; SPLIT_FOLDERS],
    /// Files that could not be converted
    pub failures: Vec<(String, DatasetError)>,
}

impl SplitReport {
    pub fn total_written(&self) -> usize {
        self.written.iter().sum()
    }
}

/// Name of the level folder at `index` (0-based)
pub fn split_folder_name(index: usize) -> String {
    format!("set_{}", index + 1)
}

/// Split every regular file in `source` into three level folders under `dest`
///
/// Files are sorted before the seeded shuffle so the assignment does not
/// depend on directory enumeration order. Files beyond `3 * per_folder` are
/// left out. A file that fails to decode or write is recorded and skipped.
pub fn split_dataset(source: &Path, dest: &Path, options: &SplitOptions) -> Result<SplitReport> {
    if !source.is_dir() {
        return Err(DatasetError::InputNotFound(source.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(source)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    let mut rng = StdRng::seed_from_u64(options.seed);
    files.shuffle(&mut rng);
    files.truncate(options.per_folder.saturating_mul(SPLIT_FOLDERS));

    let folders: Vec<PathBuf> = (0..SPLIT_FOLDERS)
        .map(|i| dest.join(split_folder_name(i)))
        .collect();
    for folder in &folders {
        std::fs::create_dir_all(folder)?;
    }

    let mut report = SplitReport {
        folders: folders.clone(),
        ..Default::default()
    };

    if options.per_folder == 0 {
        return Ok(report);
    }

    for (i, path) in files.iter().enumerate() {
        let slot = i / options.per_folder;
        let name = file_name_of(path);
        let target = folders[slot].join(&name);

        let converted = load_gray(path).and_then(|gray| {
            gray.save(&target).map_err(|source| DatasetError::Write {
                path: target.clone(),
                source,
            })
        });

        match converted {
            Ok(()) => report.written[slot] += 1,
            Err(e) => {
                tracing::warn!(file = %name, "split skipped: {e}");
                report.failures.push((name, e));
            }
        }
    }

    tracing::info!(
        written = report.total_written(),
        failed = report.failures.len(),
        dest = %dest.display(),
        "split corpus into level folders"
    );
    Ok(report)
}
