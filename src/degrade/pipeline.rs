//! Directory-level degradation
//!
//! Walks an input directory in sorted filename order, degrades every
//! recognized image and writes it under the same name to the output
//! directory. A bad file is recorded as a failed [`FileOutcome`] and the run
//! continues; an invalid configuration aborts before any file is touched.

use image::codecs::jpeg::JpegEncoder;
use image::GrayImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::effects::degrade_image;
use super::types::{
    BatchReport, DegradationLevel, DegradationParams, DegradeError, FileOutcome, Result,
    DEFAULT_EXTENSIONS, DEFAULT_JPEG_QUALITY,
};
use crate::preprocess::open_image;

/// Options for a degradation run
#[derive(Debug, Clone)]
pub struct DegradeOptions {
    /// Severity preset (1-3); validated by [`Degrader::new`]
    pub level: u8,
    /// Seed for reproducible runs; `None` seeds from the OS
    pub seed: Option<u64>,
    /// Worker threads; `None` or `Some(1)` processes sequentially
    pub threads: Option<usize>,
    /// File extensions to process (case-insensitive, without the dot)
    pub extensions: Vec<String>,
    /// Quality used when the output file is a JPEG
    pub jpeg_quality: u8,
}

impl Default for DegradeOptions {
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

impl DegradeOptions {
    /// Create a builder
    pub fn builder() -> DegradeOptionsBuilder {
        DegradeOptionsBuilder::default()
    }

    /// Check every field, resolving the level
    pub fn validate(&self) -> Result<DegradationLevel> {
        let level = DegradationLevel::try_from(self.level)?;

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(DegradeError::InvalidParameter {
                name: "jpeg_quality".to_string(),
                reason: "must be between 1 and 100".to_string(),
            });
        }

        if self.threads == Some(0) {
            return Err(DegradeError::InvalidParameter {
                name: "threads".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.extensions.is_empty() {
            return Err(DegradeError::InvalidParameter {
                name: "extensions".to_string(),
                reason: "at least one extension is required".to_string(),
            });
        }

        Ok(level)
    }

    /// Whether `path` carries one of the configured extensions
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// Builder for DegradeOptions
#[derive(Debug, Default)]
pub struct DegradeOptionsBuilder {
    options: DegradeOptions,
}

impl DegradeOptionsBuilder {
    #[must_use]
    pub fn level(mut self, level: u8) -> Self {
        self.options.level = level;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.options.threads = Some(threads);
        self
    }

    #[must_use]
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.options.jpeg_quality = quality;
        self
    }

    #[must_use]
    pub fn build(self) -> DegradeOptions {
        self.options
    }
}

/// Per-file progress hook
pub trait DegradeProgress: Sync {
    /// Called once the file list is known
    fn on_start(&self, _total: usize) {}
    /// Called after each file, in completion order
    fn on_file(&self, _outcome: &FileOutcome) {}
}

/// Progress hook that does nothing
pub struct NoProgress;

impl DegradeProgress for NoProgress {}

/// Degradation runner holding a validated level and the run generator
pub struct Degrader {
    options: DegradeOptions,
    level: DegradationLevel,
    rng: StdRng,
}

impl Degrader {
    /// Validate options and seed the generator
    pub fn new(options: DegradeOptions) -> Result<Self> {
        let level = options.validate()?;
        let rng = options
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        tracing::debug!(level = level.number(), seed = ?options.seed, "degrader created");

        Ok(Self {
            options,
            level,
            rng,
        })
    }

    pub fn level(&self) -> DegradationLevel {
        self.level
    }

    pub fn params(&self) -> DegradationParams {
        self.level.params()
    }

    pub fn options(&self) -> &DegradeOptions {
        &self.options
    }

    /// Recognized image files in `input_dir`, sorted by name
    pub fn collect_inputs(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        if !input_dir.is_dir() {
            return Err(DegradeError::InputNotFound(input_dir.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(input_dir)? {
            let path = entry?.path();
            if path.is_file() && self.options.accepts(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Degrade one file using the run generator
    pub fn degrade_file(&mut self, input: &Path, output: &Path) -> Result<()> {
        let params = self.params();
        process_file(input, output, &params, self.options.jpeg_quality, &mut self.rng)
    }

    /// Degrade every recognized image in `input_dir` into `output_dir`
    pub fn run(&mut self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport> {
        self.run_with_progress(input_dir, output_dir, &NoProgress)
    }

    /// Same as [`run`](Self::run) with a progress hook
    pub fn run_with_progress(
        &mut self,
        input_dir: &Path,
        output_dir: &Path,
        progress: &dyn DegradeProgress,
    ) -> Result<BatchReport> {
        let start = Instant::now();
        let files = self.collect_inputs(input_dir)?;
        std::fs::create_dir_all(output_dir)?;

        tracing::info!(
            level = self.level.number(),
            files = files.len(),
            input = %input_dir.display(),
            output = %output_dir.display(),
            "starting degradation run"
        );
        progress.on_start(files.len());

        let outcomes = match self.options.threads {
            Some(threads) if threads > 1 => {
                self.run_parallel(&files, output_dir, threads, progress)?
            }
            _ => self.run_sequential(&files, output_dir, progress),
        };

        let report = BatchReport {
            level: self.level,
            outcomes,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "degradation run finished"
        );
        Ok(report)
    }

    fn run_sequential(
        &mut self,
        files: &[PathBuf],
        output_dir: &Path,
        progress: &dyn DegradeProgress,
    ) -> Vec<FileOutcome> {
        let params = self.params();
        let quality = self.options.jpeg_quality;
        let level = self.level;

        files
            .iter()
            .map(|input| {
                let outcome =
                    degrade_to_dir(input, output_dir, &params, quality, level, &mut self.rng);
                progress.on_file(&outcome);
                outcome
            })
            .collect()
    }

    /// One generator per image, seeded in file order from the run generator
    fn run_parallel(
        &mut self,
        files: &[PathBuf],
        output_dir: &Path,
        threads: usize,
        progress: &dyn DegradeProgress,
    ) -> Result<Vec<FileOutcome>> {
        let params = self.params();
        let quality = self.options.jpeg_quality;
        let level = self.level;
        let seeds: Vec<u64> = files.iter().map(|_| self.rng.random()).collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| DegradeError::InvalidParameter {
                name: "threads".to_string(),
                reason: e.to_string(),
            })?;

        Ok(pool.install(|| {
            files
                .par_iter()
                .zip(seeds.par_iter())
                .map(|(input, &seed)| {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let outcome =
                        degrade_to_dir(input, output_dir, &params, quality, level, &mut rng);
                    progress.on_file(&outcome);
                    outcome
                })
                .collect()
        }))
    }
}

fn degrade_to_dir<R: Rng>(
    input: &Path,
    output_dir: &Path,
    params: &DegradationParams,
    quality: u8,
    level: DegradationLevel,
    rng: &mut R,
) -> FileOutcome {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let output = output_dir.join(&file_name);

    match process_file(input, &output, params, quality, rng) {
        Ok(()) => {
            tracing::debug!(file = %file_name, %level, "degraded");
            FileOutcome::Degraded { file_name, output }
        }
        Err(error) => {
            tracing::warn!(file = %file_name, %level, "skipping: {error}");
            FileOutcome::Failed { file_name, error }
        }
    }
}

fn process_file<R: Rng>(
    input: &Path,
    output: &Path,
    params: &DegradationParams,
    quality: u8,
    rng: &mut R,
) -> Result<()> {
    let decoded = open_image(input).map_err(|source| DegradeError::Decode {
        path: input.to_path_buf(),
        source,
    })?;
    let degraded = degrade_image(&decoded, params, rng)?;
    save_gray(&degraded, output, quality)
}

/// Write a grayscale image, honoring `quality` for JPEG outputs
pub fn save_gray(image: &GrayImage, path: &Path, quality: u8) -> Result<()> {
    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));

    let write_err = |source| DegradeError::Write {
        path: path.to_path_buf(),
        source,
    };

    if is_jpeg {
        let file = std::fs::File::create(path)
            .map_err(|e| write_err(image::ImageError::IoError(e)))?;
        let mut writer = std::io::BufWriter::new(file);
        let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
        image.write_with_encoder(encoder).map_err(write_err)?;
    } else {
        image.save(path).map_err(write_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn write_uniform(path: &Path, size: u32, value: u8) {
        GrayImage::from_pixel(size, size, Luma([value])).save(path).unwrap();
    }

    #[test]
    fn test_options_default() {
        let opts = DegradeOptions::default();
        assert_eq!(opts.level, 1);
        assert_eq!(opts.seed, None);
        assert_eq!(opts.jpeg_quality, DEFAULT_JPEG_QUALITY);
        assert!(opts.extensions.iter().any(|e| e == "jpg"));
    }

    #[test]
    fn test_builder() {
        let opts = DegradeOptions::builder()
            .level(3)
            .seed(7)
            .threads(2)
            .extensions([".PNG", "jpg"])
            .jpeg_quality(80)
            .build();
        assert_eq!(opts.level, 3);
        assert_eq!(opts.seed, Some(7));
        assert_eq!(opts.threads, Some(2));
        assert_eq!(opts.extensions, vec!["PNG".to_string(), "jpg".to_string()]);
        assert_eq!(opts.jpeg_quality, 80);
    }

    #[test]
    fn test_accepts_case_insensitive() {
        let opts = DegradeOptions::builder().extensions(["jpg"]).build();
        assert!(opts.accepts(Path::new("a.jpg")));
        assert!(opts.accepts(Path::new("a.JPG")));
        assert!(!opts.accepts(Path::new("a.png")));
        assert!(!opts.accepts(Path::new("jpg")));
    }

    #[test]
    fn test_invalid_level_rejected() {
        for level in [0u8, 4, 255] {
            let result = Degrader::new(DegradeOptions::builder().level(level).build());
            assert!(matches!(result, Err(DegradeError::InvalidLevel(l)) if l == level));
        }
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let bad_quality = DegradeOptions::builder().jpeg_quality(0).build();
        assert!(matches!(
            bad_quality.validate(),
            Err(DegradeError::InvalidParameter { .. })
        ));

        let bad_threads = DegradeOptions::builder().threads(0).build();
        assert!(bad_threads.validate().is_err());

        let no_ext = DegradeOptions::builder()
            .extensions(Vec::<String>::new())
            .build();
        assert!(no_ext.validate().is_err());
    }

    #[test]
    fn test_missing_input_dir() {
        let temp = tempfile::tempdir().unwrap();
        let mut degrader = Degrader::new(DegradeOptions::builder().seed(1).build()).unwrap();
        let result = degrader.run(&temp.path().join("missing"), &temp.path().join("out"));
        assert!(matches!(result, Err(DegradeError::InputNotFound(_))));
    }

    #[test]
    fn test_collect_inputs_filters_and_sorts() {
        let temp = tempfile::tempdir().unwrap();
        write_uniform(&temp.path().join("b.png"), 48, 10);
        write_uniform(&temp.path().join("a.png"), 48, 10);
        std::fs::write(temp.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(temp.path().join("sub.png")).unwrap();

        let degrader = Degrader::new(DegradeOptions::default()).unwrap();
        let files = degrader.collect_inputs(temp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_run_creates_output_dir() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("in");
        std::fs::create_dir(&input).unwrap();
        write_uniform(&input.join("glyph.png"), 48, 200);

        let output = temp.path().join("nested/out");
        let options = DegradeOptions::builder().level(2).seed(5).build();
        let mut degrader = Degrader::new(options).unwrap();
        let report = degrader.run(&input, &output).unwrap();

        assert_eq!(report.succeeded(), 1);
        let written = image::open(output.join("glyph.png")).unwrap();
        assert_eq!((written.width(), written.height()), (48, 48));
    }

    #[test]
    fn test_small_image_reported() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("in");
        std::fs::create_dir(&input).unwrap();
        write_uniform(&input.join("tiny.png"), 16, 200);
        write_uniform(&input.join("ok.png"), 48, 200);

        let options = DegradeOptions::builder().level(3).seed(5).build();
        let mut degrader = Degrader::new(options).unwrap();
        let report = degrader.run(&input, &temp.path().join("out")).unwrap();

        assert_eq!(report.succeeded(), 1);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "tiny.png");
        assert!(matches!(failures[0].1, DegradeError::StainTooLarge { .. }));
        assert!(!temp.path().join("out/tiny.png").exists());
    }

    #[test]
    fn test_parallel_matches_itself() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("in");
        std::fs::create_dir(&input).unwrap();
        for i in 0..6 {
            write_uniform(&input.join(format!("g{i}.png")), 48, 40 * i as u8);
        }

        let run = |out: &str| {
            let opts = DegradeOptions::builder().level(2).seed(9).threads(3).build();
            let mut degrader = Degrader::new(opts).unwrap();
            let report = degrader.run(&input, &temp.path().join(out)).unwrap();
            assert_eq!(report.succeeded(), 6);
        };
        run("a");
        run("b");

        for i in 0..6 {
            let a = std::fs::read(temp.path().join(format!("a/g{i}.png"))).unwrap();
            let b = std::fs::read(temp.path().join(format!("b/g{i}.png"))).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_progress_hook_called() {
        struct Counter(AtomicUsize, AtomicUsize);
        impl DegradeProgress for Counter {
            fn on_start(&self, total: usize) {
                self.0.store(total, Ordering::SeqCst);
            }
            fn on_file(&self, _outcome: &FileOutcome) {
                self.1.fetch_add(1, Ordering::SeqCst);
            }
        }

        let temp = tempfile::tempdir().unwrap();
        write_uniform(&temp.path().join("a.png"), 48, 100);
        write_uniform(&temp.path().join("b.png"), 48, 100);

        let counter = Counter(AtomicUsize::new(0), AtomicUsize::new(0));
        let mut degrader = Degrader::new(DegradeOptions::builder().seed(1).build()).unwrap();
        degrader
            .run_with_progress(temp.path(), &temp.path().join("out"), &counter)
            .unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
        assert_eq!(counter.1.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_save_gray_jpeg() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("out.jpg");
        save_gray(&GrayImage::from_pixel(48, 48, Luma([120])), &path, 90).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (48, 48));
    }

    #[test]
    fn test_save_gray_unwritable() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("missing/out.png");
        let result = save_gray(&GrayImage::new(4, 4), &path, 90);
        assert!(matches!(result, Err(DegradeError::Write { .. })));
    }
}
