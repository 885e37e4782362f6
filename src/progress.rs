//! Progress display for batch runs.
//!
//! A degradation run reports each finished file through [`BatchProgress`],
//! which drives an `indicatif` bar, and ends with a summary of successes and
//! per-file failures.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::degrade::{BatchReport, DegradeProgress, FileOutcome};

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// No output
    Quiet,
    /// Progress bar and summary
    #[default]
    Normal,
    /// Also one line per file
    Verbose,
    /// Also the output path of every written file
    VeryVerbose,
}

impl OutputMode {
    /// Create OutputMode from verbosity level
    pub fn from_verbosity(level: u8) -> Self {
        match level {
            0 => OutputMode::Normal,
            1 => OutputMode::Verbose,
            _ => OutputMode::VeryVerbose,
        }
    }

    /// Create OutputMode from the `-q` / `-v` flags
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            OutputMode::Quiet
        } else {
            Self::from_verbosity(verbose)
        }
    }

    /// Check if output should be shown at this mode
    pub fn should_show(&self, required: OutputMode) -> bool {
        use OutputMode::*;
        match (self, required) {
            (Quiet, _) => false,
            (Normal, Quiet | Normal) => true,
            (Verbose, Quiet | Normal | Verbose) => true,
            (VeryVerbose, _) => true,
            _ => false,
        }
    }
}

/// Summary separator width
const SUMMARY_WIDTH: usize = 60;

/// Progress reporter for a degradation run
pub struct BatchProgress {
    mode: OutputMode,
    bar: ProgressBar,
    done: AtomicUsize,
    failed: AtomicUsize,
}

impl BatchProgress {
    pub fn new(mode: OutputMode) -> Self {
        let bar = if mode.should_show(OutputMode::Normal) {
            let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} Degrading [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            mode,
            bar,
            done: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Files reported so far
    pub fn done(&self) -> usize {
        self.done.load(Ordering::SeqCst)
    }

    /// Failed files reported so far
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn describe(&self, outcome: &FileOutcome) -> Option<String> {
        match outcome {
            FileOutcome::Failed { file_name, error } => {
                Some(format!("  FAILED {}: {}", file_name, error))
            }
            FileOutcome::Degraded { file_name, output }
                if self.mode.should_show(OutputMode::VeryVerbose) =>
            {
                Some(format!("  ok     {} -> {}", file_name, output.display()))
            }
            FileOutcome::Degraded { file_name, .. }
                if self.mode.should_show(OutputMode::Verbose) =>
            {
                Some(format!("  ok     {}", file_name))
            }
            FileOutcome::Degraded { .. } => None,
        }
    }
}

impl DegradeProgress for BatchProgress {
    fn on_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_file(&self, outcome: &FileOutcome) {
        self.done.fetch_add(1, Ordering::SeqCst);
        if !outcome.is_success() {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }

        if self.mode.should_show(OutputMode::Verbose) {
            if let Some(line) = self.describe(outcome) {
                self.bar.println(line);
            }
        }
        self.bar.set_message(outcome.file_name().to_string());
        self.bar.inc(1);
    }
}

/// Render the end-of-run summary
pub fn format_summary(report: &BatchReport) -> String {
    let rule = "=".repeat(SUMMARY_WIDTH);
    let mut lines = vec![
        rule.clone(),
        format!("Degradation Summary (level {})", report.level),
        rule.clone(),
        format!("  Total files:  {}", report.total()),
        format!("  Succeeded:    {}", report.succeeded()),
        format!("  Failed:       {}", report.failed()),
        format!("  Elapsed:      {:.2}s", report.elapsed.as_secs_f64()),
    ];

    if report.failed() > 0 {
        lines.push(String::new());
        lines.push("Failures:".to_string());
        for (file, error) in report.failures() {
            lines.push(format!("  {}: {}", file, error));
        }
    }
    lines.push(rule);
    lines.join("\n")
}

/// Print the summary unless quiet
pub fn print_summary(report: &BatchReport, mode: OutputMode) {
    if mode.should_show(OutputMode::Normal) {
        println!();
        println!("{}", format_summary(report));
    }
}
