//! glyph-restore - character image degradation and dataset tooling
//!
//! CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glyph_restore::{
    dataset, exit_codes, progress, BatchProgress, Cli, Commands, Config, CsvViewArgs,
    DatasetError, DegradeArgs, DegradeError, Degrader, OutputMode, SplitArgs, SplitOptions,
    ToCsvArgs,
};

fn main() {
    let cli = Cli::parse();

    let log_level = match &cli.command {
        Commands::Degrade(args) if args.quiet => "error",
        Commands::Degrade(args) if args.verbose > 0 => "debug",
        _ => "info",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("glyph_restore={log_level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = match cli.command {
        Commands::Degrade(args) => run_degrade(&args),
        Commands::Split(args) => run_split(&args).map(|()| exit_codes::SUCCESS),
        Commands::ToCsv(args) => run_to_csv(&args).map(|()| exit_codes::SUCCESS),
        Commands::CsvView(args) => run_csv_view(&args).map(|()| exit_codes::SUCCESS),
        Commands::Pack(args) => {
            dataset::pack_binary(&args.folder, &args.output)
                .map(|count| {
                    println!("Packed {} images into {}", count, args.output.display());
                    exit_codes::SUCCESS
                })
                .map_err(anyhow::Error::from)
        }
        Commands::Unpack(args) => {
            dataset::unpack_binary(&args.input, &args.output, &args.prefix)
                .map(|count| {
                    println!("Wrote {} images to {}", count, args.output.display());
                    exit_codes::SUCCESS
                })
                .map_err(anyhow::Error::from)
        }
        Commands::BinaryView(args) => {
            dataset::binary_image(&args.input, args.index, &args.output)
                .map(|(w, h)| {
                    println!(
                        "Image {} ({}x{}) written to {}",
                        args.index,
                        w,
                        h,
                        args.output.display()
                    );
                    exit_codes::SUCCESS
                })
                .map_err(anyhow::Error::from)
        }
        Commands::Info => run_info().map(|()| exit_codes::SUCCESS),
    };

    std::process::exit(match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            exit_code_for(&e)
        }
    });
}

/// Map an error chain to a process exit code
fn exit_code_for(error: &anyhow::Error) -> i32 {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<DegradeError>() {
            return match e {
                DegradeError::InvalidLevel(_) | DegradeError::InvalidParameter { .. } => {
                    exit_codes::INVALID_ARGS
                }
                DegradeError::InputNotFound(_) => exit_codes::INPUT_NOT_FOUND,
                _ => exit_codes::GENERAL_ERROR,
            };
        }
        if let Some(DatasetError::InputNotFound(_)) = cause.downcast_ref::<DatasetError>() {
            return exit_codes::INPUT_NOT_FOUND;
        }
    }
    exit_codes::GENERAL_ERROR
}

/// Load the config from `--config`, falling back to the search path
fn load_config(path: Option<&Path>) -> Config {
    let loaded = match path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    loaded.unwrap_or_else(|e| {
        tracing::warn!("Failed to load config file: {e}");
        Config::default()
    })
}

// ============ Degrade Command ============

fn run_degrade(args: &DegradeArgs) -> Result<i32> {
    let config = load_config(args.config.as_deref());
    let options = config.merge_with_cli(&args.overrides());
    let mode = OutputMode::from_flags(args.quiet, args.verbose);

    // Level and parameters are validated before any file is touched
    let mut degrader = Degrader::new(options).context("Invalid degradation settings")?;

    let progress = BatchProgress::new(mode);
    let report = degrader
        .run_with_progress(&args.input, &args.output, &progress)
        .with_context(|| format!("Failed to degrade {}", args.input.display()))?;
    progress.finish();

    progress::print_summary(&report, mode);

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report.to_json())?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    if report.failed() > 0 {
        return Ok(exit_codes::PARTIAL_FAILURE);
    }
    Ok(exit_codes::SUCCESS)
}

// ============ Dataset Commands ============

fn run_split(args: &SplitArgs) -> Result<()> {
    let config = load_config(args.config.as_deref());
    let options = SplitOptions {
        per_folder: args.per_folder.unwrap_or(config.dataset.per_folder),
        seed: args.seed.unwrap_or(config.dataset.split_seed),
    };

    let report = dataset::split_dataset(&args.source, &args.dest, &options)
        .with_context(|| format!("Failed to split {}", args.source.display()))?;

    for (folder, count) in report.folders.iter().zip(report.written) {
        println!("  {}: {} images", folder.display(), count);
    }
    for (file, error) in &report.failures {
        eprintln!("  Error processing {}: {}", file, error);
    }
    println!("Split {} images into {}", report.total_written(), args.dest.display());
    Ok(())
}

fn run_to_csv(args: &ToCsvArgs) -> Result<()> {
    let config = load_config(args.config.as_deref());
    let size = args.size.unwrap_or(config.dataset.image_size);

    let rows = dataset::images_to_csv(&args.folder, &args.csv, (size, size))
        .with_context(|| format!("Failed to export {}", args.folder.display()))?;
    println!("Wrote {} rows ({}x{}) to {}", rows, size, size, args.csv.display());
    Ok(())
}

fn run_csv_view(args: &CsvViewArgs) -> Result<()> {
    let config = load_config(args.config.as_deref());
    let size = args.size.unwrap_or(config.dataset.image_size);

    dataset::csv_row_to_image(&args.csv, args.index, (size, size), &args.output)
        .with_context(|| format!("Failed to view row {} of {}", args.index, args.csv.display()))?;
    println!("Row {} written to {}", args.index, args.output.display());
    Ok(())
}

// ============ Info Command ============

fn run_info() -> Result<()> {
    println!("glyph-restore v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("System Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!("  CPUs: {}", num_cpus::get());

    println!();
    println!("Degradation Levels:");
    for level in glyph_restore::DegradationLevel::all() {
        let p = level.params();
        println!(
            "  {}: crack={:.2} fade={:.2} stain={:.2} stain_size={}",
            level, p.crack_intensity, p.fade_amount, p.stain_intensity, p.stain_size
        );
    }

    println!();
    println!("Config File Locations:");
    for path in Config::search_paths() {
        let status = if path.is_file() { "found" } else { "not found" };
        println!("  {} ({})", path.display(), status);
    }

    let config = load_config(None);
    println!();
    println!("Effective Config:");
    println!("  {}", config.to_json());

    Ok(())
}
