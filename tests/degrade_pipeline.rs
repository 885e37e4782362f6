//! End-to-end tests for folder degradation and the dataset tools

use glyph_restore::dataset::{self, load_binary, pack_binary, split_dataset, SplitOptions};
use glyph_restore::{DegradeError, DegradeOptions, Degrader};
use image::{GrayImage, Luma};
use std::path::Path;

fn write_uniform(path: &Path, size: u32, value: u8) {
    GrayImage::from_pixel(size, size, Luma([value]))
        .save(path)
        .unwrap();
}

fn seeded(level: u8, seed: u64) -> Degrader {
    Degrader::new(DegradeOptions::builder().level(level).seed(seed).build()).unwrap()
}

#[test]
fn test_seeded_runs_are_identical() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("clean");
    std::fs::create_dir(&input).unwrap();
    write_uniform(&input.join("glyph.png"), 48, 200);

    let first = temp.path().join("first");
    let second = temp.path().join("second");
    seeded(1, 7).run(&input, &first).unwrap();
    seeded(1, 7).run(&input, &second).unwrap();

    let a = std::fs::read(first.join("glyph.png")).unwrap();
    let b = std::fs::read(second.join("glyph.png")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_seeded_parallel_matches_itself() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("clean");
    std::fs::create_dir(&input).unwrap();
    for i in 0..6 {
        write_uniform(&input.join(format!("g{i}.png")), 32, 180 + i as u8);
    }

    let options = || {
        DegradeOptions::builder()
            .level(2)
            .seed(11)
            .threads(3)
            .build()
    };
    let first = temp.path().join("first");
    let second = temp.path().join("second");
    Degrader::new(options()).unwrap().run(&input, &first).unwrap();
    Degrader::new(options()).unwrap().run(&input, &second).unwrap();

    for i in 0..6 {
        let name = format!("g{i}.png");
        assert_eq!(
            std::fs::read(first.join(&name)).unwrap(),
            std::fs::read(second.join(&name)).unwrap()
        );
    }
}

#[test]
fn test_corrupt_file_is_skipped() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("clean");
    let output = temp.path().join("out");
    std::fs::create_dir(&input).unwrap();
    std::fs::write(input.join("broken.jpg"), b"").unwrap();
    write_uniform(&input.join("ok.png"), 48, 220);

    let report = seeded(2, 3).run(&input, &output).unwrap();
    assert_eq!(report.total(), 2);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures[0].0, "broken.jpg");
    assert!(matches!(failures[0].1, DegradeError::Decode { .. }));

    assert!(!output.join("broken.jpg").exists());
    let written = image::open(output.join("ok.png")).unwrap();
    assert_eq!((written.width(), written.height()), (48, 48));
}

#[test]
fn test_invalid_level_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("clean");
    let output = temp.path().join("out");
    std::fs::create_dir(&input).unwrap();
    write_uniform(&input.join("a.png"), 48, 200);

    let result = Degrader::new(DegradeOptions::builder().level(4).build());
    assert!(matches!(result, Err(DegradeError::InvalidLevel(4))));
    assert!(!output.exists());
}

#[test]
fn test_dimensions_preserved_at_every_level() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("clean");
    std::fs::create_dir(&input).unwrap();
    GrayImage::from_pixel(64, 40, Luma([230]))
        .save(input.join("wide.png"))
        .unwrap();

    for level in 1..=3u8 {
        let output = temp.path().join(format!("level_{level}"));
        let report = seeded(level, 99).run(&input, &output).unwrap();
        assert_eq!(report.failed(), 0, "level {level}");

        let written = image::open(output.join("wide.png")).unwrap().to_luma8();
        assert_eq!(written.dimensions(), (64, 40));
    }
}

#[test]
fn test_stain_too_large_is_reported_per_file() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("clean");
    let output = temp.path().join("out");
    std::fs::create_dir(&input).unwrap();
    // Level 3 stains are 30 pixels wide
    write_uniform(&input.join("tiny.png"), 10, 200);
    write_uniform(&input.join("normal.png"), 48, 200);

    let report = seeded(3, 1).run(&input, &output).unwrap();
    assert_eq!(report.succeeded(), 1);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "tiny.png");
    assert!(matches!(failures[0].1, DegradeError::StainTooLarge { .. }));
}

#[test]
fn test_missing_input_folder() {
    let temp = tempfile::tempdir().unwrap();
    let result = seeded(1, 0).run(&temp.path().join("nope"), &temp.path().join("out"));
    assert!(matches!(result, Err(DegradeError::InputNotFound(_))));
}

#[test]
fn test_split_then_degrade_then_pack() {
    let temp = tempfile::tempdir().unwrap();
    let corpus = temp.path().join("corpus");
    std::fs::create_dir(&corpus).unwrap();
    for i in 0..6 {
        write_uniform(&corpus.join(format!("c{i}.png")), 48, 210);
    }

    let sets = temp.path().join("sets");
    let split = split_dataset(
        &corpus,
        &sets,
        &SplitOptions {
            per_folder: 2,
            seed: 0,
        },
    )
    .unwrap();
    assert_eq!(split.written, [2, 2, 2]);

    let degraded = temp.path().join("degraded_1");
    let report = seeded(1, 5).run(&sets.join("set_1"), &degraded).unwrap();
    assert_eq!(report.succeeded(), 2);

    let dump = temp.path().join("train_data");
    assert_eq!(pack_binary(&degraded, &dump).unwrap(), 2);
    let loaded = load_binary(&dump).unwrap();
    assert_eq!((loaded.width, loaded.height, loaded.len()), (48, 48, 2));

    let csv = temp.path().join("set_1.csv");
    assert_eq!(dataset::images_to_csv(&degraded, &csv, (48, 48)).unwrap(), 2);
}

#[test]
fn test_format_detected_from_contents() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("clean");
    let output = temp.path().join("out");
    std::fs::create_dir(&input).unwrap();
    write_uniform(&input.join("glyph.png"), 48, 200);
    std::fs::rename(input.join("glyph.png"), input.join("glyph.jpg")).unwrap();

    let report = seeded(1, 2).run(&input, &output).unwrap();
    assert_eq!(report.failed(), 0);
    assert_eq!(report.succeeded(), 1);

    let written = image::open(output.join("glyph.jpg")).unwrap();
    assert_eq!((written.width(), written.height()), (48, 48));
}
