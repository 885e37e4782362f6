//! CSV dataset export and inspection
//!
//! One row per image, pixels normalized to `[0, 1]` and flattened row-major.
//! The first line is a header of column indices (`0,1,...,N-1`).

use image::GrayImage;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use super::types::{list_images, DatasetError, Result};
use crate::degrade::DEFAULT_EXTENSIONS;
use crate::preprocess::{denormalize, load_gray, normalized_pixels, resize_gray};

/// Export every image in `folder` to `csv_path`, resized to `image_size`
///
/// Returns the number of data rows written.
pub fn images_to_csv(folder: &Path, csv_path: &Path, image_size: (u32, u32)) -> Result<usize> {
    let files = list_images(folder, DEFAULT_EXTENSIONS)?;
    let columns = (image_size.0 * image_size.1) as usize;

    let file = std::fs::File::create(csv_path)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", header_line(columns))?;

    for path in &files {
        let gray = resize_gray(&load_gray(path)?, image_size);
        let line = normalized_pixels(&gray)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;

    tracing::info!(
        rows = files.len(),
        columns,
        output = %csv_path.display(),
        "exported CSV dataset"
    );
    Ok(files.len())
}

fn header_line(columns: usize) -> String {
    (0..columns)
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Read data row `index` (0-based, header excluded) as normalized values
pub fn read_csv_row(csv_path: &Path, index: usize) -> Result<Vec<f32>> {
    if !csv_path.exists() {
        return Err(DatasetError::InputNotFound(csv_path.to_path_buf()));
    }

    let reader = BufReader::new(std::fs::File::open(csv_path)?);
    let mut rows = 0usize;
    for (line_no, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if rows == index {
            return parse_row(&line, line_no + 1);
        }
        rows += 1;
    }

    Err(DatasetError::IndexOutOfRange { index, count: rows })
}

fn parse_row(line: &str, line_no: usize) -> Result<Vec<f32>> {
    line.split(',')
        .map(|field| {
            field.trim().parse::<f32>().map_err(|e| DatasetError::Csv {
                line: line_no,
                reason: format!("{field:?}: {e}"),
            })
        })
        .collect()
}

/// Rebuild an image from a normalized row
pub fn row_to_image(values: &[f32], (width, height): (u32, u32)) -> Result<GrayImage> {
    let expected = (width * height) as usize;
    if values.len() != expected {
        return Err(DatasetError::Csv {
            line: 0,
            reason: format!(
                "row has {} values, cannot reshape to {}x{}",
                values.len(),
                width,
                height
            ),
        });
    }

    let pixels = values.iter().copied().map(denormalize).collect();
    GrayImage::from_raw(width, height, pixels).ok_or(DatasetError::Csv {
        line: 0,
        reason: "pixel buffer size mismatch".to_string(),
    })
}

/// Write data row `index` of a CSV dataset as an image file
pub fn csv_row_to_image(
    csv_path: &Path,
    index: usize,
    image_size: (u32, u32),
    output: &Path,
) -> Result<()> {
    let values = read_csv_row(csv_path, index)?;
    let image = row_to_image(&values, image_size)?;
    image.save(output).map_err(|source| DatasetError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(())
}
