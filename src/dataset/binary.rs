//! Binary dump format
//!
//! Training sets are shipped as a single file:
//!
//! ```text
//! offset 0   u32 BE  width
//! offset 4   u32 BE  height
//! offset 8   u32 BE  count
//! offset 12  u8[count * height * width]  samples, row-major, image after image
//! ```

use image::GrayImage;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::types::{file_name_of, list_images, DatasetError, Result, BINARY_HEADER_LEN};
use crate::degrade::DEFAULT_EXTENSIONS;
use crate::preprocess::load_gray;

/// Decoded binary dump
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryDataset {
    pub width: u32,
    pub height: u32,
    pub images: Vec<GrayImage>,
}

impl BinaryDataset {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Image at `index`
    pub fn get(&self, index: usize) -> Result<&GrayImage> {
        self.images.get(index).ok_or(DatasetError::IndexOutOfRange {
            index,
            count: self.images.len(),
        })
    }

    /// Serialize header and samples
    pub fn to_bytes(&self) -> Vec<u8> {
        let sample_len = (self.width * self.height) as usize;
        let mut bytes = Vec::with_capacity(BINARY_HEADER_LEN + sample_len * self.images.len());
        bytes.extend_from_slice(&self.width.to_be_bytes());
        bytes.extend_from_slice(&self.height.to_be_bytes());
        bytes.extend_from_slice(&(self.images.len() as u32).to_be_bytes());
        for image in &self.images {
            bytes.extend_from_slice(image.as_raw());
        }
        bytes
    }

    /// Parse a dump; the payload must match the header exactly
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < BINARY_HEADER_LEN {
            return Err(DatasetError::PayloadSize {
                expected: BINARY_HEADER_LEN as u64,
                actual: bytes.len() as u64,
            });
        }

        let word = |i: usize| {
            u32::from_be_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
        };
        let (width, height, count) = (word(0), word(4), word(8));

        if count > 0 && (width == 0 || height == 0) {
            return Err(DatasetError::EmptyDimensions {
                width,
                height,
                count,
            });
        }

        let sample_len = u64::from(width) * u64::from(height);
        let expected = sample_len.saturating_mul(u64::from(count));
        let payload = &bytes[BINARY_HEADER_LEN..];
        if payload.len() as u64 != expected {
            return Err(DatasetError::PayloadSize {
                expected,
                actual: payload.len() as u64,
            });
        }

        let images = if count == 0 {
            Vec::new()
        } else {
            payload
                .chunks_exact(sample_len as usize)
                .map(|chunk| GrayImage::from_raw(width, height, chunk.to_vec()))
                .collect::<Option<Vec<_>>>()
                .ok_or(DatasetError::PayloadSize {
                    expected,
                    actual: payload.len() as u64,
                })?
        };

        Ok(Self {
            width,
            height,
            images,
        })
    }
}

/// Read a binary dump from disk
pub fn load_binary(path: &Path) -> Result<BinaryDataset> {
    if !path.exists() {
        return Err(DatasetError::InputNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    let dataset = BinaryDataset::from_bytes(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        width = dataset.width,
        height = dataset.height,
        count = dataset.len(),
        "loaded binary dump"
    );
    Ok(dataset)
}

/// Pack every image in `folder` into a binary dump at `output`
///
/// All images must share the dimensions of the first one. Every image is
/// decoded and checked before `output` is created. Returns the number of
/// images written.
pub fn pack_binary(folder: &Path, output: &Path) -> Result<usize> {
    let files = list_images(folder, DEFAULT_EXTENSIONS)?;
    let Some(first) = files.first() else {
        return Err(DatasetError::NoImages(folder.to_path_buf()));
    };

    let first_image = load_gray(first)?;
    let (width, height) = first_image.dimensions();

    let mut images = Vec::with_capacity(files.len());
    images.push(first_image);
    for path in &files[1..] {
        let image = load_gray(path)?;
        if image.dimensions() != (width, height) {
            return Err(DatasetError::DimensionMismatch {
                path: path.clone(),
                expected: (width, height),
                actual: image.dimensions(),
            });
        }
        images.push(image);
    }

    let dataset = BinaryDataset {
        width,
        height,
        images,
    };
    let mut writer = BufWriter::new(std::fs::File::create(output)?);
    writer.write_all(&dataset.to_bytes())?;
    writer.flush()?;

    tracing::info!(
        images = dataset.len(),
        width,
        height,
        output = %output.display(),
        "packed binary dump"
    );
    Ok(dataset.len())
}

/// Write every image of a dump as `<prefix>_<i>.jpg` in `output_dir`
pub fn unpack_binary(path: &Path, output_dir: &Path, prefix: &str) -> Result<usize> {
    let dataset = load_binary(path)?;
    std::fs::create_dir_all(output_dir)?;

    for (i, image) in dataset.images.iter().enumerate() {
        let out = output_dir.join(format!("{prefix}_{i}.jpg"));
        image.save(&out).map_err(|source| DatasetError::Write {
            path: out.clone(),
            source,
        })?;
        tracing::debug!(file = %file_name_of(&out), "unpacked");
    }

    Ok(dataset.len())
}

/// Extract the image at `index` from a dump and write it to `output`
pub fn binary_image(path: &Path, index: usize, output: &Path) -> Result<(u32, u32)> {
    let dataset = load_binary(path)?;
    let image = dataset.get(index)?;
    image.save(output).map_err(|source| DatasetError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(image.dimensions())
}
