//! Inference preprocessing
//!
//! Prepares a character image for the restoration model: grayscale, resize
//! to the model input size, normalize to `[0, 1]` and lay out as an NHWC
//! tensor of shape `(1, height, width, 1)`. The same normalization backs the
//! CSV export in [`crate::dataset`].

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageReader, ImageResult};
use ndarray::Array4;
use std::path::Path;

use crate::dataset::{DatasetError, Result};

/// Model input tensor in NHWC layout
pub type InputTensor = Array4<f32>;

/// Decode an image, detecting the format from its contents
///
/// The file extension is only a fallback when the leading bytes match no
/// known format.
pub fn open_image(path: &Path) -> ImageResult<DynamicImage> {
    ImageReader::open(path)?.with_guessed_format()?.decode()
}

/// Open an image and collapse it to 8-bit grayscale
pub fn load_gray(path: &Path) -> Result<GrayImage> {
    if !path.exists() {
        return Err(DatasetError::InputNotFound(path.to_path_buf()));
    }

    let img = open_image(path).map_err(|source| DatasetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_luma8())
}

/// Resize to `(width, height)`; images already at that size are returned as-is
pub fn resize_gray(image: &GrayImage, (width, height): (u32, u32)) -> GrayImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    DynamicImage::ImageLuma8(image.clone())
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_luma8()
}

/// Row-major pixels scaled to `[0, 1]`
pub fn normalized_pixels(image: &GrayImage) -> Vec<f32> {
    image.pixels().map(|p| f32::from(p.0[0]) / 255.0).collect()
}

/// Normalized image as a `(1, height, width, 1)` tensor
pub fn to_tensor(image: &GrayImage) -> InputTensor {
    let (width, height) = image.dimensions();
    Array4::from_shape_fn((1, height as usize, width as usize, 1), |(_, y, x, _)| {
        f32::from(image.get_pixel(x as u32, y as u32).0[0]) / 255.0
    })
}

/// Load, grayscale, resize and normalize one image for inference
pub fn load_and_preprocess(path: &Path, target_size: (u32, u32)) -> Result<InputTensor> {
    let gray = load_gray(path)?;
    let resized = resize_gray(&gray, target_size);
    tracing::debug!(
        path = %path.display(),
        from = ?gray.dimensions(),
        to = ?target_size,
        "preprocessed for inference"
    );
    Ok(to_tensor(&resized))
}

/// Map a `[0, 1]` value back to 8-bit
#[inline]
pub fn denormalize(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_load_gray_ignores_misleading_extension() {
        let temp = tempfile::tempdir().unwrap();
        let png = temp.path().join("glyph.png");
        GrayImage::from_pixel(12, 9, Luma([140])).save(&png).unwrap();
        let renamed = temp.path().join("glyph.jpg");
        std::fs::rename(&png, &renamed).unwrap();

        let gray = load_gray(&renamed).unwrap();
        assert_eq!(gray.dimensions(), (12, 9));
        assert!(gray.pixels().all(|p| p.0[0] == 140));
    }

    #[test]
    fn test_load_gray_garbage_is_decode_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("noise.png");
        std::fs::write(&path, b"definitely not pixels").unwrap();
        assert!(matches!(load_gray(&path), Err(DatasetError::Decode { .. })));
    }

    #[test]
    fn test_tensor_shape() {
        let img = GrayImage::new(48, 32);
        let tensor = to_tensor(&img);
        assert_eq!(tensor.shape(), &[1, 32, 48, 1]);
    }

    #[test]
    fn test_tensor_layout_row_major() {
        let mut img = GrayImage::new(3, 2);
        img.put_pixel(2, 1, Luma([255]));
        let tensor = to_tensor(&img);
        assert_eq!(tensor[[0, 1, 2, 0]], 1.0);
        assert_eq!(tensor[[0, 0, 2, 0]], 0.0);
    }

    #[test]
    fn test_normalized_pixels_range() {
        let img = GrayImage::from_fn(16, 16, |x, y| Luma([((x + y) * 8) as u8]));
        let pixels = normalized_pixels(&img);
        assert_eq!(pixels.len(), 256);
        assert!(pixels.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(pixels[0], 0.0);
    }

    #[test]
    fn test_denormalize() {
        assert_eq!(denormalize(0.0), 0);
        assert_eq!(denormalize(1.0), 255);
        assert_eq!(denormalize(-0.5), 0);
        assert_eq!(denormalize(2.0), 255);
        for v in [0u8, 1, 127, 200, 255] {
            assert_eq!(denormalize(f32::from(v) / 255.0), v);
        }
    }

    #[test]
    fn test_resize_same_size_is_identity() {
        let img = GrayImage::from_fn(48, 48, |x, _| Luma([x as u8]));
        assert_eq!(resize_gray(&img, (48, 48)), img);
    }

    #[test]
    fn test_load_and_preprocess_resizes() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("big.png");
        image::RgbImage::from_pixel(96, 64, image::Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();

        let tensor = load_and_preprocess(&path, (48, 48)).unwrap();
        assert_eq!(tensor.shape(), &[1, 48, 48, 1]);
        assert!(tensor.iter().all(|&v| (v - 1.0).abs() < 0.01));
    }

    #[test]
    fn test_load_missing() {
        let result = load_gray(Path::new("/nonexistent/glyph.png"));
        assert!(matches!(result, Err(DatasetError::InputNotFound(_))));
    }

    #[test]
    fn test_load_corrupt() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("empty.jpg");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(load_gray(&path), Err(DatasetError::Decode { .. })));
    }
}
