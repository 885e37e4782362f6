//! Degradation effects
//!
//! The three corruption effects applied to every image:
//!
//! 1. Fade - uniform brightness reduction
//! 2. Cracks - random line segments plus salt noise, blended additively
//! 3. Stains - uniform square patches alpha-blended over the image
//!
//! All pixel arithmetic is done in `f64`, rounded half away from zero and
//! clamped to `[0, 255]`.

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::drawing::BresenhamLineIter;
use rand::Rng;

use super::types::{
    DegradationParams, DegradeError, Result, StainPatch, CRACK_BLEND_WEIGHT, CRACK_THICKNESS_MAX,
    CRACK_THICKNESS_MIN, MAX_STAINS, STAIN_VALUE_MAX, STAIN_VALUE_MIN,
};

/// Float canvas holding crack overlay values
pub type CrackMask = ImageBuffer<Luma<f32>, Vec<f32>>;

#[inline]
fn to_u8(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

// ============================================================
// Grayscale
// ============================================================

/// Collapse any decoded image to 8-bit single channel
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => other.to_luma8(),
    }
}

// ============================================================
// Fade
// ============================================================

/// Scale every pixel by `1 - fade_amount`
pub fn fade(image: &GrayImage, fade_amount: f64) -> GrayImage {
    let alpha = 1.0 - fade_amount;
    let mut faded = image.clone();
    for pixel in faded.pixels_mut() {
        pixel.0[0] = to_u8((f64::from(pixel.0[0]) * alpha).abs());
    }
    faded
}

// ============================================================
// Cracks
// ============================================================

/// Number of crack lines drawn for an intensity
pub fn crack_count(crack_intensity: f64) -> u32 {
    (10.0 * crack_intensity).round().max(0.0) as u32
}

/// Build a crack canvas with values in `{0.0, 1.0}`
pub fn crack_mask<R: Rng>(
    width: u32,
    height: u32,
    crack_intensity: f64,
    rng: &mut R,
) -> CrackMask {
    let mut mask = CrackMask::new(width, height);
    if width == 0 || height == 0 {
        return mask;
    }

    for _ in 0..crack_count(crack_intensity) {
        let start = (rng.random_range(0..width), rng.random_range(0..height));
        let end = (rng.random_range(0..width), rng.random_range(0..height));
        let thickness = rng.random_range(CRACK_THICKNESS_MIN..=CRACK_THICKNESS_MAX);
        draw_thick_line(&mut mask, start, end, thickness);
    }

    let salt_probability = (crack_intensity / 10.0).clamp(0.0, 1.0);
    if salt_probability > 0.0 {
        for pixel in mask.pixels_mut() {
            if rng.random_bool(salt_probability) {
                pixel.0[0] = 1.0;
            }
        }
    }

    mask
}

/// Draw a line of `thickness` pixels using a square brush along the Bresenham path
fn draw_thick_line(mask: &mut CrackMask, start: (u32, u32), end: (u32, u32), thickness: u32) {
    let (width, height) = (mask.width() as i32, mask.height() as i32);
    let thickness = thickness.max(1) as i32;
    let lo = -(thickness - 1) / 2;
    let hi = thickness / 2;

    let line = BresenhamLineIter::new(
        (start.0 as f32, start.1 as f32),
        (end.0 as f32, end.1 as f32),
    );
    for (cx, cy) in line {
        for dy in lo..=hi {
            for dx in lo..=hi {
                let (x, y) = (cx + dx, cy + dy);
                if x >= 0 && y >= 0 && x < width && y < height {
                    mask.put_pixel(x as u32, y as u32, Luma([1.0]));
                }
            }
        }
    }
}

/// Add the crack canvas onto the image with weight 0.5, saturating at 255
///
/// A canvas whose maximum is at most 1.0 is treated as normalized and scaled to 0-255 first.
pub fn blend_cracks(image: &GrayImage, mask: &CrackMask) -> GrayImage {
    let max = mask.pixels().map(|p| p.0[0]).fold(0.0f32, f32::max);
    let scale = if max <= 1.0 { 255.0 } else { 1.0 };

    let mut blended = image.clone();
    for (pixel, overlay) in blended.pixels_mut().zip(mask.pixels()) {
        let crack = f64::from(overlay.0[0]) * scale;
        pixel.0[0] = to_u8(f64::from(pixel.0[0]) + crack * CRACK_BLEND_WEIGHT);
    }
    blended
}

/// Generate a crack canvas for the image and blend it in
pub fn apply_cracks<R: Rng>(
    image: &GrayImage,
    crack_intensity: f64,
    rng: &mut R,
) -> GrayImage {
    let mask = crack_mask(image.width(), image.height(), crack_intensity, rng);
    blend_cracks(image, &mask)
}

// ============================================================
// Stains
// ============================================================

/// Fail when a `stain_size` square cannot fit in the image
pub fn check_stain_fits(image: &GrayImage, stain_size: u32) -> Result<()> {
    let (width, height) = image.dimensions();
    if stain_size > width || stain_size > height {
        return Err(DegradeError::StainTooLarge {
            width,
            height,
            stain_size,
        });
    }
    Ok(())
}

/// Choose a position and fill value for one stain that fits inside the image
pub fn stain_patch<R: Rng>(
    width: u32,
    height: u32,
    stain_size: u32,
    rng: &mut R,
) -> Result<StainPatch> {
    if stain_size > width || stain_size > height {
        return Err(DegradeError::StainTooLarge {
            width,
            height,
            stain_size,
        });
    }

    Ok(StainPatch {
        x: rng.random_range(0..=width - stain_size),
        y: rng.random_range(0..=height - stain_size),
        size: stain_size,
        value: rng.random_range(STAIN_VALUE_MIN..=STAIN_VALUE_MAX),
    })
}

/// Alpha-blend a stain patch over its region
pub fn blend_stain(image: &mut GrayImage, patch: &StainPatch, stain_intensity: f64) {
    let right = patch.right().min(image.width());
    let bottom = patch.bottom().min(image.height());
    let stain = f64::from(patch.value) * stain_intensity;
    let keep = 1.0 - stain_intensity;

    for y in patch.y..bottom {
        for x in patch.x..right {
            let pixel = image.get_pixel_mut(x, y);
            pixel.0[0] = to_u8(f64::from(pixel.0[0]) * keep + stain);
        }
    }
}

/// Place between one and five stains; returns the patches used
pub fn apply_stains<R: Rng>(
    image: &mut GrayImage,
    stain_intensity: f64,
    stain_size: u32,
    rng: &mut R,
) -> Result<Vec<StainPatch>> {
    check_stain_fits(image, stain_size)?;

    let count = rng.random_range(1..=MAX_STAINS);
    let mut patches = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let patch = stain_patch(image.width(), image.height(), stain_size, rng)?;
        blend_stain(image, &patch, stain_intensity);
        patches.push(patch);
    }
    Ok(patches)
}

// ============================================================
// Full pipeline
// ============================================================

/// Grayscale, fade, crack and stain one decoded image
pub fn degrade_image<R: Rng>(
    image: &DynamicImage,
    params: &DegradationParams,
    rng: &mut R,
) -> Result<GrayImage> {
    let gray = to_grayscale(image);
    check_stain_fits(&gray, params.stain_size)?;

    let faded = fade(&gray, params.fade_amount);
    let mut degraded = apply_cracks(&faded, params.crack_intensity, rng);
    apply_stains(
        &mut degraded,
        params.stain_intensity,
        params.stain_size,
        rng,
    )?;

    Ok(degraded)
}
