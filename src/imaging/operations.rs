//! Pixel adjustments applied by the edit pipeline.
//!
//! Each adjustment works on an 8-bit RGB raster and produces an 8-bit RGB
//! raster. Channel arithmetic is done in `f32`, rounded to nearest, and
//! clamped to `0..=255`; out-of-range factors saturate, they never wrap.

use super::calculations::{Histogram, luminance};
use image::{DynamicImage, Rgb, RgbImage};

/// Scale a channel value and clamp it back into `u8` range.
#[inline]
fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Multiply every channel by `factor` (1.0 = unchanged, 0.0 = black).
pub fn adjust_brightness(image: &mut RgbImage, factor: f32) {
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = clamp_channel(f32::from(*channel) * factor);
        }
    }
}

/// Linear contrast around the image's mean luminance.
///
/// Each channel moves away from (factor > 1) or toward (factor < 1) the
/// rounded mean luminance: `c' = m + factor · (c − m)`. A factor of 0.0
/// yields a flat frame at the mean.
pub fn adjust_contrast(image: &mut RgbImage, factor: f32) {
    let pivot = contrast_pivot(image);
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = clamp_channel(pivot + factor * (f32::from(*channel) - pivot));
        }
    }
}

/// Rounded mean luminance of `image`, the fixed point of [`adjust_contrast`].
pub fn contrast_pivot(image: &RgbImage) -> f32 {
    let luma = luminance(&DynamicImage::ImageRgb8(image.clone()));
    Histogram::from_gray(&luma).mean().round() as f32
}

/// Collapse to luminance, then re-expand so all three channels are equal.
///
/// The result keeps three channels so grayscale output has the same layout
/// as every other edit.
pub fn to_grayscale(image: &RgbImage) -> RgbImage {
    let luma = luminance(&DynamicImage::ImageRgb8(image.clone()));
    RgbImage::from_fn(luma.width(), luma.height(), |x, y| {
        let v = luma.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}
