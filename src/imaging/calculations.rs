//! Pure statistics over 8-bit rasters.
//!
//! All functions here are pure and testable without any I/O. Moments are
//! computed from a 256-bin histogram, so the mean of a uniform image is exact
//! (a mid-gray frame has mean 128.0, not 127.99998) and classifier boundaries
//! compare against exact values.

use image::{DynamicImage, GrayImage, Luma, RgbImage};

/// 256-bin histogram of single-channel values.
#[derive(Debug, Clone)]
pub struct Histogram {
    bins: [u64; 256],
    total: u64,
}

impl Histogram {
    pub fn from_gray(image: &GrayImage) -> Self {
        let mut bins = [0u64; 256];
        for pixel in image.pixels() {
            bins[usize::from(pixel.0[0])] += 1;
        }
        let total = bins.iter().sum();
        Self { bins, total }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Arithmetic mean. Zero for an empty histogram.
    pub fn mean(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let sum: u64 = self
            .bins
            .iter()
            .enumerate()
            .map(|(i, &count)| i as u64 * count)
            .sum();
        sum as f64 / self.total as f64
    }

    /// Population standard deviation (divides by N, not N-1).
    pub fn std_dev(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .bins
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let diff = i as f64 - mean;
                diff * diff * count as f64
            })
            .sum::<f64>()
            / self.total as f64;
        variance.sqrt()
    }
}

/// Single-channel luminance rendering, using the `image` crate's weights.
pub fn luminance(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// HSV saturation of one pixel on a 0–255 scale: `255 · (max − min) / max`.
///
/// Black has no defined hue and reports zero saturation, as does any gray.
pub fn saturation(rgb: [u8; 3]) -> u8 {
    let max = u32::from(rgb[0].max(rgb[1]).max(rgb[2]));
    let min = u32::from(rgb[0].min(rgb[1]).min(rgb[2]));
    if max == 0 {
        return 0;
    }
    (((max - min) * 255 + max / 2) / max) as u8
}

/// Saturation channel of an HSV decomposition, as a single-channel image.
pub fn saturation_channel(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([saturation(image.get_pixel(x, y).0)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{solid, split_rgb};

    // =========================================================================
    // Histogram
    // =========================================================================

    #[test]
    fn histogram_counts_every_pixel() {
        let img = GrayImage::from_fn(256, 2, |x, _| Luma([x as u8]));
        let hist = Histogram::from_gray(&img);
        assert_eq!(hist.total(), 512);
        assert!(hist.bins.iter().all(|&c| c == 2));
    }

    #[test]
    fn uniform_image_has_exact_mean_and_zero_spread() {
        let img = GrayImage::from_pixel(100, 100, Luma([128]));
        let hist = Histogram::from_gray(&img);
        assert_eq!(hist.mean(), 128.0);
        assert_eq!(hist.std_dev(), 0.0);
    }

    #[test]
    fn two_level_image_std_is_half_the_gap() {
        // Half at 98, half at 158 → mean 128, every deviation is exactly 30.
        let img = GrayImage::from_fn(10, 10, |x, _| Luma([if x < 5 { 98 } else { 158 }]));
        let hist = Histogram::from_gray(&img);
        assert_eq!(hist.mean(), 128.0);
        assert_eq!(hist.std_dev(), 30.0);
    }

    #[test]
    fn std_dev_is_population_not_sample() {
        // Values {0, 255}: population σ = 127.5, sample σ would be ~180.3.
        let img = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 0 } else { 255 }]));
        assert_eq!(Histogram::from_gray(&img).std_dev(), 127.5);
    }

    #[test]
    fn empty_histogram_is_zero() {
        let hist = Histogram::from_gray(&GrayImage::new(0, 0));
        assert_eq!(hist.mean(), 0.0);
        assert_eq!(hist.std_dev(), 0.0);
    }

    // =========================================================================
    // Luminance
    // =========================================================================

    #[test]
    fn luminance_of_gray_is_identity() {
        let luma = luminance(&solid(3, 3, [70, 70, 70]));
        assert!(luma.pixels().all(|p| p.0[0] == 70));
    }

    #[test]
    fn luminance_weights_green_over_blue() {
        let green = luminance(&solid(1, 1, [0, 255, 0])).get_pixel(0, 0).0[0];
        let blue = luminance(&solid(1, 1, [0, 0, 255])).get_pixel(0, 0).0[0];
        assert!(green > blue);
    }

    // =========================================================================
    // Saturation
    // =========================================================================

    #[test]
    fn saturation_of_grays_is_zero() {
        assert_eq!(saturation([0, 0, 0]), 0);
        assert_eq!(saturation([128, 128, 128]), 0);
        assert_eq!(saturation([255, 255, 255]), 0);
    }

    #[test]
    fn saturation_of_primaries_is_full() {
        assert_eq!(saturation([255, 0, 0]), 255);
        assert_eq!(saturation([0, 10, 0]), 255);
    }

    #[test]
    fn saturation_is_relative_to_max() {
        // (200 - 100) / 200 = 0.5 → 127.5 → rounds to 128
        assert_eq!(saturation([200, 100, 150]), 128);
    }

    #[test]
    fn saturation_channel_matches_per_pixel() {
        let img = split_rgb(4, 2, [255, 0, 0], [90, 90, 90]).to_rgb8();
        let sat = saturation_channel(&img);
        assert_eq!(sat.get_pixel(0, 0).0[0], 255);
        assert_eq!(sat.get_pixel(3, 1).0[0], 0);
    }
}
