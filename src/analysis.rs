//! Analysis Engine: heuristic quality recommendations.
//!
//! Three independent metrics are computed from one decoded image and each is
//! passed through a three-band classifier:
//!
//! | Metric | Value | Below `low` | Above `high` |
//! |---|---|---|---|
//! | Brightness | mean luminance | underexposed | overexposed |
//! | Contrast | σ of luminance | lacks contrast | good contrast |
//! | Vibrancy | σ of HSV saturation | lacks vibrancy | good vibrancy |
//!
//! Bounds are inclusive of "balanced": with the default brightness band a
//! mean of exactly 70 or exactly 180 is balanced. The "above" messages for
//! contrast and vibrancy are compliments, not corrections.
//!
//! Analysis is read-only: it resolves through the [`ImageStore`] and never
//! writes anything back.

use crate::config::{AnalysisConfig, BandConfig};
use crate::error::Result;
use crate::imaging::{self, Histogram};
use crate::store::ImageStore;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// The quantities the engine measures, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Brightness,
    Contrast,
    Vibrancy,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Brightness, Metric::Contrast, Metric::Vibrancy];

    /// Recommendation text for a classified value.
    pub fn recommendation(self, level: Level) -> &'static str {
        match (self, level) {
            (_, Level::Balanced) => "balanced",
            (Metric::Brightness, Level::Low) => "underexposed, consider increasing brightness",
            (Metric::Brightness, Level::High) => "overexposed, consider decreasing brightness",
            (Metric::Contrast, Level::Low) => "lacks contrast, consider increasing",
            (Metric::Contrast, Level::High) => "good contrast",
            (Metric::Vibrancy, Level::Low) => "lacks vibrancy, consider increasing saturation",
            (Metric::Vibrancy, Level::High) => "good vibrancy",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Brightness => "brightness",
            Metric::Contrast => "contrast",
            Metric::Vibrancy => "vibrancy",
        })
    }
}

/// Which side of a band a value falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Balanced,
    High,
}

/// Classify `value` against a band: `< low` is low, `> high` is high,
/// anything else (bounds included) is balanced.
pub fn classify(band: &BandConfig, value: f64) -> Level {
    if value < band.low {
        Level::Low
    } else if value > band.high {
        Level::High
    } else {
        Level::Balanced
    }
}

/// Band per metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub brightness: BandConfig,
    pub contrast: BandConfig,
    pub vibrancy: BandConfig,
}

impl Thresholds {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            brightness: config.brightness,
            contrast: config.contrast,
            vibrancy: config.vibrancy,
        }
    }

    pub fn band(&self, metric: Metric) -> &BandConfig {
        match metric {
            Metric::Brightness => &self.brightness,
            Metric::Contrast => &self.contrast,
            Metric::Vibrancy => &self.vibrancy,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

/// Raw metric values for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurements {
    pub brightness: f64,
    pub contrast: f64,
    pub vibrancy: f64,
}

impl Measurements {
    /// Measure a decoded image.
    ///
    /// Brightness and contrast come from the luminance rendering; vibrancy
    /// comes from the saturation channel of the color image.
    pub fn of(image: &image::DynamicImage) -> Self {
        let luma = Histogram::from_gray(&imaging::luminance(image));
        let saturation = Histogram::from_gray(&imaging::saturation_channel(&image.to_rgb8()));
        Self {
            brightness: luma.mean(),
            contrast: luma.std_dev(),
            vibrancy: saturation.std_dev(),
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Brightness => self.brightness,
            Metric::Contrast => self.contrast,
            Metric::Vibrancy => self.vibrancy,
        }
    }
}

/// One classified metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub metric: Metric,
    pub value: f64,
    pub level: Level,
    pub recommendation: &'static str,
}

/// Outcome of analyzing one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// The analyzed name, echoed back.
    pub source: String,
    /// Exactly one message per metric, in brightness, contrast, vibrancy order.
    pub recommendations: Vec<String>,
    /// The values and levels behind each recommendation, same order.
    pub readings: Vec<Reading>,
}

impl AnalysisResult {
    pub fn from_measurements(source: &str, m: &Measurements, thresholds: &Thresholds) -> Self {
        let readings: Vec<Reading> = Metric::ALL
            .iter()
            .map(|&metric| {
                let value = m.get(metric);
                let level = classify(thresholds.band(metric), value);
                Reading {
                    metric,
                    value,
                    level,
                    recommendation: metric.recommendation(level),
                }
            })
            .collect();
        Self {
            source: source.to_string(),
            recommendations: readings
                .iter()
                .map(|r| r.recommendation.to_string())
                .collect(),
            readings,
        }
    }

    pub fn reading(&self, metric: Metric) -> Option<&Reading> {
        self.readings.iter().find(|r| r.metric == metric)
    }
}

/// Read-only analyzer over an [`ImageStore`].
pub struct AnalysisEngine<'a, S: ImageStore + ?Sized> {
    store: &'a S,
    thresholds: Thresholds,
}

impl<'a, S: ImageStore + ?Sized> AnalysisEngine<'a, S> {
    pub fn new(store: &'a S, thresholds: Thresholds) -> Self {
        Self { store, thresholds }
    }

    /// Resolve, decode, measure, and classify `source`.
    pub fn analyze(&self, source: &str) -> Result<AnalysisResult> {
        let bytes = self.store.resolve(source)?;
        let image = imaging::decode(source, &bytes)?;
        let measurements = Measurements::of(&image);
        debug!(
            source,
            brightness = measurements.brightness,
            contrast = measurements.contrast,
            vibrancy = measurements.vibrancy,
            "measured image"
        );
        Ok(AnalysisResult::from_measurements(
            source,
            &measurements,
            &self.thresholds,
        ))
    }

    /// Analyze every original in parallel, returning results in name order.
    ///
    /// Listing failures abort the batch; a failure on one image is reported
    /// in its own slot and does not affect the others.
    pub fn analyze_all(&self) -> Result<Vec<(String, Result<AnalysisResult>)>> {
        let names: Vec<String> = self.store.list_originals()?.into_iter().collect();
        info!(count = names.len(), "analyzing originals");
        Ok(names
            .into_par_iter()
            .map(|name| {
                let result = self.analyze(&name);
                (name, result)
            })
            .collect())
    }
}
