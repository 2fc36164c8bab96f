//! Image processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode + orientation** | `image::ImageReader`, `DynamicImage::apply_orientation` |
//! | **Encode** | PNG via `image::codecs::png` |
//! | **Brightness / contrast** | per-channel `f32` math with clamping |
//! | **Grayscale** | `DynamicImage::to_luma8`, re-expanded to RGB |
//! | **Statistics** | 256-bin histograms (mean, population σ), HSV saturation |
//!
//! The module is split into:
//! - **Codec**: bytes ↔ rasters
//! - **Parameters**: validated edit requests
//! - **Operations**: pixel adjustments used by the edit pipeline
//! - **Calculations**: pure statistics used by the analysis engine

pub mod calculations;
pub mod codec;
pub mod operations;
mod params;

pub use calculations::{Histogram, luminance, saturation_channel};
pub use codec::{decode, encode_png};
pub use operations::{adjust_brightness, adjust_contrast, to_grayscale};
pub use params::{EditRequest, Factor};
