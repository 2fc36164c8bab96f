//! Shared test utilities for the retouch test suite.
//!
//! Provides synthetic image builders, encoders that produce the byte forms
//! the store holds, and an in-memory [`MemoryStore`] implementing
//! [`ImageStore`] so pipeline and analysis tests don't touch the filesystem.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let store = MemoryStore::with_original("gray.png", &png_bytes(&solid(100, 100, [128; 3])));
//! let result = AnalysisEngine::new(&store, Thresholds::default()).analyze("gray.png").unwrap();
//! ```

use crate::store::{ImageStore, StoreError, validate_name};
use image::{DynamicImage, ImageEncoder, Rgb, RgbImage};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

// =========================================================================
// Synthetic images
// =========================================================================

/// Every pixel set to `rgb`.
pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

/// Smooth ramp across all three channels; no two adjacent pixels are equal.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(2).saturating_sub(1)).min(255) as u8,
            (y * 255 / height.max(2).saturating_sub(1)).min(255) as u8,
            ((x + y) % 256) as u8,
        ])
    })
}

/// Strongly saturated image: columns cycle through pure red, green, and blue.
pub fn saturated_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, _| match x % 3 {
        0 => Rgb([230, 20, 20]),
        1 => Rgb([20, 200, 40]),
        _ => Rgb([30, 40, 220]),
    })
}

/// Left half `a`, right half `b`. Width must be even for an exact 50/50 split.
pub fn split_rgb(width: u32, height: u32, a: [u8; 3], b: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 { Rgb(a) } else { Rgb(b) }
    }))
}

// =========================================================================
// Encoders
// =========================================================================

pub fn png_bytes(img: &DynamicImage) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn jpeg_bytes(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 95)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    buf
}

/// Insert an APP1 EXIF segment carrying only an Orientation tag right after SOI.
pub fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A");
    tiff.extend_from_slice(&8u32.to_be_bytes()); // IFD0 offset
    tiff.extend_from_slice(&1u16.to_be_bytes()); // entry count
    tiff.extend_from_slice(&0x0112u16.to_be_bytes()); // Orientation
    tiff.extend_from_slice(&3u16.to_be_bytes()); // SHORT
    tiff.extend_from_slice(&1u32.to_be_bytes()); // count
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes()); // no next IFD

    let mut payload = b"Exif\x00\x00".to_vec();
    payload.extend_from_slice(&tiff);

    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// One picture in two stored forms: a JPEG whose pixels are rotated a
/// quarter turn counter-clockwise and tagged with EXIF orientation 6, and a
/// PNG of that JPEG's upright decode carrying no tag.
///
/// The PNG is made from the decoded JPEG so both forms share pixels exactly
/// despite JPEG loss.
pub fn orientation_pair(upright: &RgbImage) -> (Vec<u8>, Vec<u8>) {
    let stored = image::imageops::rotate270(upright);
    let tagged = with_exif_orientation(&jpeg_bytes(&stored), 6);
    let decoded = crate::imaging::decode("tagged.jpg", &tagged).unwrap();
    (tagged, png_bytes(&decoded))
}

// =========================================================================
// In-memory store
// =========================================================================

/// [`ImageStore`] held in memory. Uses `Mutex` so it is `Sync`.
#[derive(Default)]
pub struct MemoryStore {
    pub originals: Mutex<BTreeMap<String, Vec<u8>>>,
    pub derived: Mutex<BTreeMap<String, Vec<u8>>>,
    /// When set, every `put_*` fails with a write error.
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_original(name: &str, bytes: &[u8]) -> Self {
        let store = Self::new();
        store.put_original(bytes, name).unwrap();
        store
    }

    pub fn derived_names(&self) -> Vec<String> {
        self.derived.lock().unwrap().keys().cloned().collect()
    }

    pub fn derived_bytes(&self, name: &str) -> Vec<u8> {
        self.derived
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("derived '{name}' not found"))
    }

    fn write_guard(&self, name: &str) -> Result<(), StoreError> {
        validate_name(name)?;
        if self.fail_writes {
            return Err(StoreError::Write {
                name: name.to_string(),
                source: std::io::Error::other("simulated write failure"),
            });
        }
        Ok(())
    }
}

impl ImageStore for MemoryStore {
    fn resolve(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        validate_name(name)?;
        if let Some(bytes) = self.derived.lock().unwrap().get(name) {
            return Ok(bytes.clone());
        }
        self.originals
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn list_originals(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.originals.lock().unwrap().keys().cloned().collect())
    }

    fn list_derived(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.derived.lock().unwrap().keys().cloned().collect())
    }

    fn put_derived(&self, bytes: &[u8], name: &str) -> Result<String, StoreError> {
        self.write_guard(name)?;
        let mut derived = self.derived.lock().unwrap();
        if derived.contains_key(name) {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        derived.insert(name.to_string(), bytes.to_vec());
        Ok(name.to_string())
    }

    fn put_original(&self, bytes: &[u8], name: &str) -> Result<String, StoreError> {
        self.write_guard(name)?;
        self.originals
            .lock()
            .unwrap()
            .insert(name.to_string(), bytes.to_vec());
        Ok(name.to_string())
    }
}
