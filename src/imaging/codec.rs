//! Byte-level decode and encode.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Format sniffing | `image::ImageReader::with_guessed_format` |
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image` crate decoders |
//! | Orientation tag | `ImageDecoder::orientation` (EXIF 0x0112) |
//! | Orientation fix | `DynamicImage::apply_orientation` |
//! | Encode | `image::codecs::png::PngEncoder` |
//!
//! Orientation is applied immediately after decode, so an image stored with
//! a rotation tag and the same pixels stored upright are indistinguishable
//! to everything downstream.

use crate::error::{Error, Result};
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageDecoder, ImageEncoder, ImageError, ImageReader, RgbImage};
use std::io::Cursor;
use tracing::debug;

/// Decode `bytes` and normalize orientation. `name` is only used for errors.
pub fn decode(name: &str, bytes: &[u8]) -> Result<DynamicImage> {
    let decode_err = |source: ImageError| Error::Decode {
        name: name.to_string(),
        source,
    };

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_err(ImageError::IoError(e)))?;
    let mut decoder = reader.into_decoder().map_err(decode_err)?;
    let orientation = decoder.orientation().map_err(decode_err)?;
    let mut image = DynamicImage::from_decoder(decoder).map_err(decode_err)?;
    image.apply_orientation(orientation);

    debug!(
        name,
        width = image.width(),
        height = image.height(),
        ?orientation,
        "decoded image"
    );
    Ok(image)
}

/// Encode an RGB raster as PNG.
pub fn encode_png(image: &RgbImage) -> std::result::Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(buffer)
}
