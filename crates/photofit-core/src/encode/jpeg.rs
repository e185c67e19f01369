//! JPEG encoding of candidate rasters.
//!
//! Uses the `image` crate's baseline JPEG encoder. Quality is expressed on the
//! pipeline's (0, 1] scale and mapped onto the encoder's 1-100 scale here.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;

use crate::decode::RasterImage;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Quality is NaN or outside (0, 1].
    #[error("Invalid quality {0}: must be in (0, 1]")]
    InvalidQuality(f32),

    /// Resampling to the requested tier failed.
    #[error("Failed to resample to {width}x{height}: {reason}")]
    ResampleFailed {
        width: u32,
        height: u32,
        reason: String,
    },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Map a (0, 1] quality onto the JPEG encoder's 1-100 scale.
///
/// # Errors
///
/// Returns `EncodeError::InvalidQuality` for NaN, zero, negative or > 1 values.
pub fn jpeg_quality(quality: f32) -> Result<u8, EncodeError> {
    if quality.is_nan() || quality <= 0.0 || quality > 1.0 {
        return Err(EncodeError::InvalidQuality(quality));
    }
    Ok(((quality * 100.0).round() as u8).clamp(1, 100))
}

/// Encode a raster to JPEG bytes at the given (0, 1] quality.
pub fn encode_jpeg(image: &RasterImage, quality: f32) -> Result<Vec<u8>, EncodeError> {
    let quality = jpeg_quality(quality)?;
    let (width, height) = image.dimensions();

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(image.pixels(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}
