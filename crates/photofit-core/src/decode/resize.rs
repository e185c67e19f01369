//! Raster resampling used when moving between dimension tiers.

use super::{DecodeError, FilterType, RasterImage};

/// Resample a raster to exact dimensions.
///
/// Returns a clone when the dimensions already match.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` if either target side is zero.
pub fn resize(
    image: &RasterImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<RasterImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    let view = image
        .as_rgb_view()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to view raster pixels".to_string()))?;

    let resized = image::imageops::resize(&view, width, height, filter.to_image_filter());
    RasterImage::from_rgb_image(resized)
}
