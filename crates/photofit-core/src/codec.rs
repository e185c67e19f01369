//! The imaging capability the budget search drives.
//!
//! The search never touches pixels directly. It asks an [`ImageCodec`] to
//! decode the source once, to resample the decoded raster for each dimension
//! tier, and to encode the current tier at a given quality. [`JpegCodec`] is
//! the production implementation backed by the `image` crate; tests plug in
//! stubs that only track dimensions and report synthetic sizes.

use crate::decode::{self, DecodeError, FilterType, RasterImage};
use crate::encode::{self, EncodeError};

/// Anything with pixel dimensions.
pub trait Raster {
    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);
}

impl Raster for RasterImage {
    fn dimensions(&self) -> (u32, u32) {
        RasterImage::dimensions(self)
    }
}

/// Decode/resample/encode capability supplied by the host platform.
pub trait ImageCodec {
    /// Decoded pixel representation owned by one invocation.
    type Raster: Raster;

    /// Decode source bytes into an upright raster.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Raster, DecodeError>;

    /// Produce a copy of `raster` at exactly `width` x `height`.
    fn resample(
        &self,
        raster: &Self::Raster,
        width: u32,
        height: u32,
    ) -> Result<Self::Raster, EncodeError>;

    /// Encode `raster` at `quality` in (0, 1] and return the output bytes.
    fn encode(&self, raster: &Self::Raster, quality: f32) -> Result<Vec<u8>, EncodeError>;
}

/// Decode through `codec` and enforce the non-empty raster invariant.
///
/// Codec implementations are not trusted to reject empty images themselves.
pub(crate) fn decode_checked<C: ImageCodec>(
    codec: &C,
    bytes: &[u8],
) -> Result<C::Raster, DecodeError> {
    let raster = codec.decode(bytes)?;
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }
    Ok(raster)
}

/// Production codec: `image` crate decoders, resampling, and JPEG output.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec {
    filter: FilterType,
}

impl JpegCodec {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl ImageCodec for JpegCodec {
    type Raster = RasterImage;

    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, DecodeError> {
        decode::decode_image(bytes)
    }

    fn resample(
        &self,
        raster: &RasterImage,
        width: u32,
        height: u32,
    ) -> Result<RasterImage, EncodeError> {
        decode::resize(raster, width, height, self.filter).map_err(|e| {
            EncodeError::ResampleFailed {
                width,
                height,
                reason: e.to_string(),
            }
        })
    }

    fn encode(&self, raster: &RasterImage, quality: f32) -> Result<Vec<u8>, EncodeError> {
        encode::encode_jpeg(raster, quality)
    }
}
