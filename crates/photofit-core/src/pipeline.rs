//! The transcoding pipeline: validate, decode, plan, fit, package.
//!
//! One call to [`Transcoder::transcode`] runs every stage in order on the
//! calling thread. Nothing is shared between calls except the immutable
//! configuration and codec, so a single `Transcoder` can serve concurrent
//! uploads from several threads.

use log::{debug, warn};

use crate::budget::fit_to_budget;
use crate::codec::{decode_checked, ImageCodec, JpegCodec, Raster};
use crate::config::BudgetConfig;
use crate::error::TranscodeError;
use crate::package::{package, TranscodeResult};
use crate::plan::plan_dimensions;
use crate::validate::validate_source;

/// An upload as handed over by the upload form.
#[derive(Debug, Clone)]
pub struct SourceImage {
    bytes: Vec<u8>,
    mime_type: String,
    filename: String,
}

impl SourceImage {
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        mime_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            filename: filename.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type declared by the uploader (not sniffed).
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }
}

/// Runs uploads through the pipeline with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Transcoder<C = JpegCodec> {
    config: BudgetConfig,
    codec: C,
}

impl Transcoder {
    /// Create a transcoder backed by the production JPEG codec.
    pub fn new(config: BudgetConfig) -> Result<Self, TranscodeError> {
        Self::with_codec(config, JpegCodec::default())
    }
}

impl<C: ImageCodec> Transcoder<C> {
    /// Create a transcoder with a custom codec.
    ///
    /// # Errors
    ///
    /// Returns `TranscodeError::InvalidConfig` if the configuration violates
    /// one of its invariants.
    pub fn with_codec(config: BudgetConfig, codec: C) -> Result<Self, TranscodeError> {
        config.validate()?;
        Ok(Self { config, codec })
    }

    pub fn config(&self) -> &BudgetConfig {
        &self.config
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Transcode one upload into a budget-compliant JPEG.
    pub fn transcode(&self, source: &SourceImage) -> Result<TranscodeResult, TranscodeError> {
        if let Err(err) = validate_source(source.mime_type(), source.byte_length(), &self.config) {
            warn!("rejected upload '{}': {}", source.filename(), err);
            return Err(err);
        }

        let raster = decode_checked(&self.codec, source.bytes())?;
        let (natural_width, natural_height) = raster.dimensions();
        let start = plan_dimensions(natural_width, natural_height, self.config.max_dimension);
        debug!(
            "decoded '{}' at {}x{}, first tier {}x{}",
            source.filename(),
            natural_width,
            natural_height,
            start.0,
            start.1
        );

        let fit = fit_to_budget(&self.codec, &raster, start, &self.config)?;
        Ok(package(fit, source.filename(), source.byte_length()))
    }
}

/// Transcode one upload with the production codec.
pub fn transcode(
    source: &SourceImage,
    config: &BudgetConfig,
) -> Result<TranscodeResult, TranscodeError> {
    Transcoder::new(config.clone())?.transcode(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::testing::StubCodec;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(img: RgbImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    /// Deterministic noise that JPEG cannot compress well.
    fn noise(width: u32, height: u32) -> RgbImage {
        let mut state = 0x2545_F491u32;
        RgbImage::from_fn(width, height, |_, _| {
            let mut next = || {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            };
            Rgb([next(), next(), next()])
        })
    }

    #[test]
    fn test_transcoder_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Transcoder>();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BudgetConfig::default().with_scale_step(1.2);
        assert!(matches!(
            Transcoder::new(config),
            Err(TranscodeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_oversized_source_rejected_before_decode() {
        let codec = StubCodec::new((4000, 3000), |_, _, _| 10);
        let transcoder = Transcoder::with_codec(BudgetConfig::default(), codec).unwrap();
        let source = SourceImage::new(vec![0u8; 12_000_000], "image/jpeg", "big.jpg");

        let err = transcoder.transcode(&source).unwrap_err();

        assert!(matches!(
            err,
            TranscodeError::SourceTooLarge {
                limit: 10_000_000,
                actual: 12_000_000
            }
        ));
        assert_eq!(transcoder.codec().decode_count(), 0);
        assert!(transcoder.codec().encode_log().is_empty());
    }

    #[test]
    fn test_gif_rejected_without_codec_work() {
        let codec = StubCodec::new((100, 100), |_, _, _| 10);
        let transcoder = Transcoder::with_codec(BudgetConfig::default(), codec).unwrap();
        let source = SourceImage::new(vec![0u8; 1000], "image/gif", "anim.gif");

        let err = transcoder.transcode(&source).unwrap_err();

        assert_eq!(err.kind(), "UnsupportedFormat");
        assert_eq!(transcoder.codec().decode_count(), 0);
        assert!(transcoder.codec().encode_log().is_empty());
    }

    #[test]
    fn test_large_but_compressible_with_stub() {
        let codec = StubCodec::new((4000, 3000), |w, h, q| {
            (q as f64 * w as f64 * h as f64 * 0.75) as usize
        });
        let transcoder = Transcoder::with_codec(BudgetConfig::default(), codec).unwrap();
        let source = SourceImage::new(vec![0u8; 6_000_000], "image/jpeg", "DSC_1234.JPG");

        let result = transcoder.transcode(&source).unwrap();

        assert_eq!(result.width, 2200);
        assert_eq!(result.height, 1650);
        assert!((result.quality - 0.7).abs() < 1e-5);
        assert_eq!(result.attempts, 3);
        assert!(result.byte_length() <= 2_000_000);
        assert_eq!(result.filename, "DSC_1234.jpg");
        assert_eq!(result.mime_type, "image/jpeg");
        assert_eq!(result.source_bytes, 6_000_000);
    }

    #[test]
    fn test_real_codec_flat_image_fits_first_try() {
        let bytes = png_bytes(RgbImage::from_pixel(300, 200, Rgb([40, 120, 200])));
        let source = SourceImage::new(bytes, "image/png", "avatar.png");

        let result = transcode(&source, &BudgetConfig::default()).unwrap();

        assert_eq!(result.attempts, 1);
        assert_eq!((result.width, result.height), (300, 200));
        assert_eq!(result.filename, "avatar.jpg");
        assert_eq!(&result.bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_real_codec_noise_is_reduced_into_budget() {
        let config = BudgetConfig::default()
            .with_target_bytes(20_000)
            .with_dimensions(100, 400);
        let bytes = png_bytes(noise(1200, 900));
        let source = SourceImage::new(bytes, "image/png", "noise.png");

        let result = transcode(&source, &config).unwrap();

        assert!(result.byte_length() <= 20_000);
        assert!(result.width <= 400 && result.height <= 300);
        assert!(result.attempts > 1);

        let decoded = crate::decode::decode_image(&result.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (result.width, result.height));
    }

    #[test]
    fn test_real_codec_rejects_mislabelled_garbage() {
        let source = SourceImage::new(vec![0x42u8; 2048], "image/jpeg", "fake.jpg");
        let err = transcode(&source, &BudgetConfig::default()).unwrap_err();
        assert_eq!(err.kind(), "DecodeFailure");
    }
}
