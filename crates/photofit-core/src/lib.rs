//! Photofit Core - budget-driven upload transcoding
//!
//! This crate prepares user-supplied photos for upload. Any accepted source
//! image is turned into a JPEG that fits a hard byte budget, keeping as much
//! quality and resolution as the budget allows.
//!
//! # Pipeline
//!
//! 1. [`validate`] - reject unsupported MIME types and oversized sources
//! 2. [`decode`] - sniff, decode, orient and flatten into an RGB raster
//! 3. [`plan`] - cap the longest side at `max_dimension`
//! 4. [`budget`] - bounded search over quality, then dimensions
//! 5. [`package`] - output filename, MIME type and timestamp
//!
//! # Examples
//!
//! ```ignore
//! use photofit_core::{BudgetConfig, SourceImage, Transcoder};
//!
//! let bytes = std::fs::read("IMG_0042.png").unwrap();
//! let source = SourceImage::new(bytes, "image/png", "IMG_0042.png");
//! let transcoder = Transcoder::new(BudgetConfig::default())?;
//! let result = transcoder.transcode(&source)?;
//! println!("{} -> {}x{}, {} bytes", result.filename, result.width, result.height, result.bytes.len());
//! ```

pub mod budget;
pub mod codec;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod package;
pub mod pipeline;
pub mod plan;
pub mod validate;

pub use budget::{fit_to_budget, BudgetFit, EncodeAttempt};
pub use codec::{ImageCodec, JpegCodec, Raster};
pub use config::{BudgetConfig, ConfigError};
pub use decode::{DecodeError, FilterType, RasterImage};
pub use encode::{EncodeError, OUTPUT_EXTENSION, OUTPUT_MIME_TYPE};
pub use error::TranscodeError;
pub use package::{output_filename, TranscodeResult};
pub use pipeline::{transcode, SourceImage, Transcoder};
pub use plan::plan_dimensions;
pub use validate::validate_source;
