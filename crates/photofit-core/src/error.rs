//! Error taxonomy for the transcoding pipeline.
//!
//! Every stage reports failures through [`TranscodeError`]. Each variant keeps
//! the offending value and the limit it broke so the upload form can render an
//! exact message without re-deriving anything.

use thiserror::Error;

use crate::config::ConfigError;
use crate::decode::DecodeError;
use crate::encode::EncodeError;

/// Terminal failure of a single transcode invocation.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The declared MIME type is not in the accepted set.
    #[error("Unsupported image format '{mime_type}' (accepted: {})", .accepted.join(", "))]
    UnsupportedFormat {
        mime_type: String,
        accepted: Vec<String>,
    },

    /// The source buffer is larger than the configured limit.
    #[error("Source image is {actual} bytes, limit is {limit} bytes")]
    SourceTooLarge { limit: usize, actual: usize },

    /// The bytes could not be decoded into a usable raster.
    #[error("Failed to decode image: {0}")]
    DecodeFailure(#[from] DecodeError),

    /// The encoder rejected a raster it was handed.
    #[error("Failed to encode image: {0}")]
    EncodeFailure(#[from] EncodeError),

    /// Quality and dimension reduction were both exhausted.
    #[error(
        "Could not fit image into {target} bytes after {attempts} attempts \
         (smallest was {smallest} bytes at {width}x{height})"
    )]
    BudgetExceeded {
        target: usize,
        smallest: usize,
        attempts: u32,
        width: u32,
        height: u32,
    },

    /// The budget configuration violates one of its invariants.
    #[error("Invalid budget configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl TranscodeError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            TranscodeError::UnsupportedFormat { .. } => "UnsupportedFormat",
            TranscodeError::SourceTooLarge { .. } => "SourceTooLarge",
            TranscodeError::DecodeFailure(_) => "DecodeFailure",
            TranscodeError::EncodeFailure(_) => "EncodeFailure",
            TranscodeError::BudgetExceeded { .. } => "BudgetExceeded",
            TranscodeError::InvalidConfig(_) => "InvalidConfig",
        }
    }

    /// The `(limit, actual)` pair for errors that are about a numeric limit.
    pub fn limit_and_actual(&self) -> Option<(usize, usize)> {
        match self {
            TranscodeError::SourceTooLarge { limit, actual } => Some((*limit, *actual)),
            TranscodeError::BudgetExceeded {
                target, smallest, ..
            } => Some((*target, *smallest)),
            _ => None,
        }
    }
}
