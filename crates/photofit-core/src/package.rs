//! Output packaging: bytes plus the metadata the storage uploader needs.

use chrono::{DateTime, Utc};

use crate::budget::BudgetFit;
use crate::encode::{OUTPUT_EXTENSION, OUTPUT_MIME_TYPE};

/// Stem used when the uploaded filename has nothing usable.
pub const FALLBACK_STEM: &str = "image";

/// Final output of a successful transcode.
#[derive(Debug, Clone)]
pub struct TranscodeResult {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    /// Quality of the attempt that met the budget.
    pub quality: f32,
    /// Number of encode attempts the search needed.
    pub attempts: u32,
    /// Byte length of the original upload.
    pub source_bytes: usize,
    pub created_at: DateTime<Utc>,
}

impl TranscodeResult {
    /// Byte length of the encoded output.
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }
}

/// Wrap a budget fit into a [`TranscodeResult`].
pub fn package(fit: BudgetFit, source_filename: &str, source_bytes: usize) -> TranscodeResult {
    TranscodeResult {
        mime_type: OUTPUT_MIME_TYPE,
        filename: output_filename(source_filename),
        width: fit.attempt.width,
        height: fit.attempt.height,
        quality: fit.attempt.quality,
        attempts: fit.attempts,
        source_bytes,
        created_at: Utc::now(),
        bytes: fit.bytes,
    }
}

/// Derive the output filename: source stem with the output extension.
///
/// Directory components are dropped and only the last extension is stripped.
/// Falls back to [`FALLBACK_STEM`] when no usable stem remains.
///
/// ```text
/// "IMG_0042.HEIC.png" -> "IMG_0042.HEIC.jpg"
/// "C:\\Users\\me\\cat.webp" -> "cat.jpg"
/// ".png" -> "image.jpg"
/// ```
pub fn output_filename(source_filename: &str) -> String {
    let base = source_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let stem = match base.rfind('.') {
        // ".png" is an extension with no name
        Some(0) => "",
        Some(dot) => &base[..dot],
        None => base,
    };
    let stem = stem.trim_end_matches('.').trim();

    if stem.is_empty() {
        format!("{}.{}", FALLBACK_STEM, OUTPUT_EXTENSION)
    } else {
        format!("{}.{}", stem, OUTPUT_EXTENSION)
    }
}
