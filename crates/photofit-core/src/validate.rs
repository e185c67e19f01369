//! Format validation: cheap checks that run before any decode work.

use crate::config::BudgetConfig;
use crate::error::TranscodeError;

/// Check a declared MIME type and byte length against the configuration.
///
/// The MIME check runs first, so an oversized GIF reports
/// `UnsupportedFormat` rather than `SourceTooLarge`.
pub fn validate_source(
    mime_type: &str,
    byte_length: usize,
    config: &BudgetConfig,
) -> Result<(), TranscodeError> {
    if !config.accepts_mime(mime_type) {
        return Err(TranscodeError::UnsupportedFormat {
            mime_type: mime_type.to_string(),
            accepted: config.accepted_mime_types.clone(),
        });
    }

    if byte_length > config.max_source_bytes {
        return Err(TranscodeError::SourceTooLarge {
            limit: config.max_source_bytes,
            actual: byte_length,
        });
    }

    Ok(())
}
