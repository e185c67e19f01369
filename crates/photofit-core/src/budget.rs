//! Encode-budget controller.
//!
//! Searches for the highest quality and largest dimensions whose encoded size
//! fits `target_bytes`. Within a dimension tier quality is lowered one step at
//! a time from `initial_quality` down to `min_quality`; only when the floor
//! is reached are both sides scaled by `scale_step`, and quality resets to
//! `initial_quality` for the new tier. The search stops at the first attempt
//! that fits, or fails once the floor tier has been swept.
//!
//! ```text
//! tier 0: 2200x1650  q=0.9 0.8 0.7 0.6 0.5
//! tier 1: 1760x1320  q=0.9 0.8 0.7 0.6 0.5
//! ...
//! tier 5:  721x541   q=0.9 0.8 0.7 0.6 0.5  -> BudgetExceeded
//! ```

use log::{debug, info, warn};

use crate::codec::{ImageCodec, Raster};
use crate::config::BudgetConfig;
use crate::error::TranscodeError;
use crate::plan::next_tier;

/// One concrete `(width, height, quality)` trial and its encoded size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeAttempt {
    pub width: u32,
    pub height: u32,
    pub quality: f32,
    pub byte_length: usize,
}

/// The attempt that met the budget, together with its bytes.
#[derive(Debug, Clone)]
pub struct BudgetFit {
    pub attempt: EncodeAttempt,
    pub bytes: Vec<u8>,
    /// Total encode attempts made, including the successful one.
    pub attempts: u32,
}

/// Run the bounded search over quality and dimension tiers.
///
/// `start` is the first tier, normally from [`crate::plan::plan_dimensions`].
/// The configuration must already be validated.
///
/// # Errors
///
/// - `TranscodeError::BudgetExceeded` when no attempt fits. The error counts
///   every attempt made, including the last one on the floor tier.
/// - `TranscodeError::EncodeFailure` if the codec fails to resample or encode.
pub fn fit_to_budget<C: ImageCodec>(
    codec: &C,
    source: &C::Raster,
    start: (u32, u32),
    config: &BudgetConfig,
) -> Result<BudgetFit, TranscodeError> {
    let max_attempts = config.max_attempts(start.0.max(start.1));
    let quality_levels = config.quality_levels();

    let (mut width, mut height) = start;
    let mut tier = resample_tier(codec, source, width, height)?;
    let mut level = 0;
    let mut attempts = 0u32;
    let mut smallest = usize::MAX;

    loop {
        let quality = config.quality_at(level);
        let current = tier.as_ref().unwrap_or(source);
        let bytes = codec.encode(current, quality)?;
        attempts += 1;

        let attempt = EncodeAttempt {
            width,
            height,
            quality,
            byte_length: bytes.len(),
        };
        debug!(
            "attempt {}: {}x{} q={:.2} -> {} bytes (target {})",
            attempts, width, height, quality, attempt.byte_length, config.target_bytes
        );

        if attempt.byte_length <= config.target_bytes {
            info!(
                "fit {}x{} q={:.2} in {} bytes after {} attempts",
                width, height, quality, attempt.byte_length, attempts
            );
            return Ok(BudgetFit {
                attempt,
                bytes,
                attempts,
            });
        }
        smallest = smallest.min(attempt.byte_length);

        if attempts >= max_attempts {
            break;
        }

        if level + 1 < quality_levels {
            level += 1;
            continue;
        }

        if width.max(height) <= config.min_dimension {
            break;
        }

        let (next_width, next_height) = next_tier(width, height, config.scale_step);
        if next_width.max(next_height) >= width.max(height) {
            break;
        }

        // The previous tier's raster is dropped here.
        tier = resample_tier(codec, source, next_width, next_height)?;
        width = next_width;
        height = next_height;
        level = 0;
    }

    warn!(
        "budget of {} bytes not met after {} attempts (smallest {} bytes at {}x{})",
        config.target_bytes, attempts, smallest, width, height
    );
    Err(TranscodeError::BudgetExceeded {
        target: config.target_bytes,
        smallest,
        attempts,
        width,
        height,
    })
}

/// Resample `source` for a tier, or `None` when it is already that size.
fn resample_tier<C: ImageCodec>(
    codec: &C,
    source: &C::Raster,
    width: u32,
    height: u32,
) -> Result<Option<C::Raster>, TranscodeError> {
    if source.dimensions() == (width, height) {
        return Ok(None);
    }
    Ok(Some(codec.resample(source, width, height)?))
}
