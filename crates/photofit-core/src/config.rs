//! Budget configuration for the transcoding pipeline.
//!
//! All tunables live in [`BudgetConfig`]. The defaults are exposed as named
//! constants so callers can build on them instead of repeating magic numbers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// MIME types accepted from the upload form by default.
pub const DEFAULT_ACCEPTED_MIME_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Largest source buffer accepted before any decode work (10 MB).
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 10_000_000;

/// Byte budget for the transcoded output (2 MB).
pub const DEFAULT_TARGET_BYTES: usize = 2_000_000;

/// Longest side of the first dimension tier.
pub const DEFAULT_MAX_DIMENSION: u32 = 2200;

/// Once the longest side is at or below this, dimensions are no longer reduced.
pub const DEFAULT_MIN_DIMENSION: u32 = 800;

/// Quality used for the first attempt of every dimension tier.
pub const DEFAULT_INITIAL_QUALITY: f32 = 0.9;

/// Lowest quality tried before shrinking dimensions.
pub const DEFAULT_MIN_QUALITY: f32 = 0.5;

/// Quality decrement between attempts within a tier.
pub const DEFAULT_QUALITY_STEP: f32 = 0.1;

/// Factor applied to both sides when moving to the next dimension tier.
pub const DEFAULT_SCALE_STEP: f64 = 0.8;

/// Tolerance for comparing stepped quality values against the floor.
const QUALITY_EPSILON: f32 = 1e-4;

/// A violated [`BudgetConfig`] invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("accepted MIME type list is empty")]
    NoAcceptedTypes,

    #[error("targetBytes must be greater than zero")]
    ZeroTarget,

    #[error("quality range is invalid: minQuality {min} must be > 0 and below initialQuality {initial} <= 1")]
    QualityRange { initial: f32, min: f32 },

    #[error("qualityStep must be greater than zero, got {0}")]
    QualityStep(f32),

    #[error("scaleStep must be strictly between 0 and 1, got {0}")]
    ScaleStep(f64),

    #[error("dimension range is invalid: minDimension {min} must be >= 1 and below maxDimension {max}")]
    DimensionRange { min: u32, max: u32 },
}

/// Tunables for validation and the encode-budget search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BudgetConfig {
    /// Declared MIME types the validator lets through (lowercase).
    pub accepted_mime_types: Vec<String>,
    /// Largest source buffer, in bytes.
    pub max_source_bytes: usize,
    /// Byte budget for the encoded output.
    pub target_bytes: usize,
    /// Cap on the longest side of the first tier.
    pub max_dimension: u32,
    /// Longest side at which dimension reduction stops.
    pub min_dimension: u32,
    /// Starting quality of each tier, in (0, 1].
    pub initial_quality: f32,
    /// Quality floor, in (0, 1].
    pub min_quality: f32,
    /// Quality decrement per attempt.
    pub quality_step: f32,
    /// Per-tier scale factor, in (0, 1).
    pub scale_step: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            accepted_mime_types: DEFAULT_ACCEPTED_MIME_TYPES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
            target_bytes: DEFAULT_TARGET_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
            min_dimension: DEFAULT_MIN_DIMENSION,
            initial_quality: DEFAULT_INITIAL_QUALITY,
            min_quality: DEFAULT_MIN_QUALITY,
            quality_step: DEFAULT_QUALITY_STEP,
            scale_step: DEFAULT_SCALE_STEP,
        }
    }
}

impl BudgetConfig {
    /// Create a configuration with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_bytes(mut self, target_bytes: usize) -> Self {
        self.target_bytes = target_bytes;
        self
    }

    pub fn with_max_source_bytes(mut self, max_source_bytes: usize) -> Self {
        self.max_source_bytes = max_source_bytes;
        self
    }

    pub fn with_dimensions(mut self, min_dimension: u32, max_dimension: u32) -> Self {
        self.min_dimension = min_dimension;
        self.max_dimension = max_dimension;
        self
    }

    pub fn with_quality(mut self, initial: f32, min: f32, step: f32) -> Self {
        self.initial_quality = initial;
        self.min_quality = min;
        self.quality_step = step;
        self
    }

    pub fn with_scale_step(mut self, scale_step: f64) -> Self {
        self.scale_step = scale_step;
        self
    }

    pub fn with_accepted_mime_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_mime_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Check every invariant the budget search relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accepted_mime_types.is_empty() {
            return Err(ConfigError::NoAcceptedTypes);
        }
        if self.target_bytes == 0 {
            return Err(ConfigError::ZeroTarget);
        }
        let quality_ok = self.min_quality > 0.0
            && self.min_quality < self.initial_quality
            && self.initial_quality <= 1.0;
        if !quality_ok {
            return Err(ConfigError::QualityRange {
                initial: self.initial_quality,
                min: self.min_quality,
            });
        }
        if self.quality_step.is_nan() || self.quality_step <= 0.0 {
            return Err(ConfigError::QualityStep(self.quality_step));
        }
        if self.scale_step.is_nan() || self.scale_step <= 0.0 || self.scale_step >= 1.0 {
            return Err(ConfigError::ScaleStep(self.scale_step));
        }
        if self.min_dimension == 0 || self.min_dimension >= self.max_dimension {
            return Err(ConfigError::DimensionRange {
                min: self.min_dimension,
                max: self.max_dimension,
            });
        }
        Ok(())
    }

    /// Whether a declared MIME type is accepted.
    ///
    /// Comparison ignores case, surrounding whitespace and any `;` parameters.
    pub fn accepts_mime(&self, mime_type: &str) -> bool {
        let essence = normalize_mime(mime_type);
        self.accepted_mime_types
            .iter()
            .any(|accepted| normalize_mime(accepted) == essence)
    }

    /// Number of quality levels tried per dimension tier.
    pub fn quality_levels(&self) -> u32 {
        let span = (self.initial_quality - self.min_quality) / self.quality_step;
        (span + QUALITY_EPSILON).floor().max(0.0) as u32 + 1
    }

    /// Quality of the `level`-th attempt within a tier (level 0 is the initial quality).
    pub fn quality_at(&self, level: u32) -> f32 {
        (self.initial_quality - level as f32 * self.quality_step).max(self.min_quality)
    }

    /// Number of dimension tiers the search walks through when the longest
    /// side starts at `longest_side`.
    pub fn dimension_tiers(&self, longest_side: u32) -> u32 {
        let mut tiers = 1;
        let mut side = longest_side;
        while side > self.min_dimension {
            let next = scale_side(side, self.scale_step);
            if next >= side {
                break;
            }
            side = next;
            tiers += 1;
        }
        tiers
    }

    /// Upper bound on encode attempts for a search whose first tier has
    /// `longest_side` as its longest side.
    pub fn max_attempts(&self, longest_side: u32) -> u32 {
        self.quality_levels()
            .saturating_mul(self.dimension_tiers(longest_side))
    }
}

/// Scale one side by `factor`, rounding to the nearest integer and never below 1.
pub(crate) fn scale_side(side: u32, factor: f64) -> u32 {
    ((side as f64 * factor).round() as u32).max(1)
}

fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
