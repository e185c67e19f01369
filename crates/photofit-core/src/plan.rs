//! Dimension planning for the first encode tier.

use crate::config::scale_side;

/// Compute the starting `(width, height)` for the budget search.
///
/// When the longest side exceeds `max_dimension`, both sides are scaled by
/// `max_dimension / longest`, rounding to the nearest integer and never below
/// 1. Otherwise the natural dimensions are returned untouched; images are
/// never upscaled.
pub fn plan_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_dimension {
        return (width, height);
    }

    let factor = max_dimension as f64 / longest as f64;
    (scale_side(width, factor), scale_side(height, factor))
}

/// Dimensions of the next tier: both sides scaled by `scale_step`.
pub fn next_tier(width: u32, height: u32, scale_step: f64) -> (u32, u32) {
    (scale_side(width, scale_step), scale_side(height, scale_step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_landscape() {
        assert_eq!(plan_dimensions(4000, 3000, 2200), (2200, 1650));
        assert_eq!(plan_dimensions(6000, 4000, 2560), (2560, 1707));
    }

    #[test]
    fn test_plan_portrait() {
        assert_eq!(plan_dimensions(3000, 4000, 2200), (1650, 2200));
    }

    #[test]
    fn test_plan_square() {
        assert_eq!(plan_dimensions(4000, 4000, 256), (256, 256));
    }

    #[test]
    fn test_plan_keeps_small_images() {
        assert_eq!(plan_dimensions(100, 50, 2200), (100, 50));
        assert_eq!(plan_dimensions(2200, 10, 2200), (2200, 10));
    }

    #[test]
    fn test_plan_extreme_aspect_never_hits_zero() {
        assert_eq!(plan_dimensions(100_000, 1, 2200), (2200, 1));
    }

    #[test]
    fn test_next_tier() {
        assert_eq!(next_tier(2200, 1650, 0.8), (1760, 1320));
        assert_eq!(next_tier(1, 1, 0.5), (1, 1));
    }
}
