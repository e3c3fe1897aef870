//! Affine transform helpers
//!
//! Composition follows `glam`: in `a * b`, `b` is applied to a point first.

use glam::{DAffine2, DVec2};

/// Pure translation
pub fn translation(offset: DVec2) -> DAffine2 {
    DAffine2::from_translation(offset)
}

/// Axis-aligned scale about the origin
pub fn scale(factors: DVec2) -> DAffine2 {
    DAffine2::from_scale(factors)
}

/// Vertical flip inside the unit square: `y -> 1 - y`
pub fn flip_y_unit() -> DAffine2 {
    translation(DVec2::Y) * scale(DVec2::new(1.0, -1.0))
}

/// Check that every coefficient is finite
pub fn is_finite(transform: &DAffine2) -> bool {
    transform.matrix2.is_finite() && transform.translation.is_finite()
}
