//! Unit-space normalization
//!
//! Geometry is moved into `[0, 1]²` and the inverse is kept as a separate
//! placement transform, so the host can lay out the outline at its real size.

use glam::{DAffine2, DVec2};

use super::ImportError;
use crate::geometry::transform::{flip_y_unit, scale, translation};
use crate::geometry::{Bounds2D, PathGeometry};

/// Geometry in unit space plus the transform back to model space
#[derive(Debug, Clone)]
pub struct Normalized {
    /// Geometry inside the unit square (top-left origin when flipped)
    pub geometry: PathGeometry,
    /// Maps the unit square onto the original bounding box
    pub placement: DAffine2,
    /// Bounds of the geometry before normalization
    pub bounds: Bounds2D,
    pub width: f64,
    pub height: f64,
    /// Whether the Y flip was applied
    pub flipped: bool,
}

impl Normalized {
    /// Transform mapping the normalized geometry back onto the original points
    pub fn restore_transform(&self) -> DAffine2 {
        if self.flipped {
            self.placement * flip_y_unit()
        } else {
            self.placement
        }
    }

    /// Physical size (width, height)
    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }
}

/// Normalize geometry into unit space
///
/// The translation moves the bounding box minimum to the origin. Scaling is
/// applied only when both extents are positive; a flat outline keeps its
/// original scale, and so does its placement. The flip maps `y` to `1 - y`.
pub fn normalize(geometry: &PathGeometry, flip_y: bool) -> Result<Normalized, ImportError> {
    let bounds = geometry.bounds().ok_or(ImportError::EmptyGeometry)?;
    let width = bounds.width();
    let height = bounds.height();

    let extent = if width > 0.0 && height > 0.0 {
        DVec2::new(width, height)
    } else {
        DVec2::ONE
    };

    let mut normalization = scale(extent.recip()) * translation(-bounds.min);
    if flip_y {
        normalization = flip_y_unit() * normalization;
    }

    let placement = translation(bounds.min) * scale(extent);

    Ok(Normalized {
        geometry: geometry.transformed(&normalization),
        placement,
        bounds,
        width,
        height,
        flipped: flip_y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PathBuilder;
    use approx::assert_relative_eq;

    fn polyline(points: &[(f64, f64)]) -> PathGeometry {
        let mut builder = PathBuilder::new();
        let mut iter = points.iter();
        if let Some(&(x, y)) = iter.next() {
            builder.move_to(DVec2::new(x, y));
        }
        for &(x, y) in iter {
            builder.line_to(DVec2::new(x, y));
        }
        builder.finish()
    }

    fn rectangle() -> PathGeometry {
        polyline(&[(10.0, 5.0), (50.0, 5.0), (50.0, 25.0), (10.0, 25.0), (10.0, 5.0)])
    }

    #[test]
    fn test_rectangle_fills_unit_square() {
        let normalized = normalize(&rectangle(), true).unwrap();
        let bounds = normalized.geometry.bounds().unwrap();
        assert_relative_eq!(bounds.min, DVec2::ZERO, epsilon = 1e-12);
        assert_relative_eq!(bounds.max, DVec2::ONE, epsilon = 1e-12);
        assert_eq!(normalized.width, 40.0);
        assert_eq!(normalized.height, 20.0);
    }

    #[test]
    fn test_flip_puts_model_origin_at_bottom() {
        let normalized = normalize(&rectangle(), true).unwrap();
        // (10, 5) is the bottom-left corner in model space
        let first = normalized.geometry.subpaths()[0].first();
        assert_relative_eq!(first, DVec2::new(0.0, 1.0), epsilon = 1e-12);

        let unflipped = normalize(&rectangle(), false).unwrap();
        let first = unflipped.geometry.subpaths()[0].first();
        assert_relative_eq!(first, DVec2::ZERO, epsilon = 1e-12);
    }

    #[test]
    fn test_placement_reproduces_bounding_box() {
        let original = polyline(&[(-3.0, 2.0), (7.0, 9.0), (1.0, -4.0)]);
        let normalized = normalize(&original, true).unwrap();

        let placed = normalized.geometry.transformed(&normalized.placement);
        let expected = original.bounds().unwrap();
        let actual = placed.bounds().unwrap();
        assert_relative_eq!(actual.min, expected.min, epsilon = 1e-9);
        assert_relative_eq!(actual.max, expected.max, epsilon = 1e-9);
    }

    #[test]
    fn test_restore_transform_round_trips_every_point() {
        let original = polyline(&[(-3.0, 2.0), (7.0, 9.0), (1.0, -4.0), (-3.0, 2.0)]);
        for flip_y in [true, false] {
            let normalized = normalize(&original, flip_y).unwrap();
            let restored = normalized
                .geometry
                .transformed(&normalized.restore_transform());
            for (a, b) in restored.points().zip(original.points()) {
                assert_relative_eq!(a, b, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_zero_height_stays_finite() {
        let flat = polyline(&[(2.0, 3.0), (12.0, 3.0)]);
        let normalized = normalize(&flat, true).unwrap();

        assert_eq!(normalized.height, 0.0);
        assert!(normalized.geometry.points().all(|p| p.is_finite()));
        // Unscaled: translated by the minimum only, then flipped
        let first = normalized.geometry.subpaths()[0].first();
        assert_relative_eq!(first, DVec2::new(0.0, 1.0), epsilon = 1e-12);
        let last = normalized.geometry.subpaths()[0].last();
        assert_relative_eq!(last, DVec2::new(10.0, 1.0), epsilon = 1e-12);

        let restored = normalized
            .geometry
            .transformed(&normalized.restore_transform());
        for (a, b) in restored.points().zip(flat.points()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_width_stays_finite() {
        let flat = polyline(&[(4.0, -1.0), (4.0, 6.0)]);
        let normalized = normalize(&flat, false).unwrap();
        assert_eq!(normalized.width, 0.0);
        assert!(normalized.geometry.points().all(|p| p.is_finite()));
        assert!(crate::geometry::transform::is_finite(&normalized.placement));
    }

    #[test]
    fn test_placement_of_flat_outline_reproduces_bounding_box() {
        let flat = polyline(&[(2.0, 3.0), (12.0, 3.0)]);
        let normalized = normalize(&flat, false).unwrap();

        let placed = normalized.geometry.transformed(&normalized.placement);
        let bounds = placed.bounds().unwrap();
        assert_relative_eq!(bounds.min, DVec2::new(2.0, 3.0), epsilon = 1e-12);
        assert_relative_eq!(bounds.max, DVec2::new(12.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_empty_geometry_is_rejected() {
        assert!(matches!(
            normalize(&PathGeometry::new(), true),
            Err(ImportError::EmptyGeometry)
        ));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let original = polyline(&[(0.1, 0.2), (3.3, 7.7), (9.9, 0.4)]);
        let a = normalize(&original, true).unwrap();
        let b = normalize(&original, true).unwrap();
        assert_eq!(a.geometry, b.geometry);
        assert_eq!(a.placement, b.placement);
    }
}
