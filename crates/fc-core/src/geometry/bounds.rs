//! 2D axis-aligned bounds

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in the plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2D {
    /// Minimum corner
    pub min: DVec2,
    /// Maximum corner
    pub max: DVec2,
}

impl Bounds2D {
    /// Creates bounds from min and max corners.
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Creates empty (inverted) bounds.
    pub fn empty() -> Self {
        Self {
            min: DVec2::splat(f64::INFINITY),
            max: DVec2::splat(f64::NEG_INFINITY),
        }
    }

    /// Creates bounds that contain all given points.
    pub fn from_points(points: impl IntoIterator<Item = DVec2>) -> Self {
        let mut bounds = Self::empty();
        for point in points {
            bounds = bounds.expand_to_include(point);
        }
        bounds
    }

    /// Returns bounds expanded to include the given point.
    pub fn expand_to_include(&self, point: DVec2) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Returns the union of two bounds.
    pub fn union(&self, other: &Bounds2D) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Returns the size (full extents).
    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    /// True when the box is finite and not inverted. Zero extents are valid.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
    }
}

impl Default for Bounds2D {
    fn default() -> Self {
        Self::empty()
    }
}
