//! 2D path geometry
//!
//! A [`PathGeometry`] is an ordered list of polylines. Every subpath holds at
//! least two points; [`PathBuilder`] is the only way to produce one and drops
//! anything shorter.

mod bounds;
pub mod transform;

use glam::{DAffine2, DVec2};
use serde::{Deserialize, Serialize};

pub use bounds::Bounds2D;

/// Distance under which a subpath's end is considered to meet its start
const CLOSE_EPSILON: f64 = 1e-9;

/// A single polyline
#[derive(Debug, Clone, PartialEq)]
pub struct Subpath {
    points: Vec<DVec2>,
}

impl Subpath {
    /// Points in traversal order
    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> DVec2 {
        self.points[0]
    }

    pub fn last(&self) -> DVec2 {
        self.points[self.points.len() - 1]
    }

    /// Whether the polyline ends where it started
    pub fn is_closed(&self) -> bool {
        self.first().distance(self.last()) <= CLOSE_EPSILON
    }
}

/// Ordered collection of polylines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<DVec2>>", into = "Vec<Vec<DVec2>>")]
pub struct PathGeometry {
    subpaths: Vec<Subpath>,
}

impl PathGeometry {
    /// Empty geometry
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subpaths(&self) -> &[Subpath] {
        &self.subpaths
    }

    /// Check if there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    /// Total number of points over all subpaths
    pub fn point_count(&self) -> usize {
        self.subpaths.iter().map(Subpath::len).sum()
    }

    /// Iterate over every point of every subpath
    pub fn points(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.subpaths.iter().flat_map(|s| s.points.iter().copied())
    }

    /// Bounding box of all points
    ///
    /// Returns `None` when the geometry is empty or contains non-finite
    /// coordinates.
    pub fn bounds(&self) -> Option<Bounds2D> {
        let bounds = Bounds2D::from_points(self.points());
        (bounds.is_valid() && self.points().all(|p| p.is_finite())).then_some(bounds)
    }

    /// Apply an affine transform to every point in place
    pub fn transform(&mut self, transform: &DAffine2) {
        for subpath in &mut self.subpaths {
            for point in &mut subpath.points {
                *point = transform.transform_point2(*point);
            }
        }
    }

    /// Transformed copy
    pub fn transformed(&self, transform: &DAffine2) -> Self {
        let mut copy = self.clone();
        copy.transform(transform);
        copy
    }
}

impl From<Vec<Vec<DVec2>>> for PathGeometry {
    fn from(polylines: Vec<Vec<DVec2>>) -> Self {
        let mut builder = PathBuilder::new();
        for polyline in polylines {
            let mut points = polyline.into_iter();
            if let Some(first) = points.next() {
                builder.move_to(first);
                for point in points {
                    builder.line_to(point);
                }
            }
        }
        builder.finish()
    }
}

impl From<PathGeometry> for Vec<Vec<DVec2>> {
    fn from(geometry: PathGeometry) -> Self {
        geometry.subpaths.into_iter().map(|s| s.points).collect()
    }
}

/// Incremental polyline builder
#[derive(Debug, Default)]
pub struct PathBuilder {
    subpaths: Vec<Subpath>,
    current: Vec<DVec2>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new subpath at `point`
    pub fn move_to(&mut self, point: DVec2) {
        self.flush();
        self.current.push(point);
    }

    /// Extend the current subpath; starts one if none is open
    pub fn line_to(&mut self, point: DVec2) {
        self.current.push(point);
    }

    /// Finish building, dropping subpaths with fewer than two points
    pub fn finish(mut self) -> PathGeometry {
        self.flush();
        PathGeometry {
            subpaths: self.subpaths,
        }
    }

    fn flush(&mut self) {
        let points = std::mem::take(&mut self.current);
        if points.len() >= 2 {
            self.subpaths.push(Subpath { points });
        }
    }
}
