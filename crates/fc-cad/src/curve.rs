//! Edge curves and their polyline approximation
//!
//! Every curve kind is defined by points and vectors only, so an orthographic
//! projection (an affine map) of a curve is again a curve of the same kind.

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::kernel::{CadError, CadResult};
use crate::plane::{ProjectionPlane, reference_x_dir};

/// Upper bound on the number of segments emitted for one arc
const MAX_ARC_SEGMENTS: usize = 1 << 16;

/// Maximum subdivision depth for Bezier flattening
const MAX_BEZIER_DEPTH: u32 = 16;

/// Geometric curve of an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    /// Straight segment
    Line {
        /// Start point
        start: DVec3,
        /// End point
        end: DVec3,
    },
    /// Conic arc `center + cos(t) * x_axis + sin(t) * y_axis`
    ///
    /// A circular arc has orthogonal axes of equal length (the radius).
    Arc {
        /// Center point
        center: DVec3,
        /// Axis at parameter 0, scaled by the radius
        x_axis: DVec3,
        /// Axis at parameter pi/2, scaled by the radius
        y_axis: DVec3,
        /// Start parameter in radians
        start_angle: f64,
        /// End parameter in radians
        end_angle: f64,
    },
    /// Cubic Bezier segment
    Bezier {
        /// Start point, two control points, end point
        points: [DVec3; 4],
    },
}

impl Curve {
    /// Create a straight segment
    pub fn line(start: DVec3, end: DVec3) -> Self {
        Curve::Line { start, end }
    }

    /// Create a circular arc in the plane with the given normal
    ///
    /// Angles are measured from the plane's reference X axis, counter-clockwise
    /// when looking against the normal.
    pub fn circular_arc(
        center: DVec3,
        normal: DVec3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Self {
        let normal = normal.try_normalize().unwrap_or(DVec3::Z);
        let x_dir = reference_x_dir(normal).unwrap_or(DVec3::X);
        let y_dir = normal.cross(x_dir);
        Curve::Arc {
            center,
            x_axis: x_dir * radius,
            y_axis: y_dir * radius,
            start_angle,
            end_angle,
        }
    }

    /// Create a full circle
    pub fn circle(center: DVec3, normal: DVec3, radius: f64) -> Self {
        Self::circular_arc(center, normal, radius, 0.0, TAU)
    }

    /// Create a cubic Bezier segment
    pub fn bezier(start: DVec3, control1: DVec3, control2: DVec3, end: DVec3) -> Self {
        Curve::Bezier {
            points: [start, control1, control2, end],
        }
    }

    /// Evaluate the curve at normalized parameter `t` in `[0, 1]`
    pub fn point_at(&self, t: f64) -> DVec3 {
        match self {
            Curve::Line { start, end } => start.lerp(*end, t),
            Curve::Arc {
                center,
                x_axis,
                y_axis,
                start_angle,
                end_angle,
            } => {
                let angle = start_angle + (end_angle - start_angle) * t;
                *center + *x_axis * angle.cos() + *y_axis * angle.sin()
            }
            Curve::Bezier { points } => bezier_point(points, t),
        }
    }

    /// First point of the curve
    pub fn start_point(&self) -> DVec3 {
        match self {
            Curve::Line { start, .. } => *start,
            Curve::Bezier { points } => points[0],
            Curve::Arc { .. } => self.point_at(0.0),
        }
    }

    /// Last point of the curve
    pub fn end_point(&self) -> DVec3 {
        match self {
            Curve::Line { end, .. } => *end,
            Curve::Bezier { points } => points[3],
            Curve::Arc { .. } => self.point_at(1.0),
        }
    }

    /// Check that all defining data is finite
    pub fn is_finite(&self) -> bool {
        match self {
            Curve::Line { start, end } => start.is_finite() && end.is_finite(),
            Curve::Arc {
                center,
                x_axis,
                y_axis,
                start_angle,
                end_angle,
            } => {
                center.is_finite()
                    && x_axis.is_finite()
                    && y_axis.is_finite()
                    && start_angle.is_finite()
                    && end_angle.is_finite()
            }
            Curve::Bezier { points } => points.iter().all(|p| p.is_finite()),
        }
    }

    /// Express the curve in the local coordinates of a plane
    pub fn project(&self, plane: &ProjectionPlane) -> Curve {
        match self {
            Curve::Line { start, end } => Curve::Line {
                start: plane.project_point(*start),
                end: plane.project_point(*end),
            },
            Curve::Arc {
                center,
                x_axis,
                y_axis,
                start_angle,
                end_angle,
            } => Curve::Arc {
                center: plane.project_point(*center),
                x_axis: plane.project_vector(*x_axis),
                y_axis: plane.project_vector(*y_axis),
                start_angle: *start_angle,
                end_angle: *end_angle,
            },
            Curve::Bezier { points } => Curve::Bezier {
                points: points.map(|p| plane.project_point(p)),
            },
        }
    }

    /// Approximate the curve as a polyline
    ///
    /// The returned points start at the curve's start point and end at its
    /// end point; no point of the curve is farther than `tolerance` from the
    /// polyline. Straight segments yield exactly their two endpoints. An arc
    /// that would need more than `MAX_ARC_SEGMENTS` chords to meet the
    /// tolerance fails with [`CadError::DegenerateCurve`].
    pub fn discretize(&self, tolerance: f64) -> CadResult<Vec<DVec3>> {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(CadError::InvalidTolerance(tolerance));
        }
        if !self.is_finite() {
            return Err(CadError::DegenerateCurve(
                "curve has non-finite data".into(),
            ));
        }

        match self {
            Curve::Line { start, end } => Ok(vec![*start, *end]),
            Curve::Arc {
                x_axis,
                y_axis,
                start_angle,
                end_angle,
                ..
            } => {
                let radius = semi_major_length(*x_axis, *y_axis);
                if radius <= f64::EPSILON {
                    return Err(CadError::DegenerateCurve("arc has zero radius".into()));
                }
                let sweep = (end_angle - start_angle).abs();
                let segments = arc_segment_count(sweep, radius, tolerance).ok_or_else(|| {
                    CadError::DegenerateCurve(format!(
                        "arc of radius {radius} needs more than {MAX_ARC_SEGMENTS} segments \
                         at tolerance {tolerance}"
                    ))
                })?;
                Ok((0..=segments)
                    .map(|i| self.point_at(i as f64 / segments as f64))
                    .collect())
            }
            Curve::Bezier { points } => {
                let mut out = vec![points[0]];
                flatten_bezier(*points, tolerance, 0, &mut out);
                Ok(out)
            }
        }
    }
}

/// Length of the longest radius vector of `x_axis * cos t + y_axis * sin t`
///
/// This is the square root of the largest eigenvalue of the Gram matrix of
/// the two axes, and equals the radius for a circle.
fn semi_major_length(x_axis: DVec3, y_axis: DVec3) -> f64 {
    let aa = x_axis.length_squared();
    let bb = y_axis.length_squared();
    let ab = x_axis.dot(y_axis);
    let half_diff = (aa - bb) * 0.5;
    let lambda = (aa + bb) * 0.5 + (half_diff * half_diff + ab * ab).sqrt();
    lambda.max(0.0).sqrt()
}

/// Number of chords needed so that the sagitta stays within `tolerance`
///
/// The second derivative of the arc is bounded by `radius`, so a chord over a
/// parameter step `d` deviates at most `radius * d^2 / 8` from the curve.
/// Each chord also spans at most a quarter turn. `None` when the count
/// exceeds `MAX_ARC_SEGMENTS`.
fn arc_segment_count(sweep: f64, radius: f64, tolerance: f64) -> Option<usize> {
    let step = (8.0 * tolerance / radius).sqrt();
    let by_tolerance = (sweep / step).ceil();
    let by_turn = (sweep / FRAC_PI_2).ceil();
    let count = by_tolerance.max(by_turn).max(1.0);
    if count > MAX_ARC_SEGMENTS as f64 {
        None
    } else {
        Some(count as usize)
    }
}

fn bezier_point(points: &[DVec3; 4], t: f64) -> DVec3 {
    let mt = 1.0 - t;
    points[0] * (mt * mt * mt)
        + points[1] * (3.0 * mt * mt * t)
        + points[2] * (3.0 * mt * t * t)
        + points[3] * (t * t * t)
}

/// Push the end points of a flattened Bezier, excluding its start point
fn flatten_bezier(points: [DVec3; 4], tolerance: f64, depth: u32, out: &mut Vec<DVec3>) {
    if depth >= MAX_BEZIER_DEPTH || is_flat(&points, tolerance) {
        out.push(points[3]);
        return;
    }
    let (left, right) = split_bezier(&points);
    flatten_bezier(left, tolerance, depth + 1, out);
    flatten_bezier(right, tolerance, depth + 1, out);
}

/// The curve lies in the hull of its control points; if both inner control
/// points are within `tolerance` of the chord, so is the curve.
fn is_flat(points: &[DVec3; 4], tolerance: f64) -> bool {
    distance_to_segment(points[1], points[0], points[3]) <= tolerance
        && distance_to_segment(points[2], points[0], points[3]) <= tolerance
}

fn split_bezier(p: &[DVec3; 4]) -> ([DVec3; 4], [DVec3; 4]) {
    let p01 = p[0].lerp(p[1], 0.5);
    let p12 = p[1].lerp(p[2], 0.5);
    let p23 = p[2].lerp(p[3], 0.5);
    let p012 = p01.lerp(p12, 0.5);
    let p123 = p12.lerp(p23, 0.5);
    let mid = p012.lerp(p123, 0.5);
    ([p[0], p01, p012, mid], [mid, p123, p23, p[3]])
}

fn distance_to_segment(point: DVec3, a: DVec3, b: DVec3) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f64::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}
