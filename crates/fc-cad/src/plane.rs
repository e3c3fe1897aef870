//! Projection planes

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::kernel::{CadError, CadResult};

/// An affine plane used to flatten 3D geometry into 2D
///
/// `x_dir`, `y_dir` and `normal` form a right-handed orthonormal frame; the
/// normal points towards the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPlane {
    /// Origin of the plane-local coordinate system
    pub origin: DVec3,
    /// Unit normal
    pub normal: DVec3,
    /// Unit in-plane U axis
    pub x_dir: DVec3,
    /// Unit in-plane V axis
    pub y_dir: DVec3,
}

impl Default for ProjectionPlane {
    fn default() -> Self {
        Self::top_down()
    }
}

impl ProjectionPlane {
    /// The XY plane seen from +Z
    pub fn top_down() -> Self {
        Self {
            origin: DVec3::ZERO,
            normal: DVec3::Z,
            x_dir: DVec3::X,
            y_dir: DVec3::Y,
        }
    }

    /// Build a plane from an origin and a normal
    ///
    /// `x_dir` is projected into the plane; when it is missing or parallel to
    /// the normal a reference axis is chosen from the normal alone, so the
    /// same normal always yields the same frame.
    pub fn from_origin_normal(
        origin: DVec3,
        normal: DVec3,
        x_dir: Option<DVec3>,
    ) -> CadResult<Self> {
        if !origin.is_finite() {
            return Err(CadError::DegenerateFace(
                "plane origin is not finite".into(),
            ));
        }
        let normal = normal.try_normalize().ok_or_else(|| {
            CadError::DegenerateFace("plane normal has zero or non-finite length".into())
        })?;

        let x_dir = x_dir
            .and_then(|dir| reject_normal(dir, normal))
            .or_else(|| reference_x_dir(normal))
            .ok_or_else(|| CadError::DegenerateFace("no in-plane axis for normal".into()))?;
        let y_dir = normal.cross(x_dir);

        Ok(Self {
            origin,
            normal,
            x_dir,
            y_dir,
        })
    }

    /// Express a world point in plane-local coordinates (u, v, depth)
    pub fn project_point(&self, point: DVec3) -> DVec3 {
        self.project_vector(point - self.origin)
    }

    /// Express a world direction in plane-local coordinates
    pub fn project_vector(&self, vector: DVec3) -> DVec3 {
        DVec3::new(
            vector.dot(self.x_dir),
            vector.dot(self.y_dir),
            vector.dot(self.normal),
        )
    }
}

/// Component of `dir` perpendicular to `normal`, normalized
fn reject_normal(dir: DVec3, normal: DVec3) -> Option<DVec3> {
    (dir - normal * normal.dot(dir)).try_normalize()
}

/// Deterministic in-plane X axis for a unit normal
///
/// World X is used unless the normal is close to it, then world Y.
pub(crate) fn reference_x_dir(normal: DVec3) -> Option<DVec3> {
    let reference = if normal.x.abs() < 0.9 {
        DVec3::X
    } else {
        DVec3::Y
    };
    reject_normal(reference, normal)
}
