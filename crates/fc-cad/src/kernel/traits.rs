//! CAD Kernel trait definitions
//!
//! These traits define the interface that all CAD kernels must implement.
//! The flattening pipeline needs exactly five capabilities from a kernel:
//! parsing a file, resolving the primary object of a model, enumerating flat
//! faces, projecting an object onto a plane and discretizing an edge.

use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::curve::Curve;
use crate::plane::ProjectionPlane;

/// Topological class of a top-level object in a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Closed volume
    Solid,
    /// Connected set of faces without a volume
    Shell,
    /// Loose face
    Face,
}

impl ObjectKind {
    /// Human readable name
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Solid => "solid",
            ObjectKind::Shell => "shell",
            ObjectKind::Face => "face",
        }
    }
}

/// Handle to a 3D object owned by a kernel
///
/// The geometry behind the handle lives in the kernel; the handle is only
/// meaningful to the kernel that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CadObject {
    /// Unique identifier of the object inside its kernel
    pub id: Uuid,
    /// Topological class
    pub kind: ObjectKind,
}

impl CadObject {
    /// Create a new object handle
    pub fn new(id: Uuid, kind: ObjectKind) -> Self {
        Self { id, kind }
    }
}

/// Unique identifier for a face within an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceId {
    /// ID of the object this face belongs to
    pub object_id: Uuid,
    /// Index of the face within the object
    pub index: u32,
}

impl FaceId {
    /// Create a new face ID
    pub fn new(object_id: Uuid, index: u32) -> Self {
        Self { object_id, index }
    }
}

/// A face known to be flat
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarFace {
    /// Unique identifier for this face
    pub id: FaceId,
    /// A point on the face plane
    pub origin: DVec3,
    /// Outward normal of the face
    pub normal: DVec3,
    /// Preferred in-plane X direction, if the kernel knows one
    pub x_dir: Option<DVec3>,
    /// Surface area
    pub area: f64,
}

impl PlanarFace {
    /// Create a new planar face
    pub fn new(id: FaceId, origin: DVec3, normal: DVec3, area: f64) -> Self {
        Self {
            id,
            origin,
            normal,
            x_dir: None,
            area,
        }
    }

    /// Set the preferred in-plane X direction
    pub fn with_x_dir(mut self, x_dir: DVec3) -> Self {
        self.x_dir = Some(x_dir);
        self
    }

    /// Derive the coordinate plane of this face
    pub fn plane(&self) -> CadResult<ProjectionPlane> {
        ProjectionPlane::from_origin_normal(self.origin, self.normal, self.x_dir)
    }
}

/// One curve segment of an edge loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Underlying curve
    pub curve: Curve,
}

impl Edge {
    /// Create an edge from a curve
    pub fn new(curve: Curve) -> Self {
        Self { curve }
    }

    /// Evaluate the start point of the edge
    pub fn start_point(&self) -> CadResult<DVec3> {
        let point = self.curve.start_point();
        if point.is_finite() {
            Ok(point)
        } else {
            Err(CadError::DegenerateCurve(
                "edge start point is not finite".into(),
            ))
        }
    }

    /// Evaluate the end point of the edge
    pub fn end_point(&self) -> CadResult<DVec3> {
        let point = self.curve.end_point();
        if point.is_finite() {
            Ok(point)
        } else {
            Err(CadError::DegenerateCurve("edge end point is not finite".into()))
        }
    }
}

impl From<Curve> for Edge {
    fn from(curve: Curve) -> Self {
        Self::new(curve)
    }
}

/// An ordered, closed sequence of edges
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeLoop {
    /// Edges in traversal order
    pub edges: Vec<Edge>,
}

impl EdgeLoop {
    /// Create a loop from edges
    pub fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    /// Create a loop from bare curves
    pub fn from_curves(curves: impl IntoIterator<Item = Curve>) -> Self {
        Self {
            edges: curves.into_iter().map(Edge::new).collect(),
        }
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check if the loop has no edges
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// A parsed 3D model
#[derive(Debug, Clone)]
pub struct CadModel {
    /// Unique identifier of the model inside its kernel
    pub id: Uuid,
    /// Name stored in the file, if any
    pub name: Option<String>,
    /// Solid bodies
    pub solids: Vec<CadObject>,
    /// Shells (surface bodies)
    pub shells: Vec<CadObject>,
    /// Loose faces
    pub faces: Vec<CadObject>,
    /// Projection plane declared by the file itself
    pub native_plane: Option<ProjectionPlane>,
}

impl CadModel {
    /// Create an empty model
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            solids: Vec::new(),
            shells: Vec::new(),
            faces: Vec::new(),
            native_plane: None,
        }
    }

    /// Resolve the object carrying the most topological information
    ///
    /// Solids take precedence over shells, shells over loose faces.
    pub fn primary_object(&self) -> Option<&CadObject> {
        if let Some(solid) = self.solids.first() {
            return Some(solid);
        }
        tracing::info!("No solids found, looking for shells...");

        if let Some(shell) = self.shells.first() {
            return Some(shell);
        }
        tracing::info!("No shells found, looking for faces...");

        self.faces.first()
    }

    /// Plane used when no face-aligned plane is available
    pub fn default_plane(&self) -> ProjectionPlane {
        self.native_plane.unwrap_or_else(ProjectionPlane::top_down)
    }

    /// Iterate over all objects, solids first
    pub fn objects(&self) -> impl Iterator<Item = &CadObject> {
        self.solids
            .iter()
            .chain(self.shells.iter())
            .chain(self.faces.iter())
    }

    /// Check if the model has no objects at all
    pub fn is_empty(&self) -> bool {
        self.solids.is_empty() && self.shells.is_empty() && self.faces.is_empty()
    }
}

/// Error type for CAD kernel operations
#[derive(Debug, Clone, Error)]
pub enum CadError {
    #[error("Kernel not available: {0}")]
    KernelNotAvailable(String),

    #[error("File I/O error: {0}")]
    FileIo(String),

    #[error("Failed to parse model: {0}")]
    Parse(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(Uuid),

    #[error("Degenerate face: {0}")]
    DegenerateFace(String),

    #[error("Degenerate curve: {0}")]
    DegenerateCurve(String),

    #[error("Invalid tolerance: {0}")]
    InvalidTolerance(f64),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for CAD operations
pub type CadResult<T> = Result<T, CadError>;

/// The main CAD kernel trait
///
/// Implementations of this trait provide the actual geometry operations
/// using different backends.
pub trait CadKernel: Send + Sync {
    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Check if the kernel is available
    fn is_available(&self) -> bool;

    /// Decode a model file
    ///
    /// # Arguments
    /// * `path` - Path to the model file
    fn parse_model(&self, path: &Path) -> CadResult<CadModel>;

    /// Enumerate the flat faces of an object, with their areas
    ///
    /// # Arguments
    /// * `object` - The object to query
    fn planar_faces(&self, object: &CadObject) -> CadResult<Vec<PlanarFace>>;

    /// Flatten an object onto a plane
    ///
    /// The returned edges are expressed in plane-local coordinates
    /// (u, v, depth along the normal).
    ///
    /// # Arguments
    /// * `object` - The object to project
    /// * `plane` - The target plane
    fn project_onto_plane(
        &self,
        object: &CadObject,
        plane: &ProjectionPlane,
    ) -> CadResult<Vec<EdgeLoop>>;

    /// Approximate an edge as a polyline
    ///
    /// # Arguments
    /// * `edge` - The edge to approximate
    /// * `tolerance` - Maximum distance between the polyline and the curve
    fn discretize(&self, edge: &Edge, tolerance: f64) -> CadResult<Vec<DVec3>>;

    /// Drop any kernel-side storage held for a model
    fn release_model(&self, _model: &CadModel) {}
}

/// A null kernel that always returns errors (used when no kernel is available)
#[derive(Debug, Default)]
pub struct NullKernel;

impl CadKernel for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn parse_model(&self, _path: &Path) -> CadResult<CadModel> {
        Err(CadError::KernelNotAvailable(
            "No CAD kernel available".into(),
        ))
    }

    fn planar_faces(&self, _object: &CadObject) -> CadResult<Vec<PlanarFace>> {
        Err(CadError::KernelNotAvailable(
            "No CAD kernel available".into(),
        ))
    }

    fn project_onto_plane(
        &self,
        _object: &CadObject,
        _plane: &ProjectionPlane,
    ) -> CadResult<Vec<EdgeLoop>> {
        Err(CadError::KernelNotAvailable(
            "No CAD kernel available".into(),
        ))
    }

    fn discretize(&self, _edge: &Edge, _tolerance: f64) -> CadResult<Vec<DVec3>> {
        Err(CadError::KernelNotAvailable(
            "No CAD kernel available".into(),
        ))
    }
}

/// Get the default CAD kernel
pub fn default_kernel() -> Box<dyn CadKernel> {
    Box::new(super::BrepKernel::new())
}
