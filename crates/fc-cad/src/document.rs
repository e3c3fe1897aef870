//! B-rep document format read by [`BrepKernel`](crate::BrepKernel)
//!
//! A document is a RON file listing solids, shells and loose faces. Each face
//! carries its surface type and its boundary loops as explicit curves.

use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::kernel::{CadError, CadResult};
use crate::plane::ProjectionPlane;

/// Serialized B-rep model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrepDocument {
    /// Model name
    #[serde(default)]
    pub name: Option<String>,
    /// Projection plane declared by the model
    #[serde(default)]
    pub native_plane: Option<PlaneDef>,
    /// Solid bodies
    #[serde(default)]
    pub solids: Vec<BodyDef>,
    /// Shells (surface bodies)
    #[serde(default)]
    pub shells: Vec<BodyDef>,
    /// Loose faces
    #[serde(default)]
    pub faces: Vec<FaceDef>,
}

impl BrepDocument {
    /// Parse a document from RON text
    pub fn from_ron_str(content: &str) -> CadResult<Self> {
        ron::from_str(content).map_err(|e| CadError::Parse(e.to_string()))
    }

    /// Serialize the document to RON text
    pub fn to_ron_string(&self) -> CadResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| CadError::OperationFailed(e.to_string()))
    }

    /// Load a document from a file
    pub fn load(path: impl AsRef<Path>) -> CadResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CadError::FileIo(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save the document to a file
    pub fn save(&self, path: impl AsRef<Path>) -> CadResult<()> {
        let content = self.to_ron_string()?;
        std::fs::write(path, content).map_err(|e| CadError::FileIo(e.to_string()))
    }
}

/// Serialized plane (origin, normal, optional in-plane X axis)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneDef {
    /// A point on the plane
    pub origin: DVec3,
    /// Plane normal
    pub normal: DVec3,
    /// Preferred in-plane X axis
    #[serde(default)]
    pub x_dir: Option<DVec3>,
}

impl PlaneDef {
    /// Resolve to a projection plane
    pub fn to_plane(&self) -> CadResult<ProjectionPlane> {
        ProjectionPlane::from_origin_normal(self.origin, self.normal, self.x_dir)
    }
}

/// A solid or shell: a list of faces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyDef {
    /// Body name
    #[serde(default)]
    pub name: Option<String>,
    /// Faces of the body
    pub faces: Vec<FaceDef>,
}

impl BodyDef {
    /// Create a body from faces
    pub fn new(faces: Vec<FaceDef>) -> Self {
        Self { name: None, faces }
    }

    /// Axis-aligned box with one corner at `min`
    pub fn cuboid(min: DVec3, size: DVec3) -> Self {
        let max = min + size;
        let corner = |x: f64, y: f64, z: f64| DVec3::new(x, y, z);
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);

        let faces = vec![
            FaceDef::planar(
                min,
                -DVec3::Z,
                vec![quad(
                    corner(x0, y0, z0),
                    corner(x0, y1, z0),
                    corner(x1, y1, z0),
                    corner(x1, y0, z0),
                )],
            ),
            FaceDef::planar(
                max,
                DVec3::Z,
                vec![quad(
                    corner(x0, y0, z1),
                    corner(x1, y0, z1),
                    corner(x1, y1, z1),
                    corner(x0, y1, z1),
                )],
            ),
            FaceDef::planar(
                min,
                -DVec3::Y,
                vec![quad(
                    corner(x0, y0, z0),
                    corner(x1, y0, z0),
                    corner(x1, y0, z1),
                    corner(x0, y0, z1),
                )],
            ),
            FaceDef::planar(
                max,
                DVec3::Y,
                vec![quad(
                    corner(x0, y1, z0),
                    corner(x0, y1, z1),
                    corner(x1, y1, z1),
                    corner(x1, y1, z0),
                )],
            ),
            FaceDef::planar(
                min,
                -DVec3::X,
                vec![quad(
                    corner(x0, y0, z0),
                    corner(x0, y0, z1),
                    corner(x0, y1, z1),
                    corner(x0, y1, z0),
                )],
            ),
            FaceDef::planar(
                max,
                DVec3::X,
                vec![quad(
                    corner(x1, y0, z0),
                    corner(x1, y1, z0),
                    corner(x1, y1, z1),
                    corner(x1, y0, z1),
                )],
            ),
        ];

        Self::new(faces)
    }

    /// Open cylindrical shell around the Z axis through `base_center`
    ///
    /// The shell has a single curved face bounded by two circles.
    pub fn cylinder_shell(base_center: DVec3, radius: f64, height: f64) -> Self {
        let top_center = base_center + DVec3::Z * height;
        Self::new(vec![FaceDef::curved(vec![
            vec![Curve::circle(base_center, DVec3::Z, radius)],
            vec![Curve::circle(top_center, DVec3::Z, radius)],
        ])])
    }
}

/// Surface type of a face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SurfaceDef {
    /// Flat face
    Plane {
        /// A point on the plane
        origin: DVec3,
        /// Outward normal
        normal: DVec3,
        /// Preferred in-plane X axis
        #[serde(default)]
        x_dir: Option<DVec3>,
    },
    /// Any non-planar surface
    Curved,
}

/// A face: surface plus boundary loops (first loop is the outer boundary)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDef {
    /// Surface type
    pub surface: SurfaceDef,
    /// Explicit area; computed from the loops when absent
    #[serde(default)]
    pub area: Option<f64>,
    /// Boundary loops
    pub loops: Vec<Vec<Curve>>,
}

impl FaceDef {
    /// Create a planar face
    pub fn planar(origin: DVec3, normal: DVec3, loops: Vec<Vec<Curve>>) -> Self {
        Self {
            surface: SurfaceDef::Plane {
                origin,
                normal,
                x_dir: None,
            },
            area: None,
            loops,
        }
    }

    /// Create a non-planar face
    pub fn curved(loops: Vec<Vec<Curve>>) -> Self {
        Self {
            surface: SurfaceDef::Curved,
            area: None,
            loops,
        }
    }

    /// Override the computed area
    pub fn with_area(mut self, area: f64) -> Self {
        self.area = Some(area);
        self
    }

    /// Check if the face is flat
    pub fn is_planar(&self) -> bool {
        matches!(self.surface, SurfaceDef::Plane { .. })
    }
}

/// Closed loop of four straight edges
fn quad(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> Vec<Curve> {
    vec![
        Curve::line(a, b),
        Curve::line(b, c),
        Curve::line(c, d),
        Curve::line(d, a),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_has_six_closed_planar_faces() {
        let body = BodyDef::cuboid(DVec3::ZERO, DVec3::new(4.0, 2.0, 1.0));
        assert_eq!(body.faces.len(), 6);
        for face in &body.faces {
            assert!(face.is_planar());
            let edges = &face.loops[0];
            assert_eq!(edges.len(), 4);
            assert_eq!(edges[0].start_point(), edges[3].end_point());
        }
    }

    #[test]
    fn test_document_ron_round_trip() {
        let document = BrepDocument {
            name: Some("bracket".into()),
            native_plane: Some(PlaneDef {
                origin: DVec3::ZERO,
                normal: DVec3::Y,
                x_dir: None,
            }),
            solids: vec![BodyDef::cuboid(DVec3::ZERO, DVec3::ONE)],
            shells: vec![BodyDef::cylinder_shell(DVec3::ZERO, 2.0, 5.0)],
            faces: Vec::new(),
        };

        let text = document.to_ron_string().unwrap();
        let parsed = BrepDocument::from_ron_str(&text).unwrap();
        assert_eq!(parsed, document);
    }

    #[test]
    fn test_parse_handwritten_document() {
        let text = r#"(
            name: Some("plate"),
            faces: [
                (
                    surface: Plane(origin: (0.0, 0.0, 0.0), normal: (0.0, 0.0, 1.0)),
                    loops: [[
                        Line(start: (0.0, 0.0, 0.0), end: (10.0, 0.0, 0.0)),
                        Arc(
                            center: (10.0, 5.0, 0.0),
                            x_axis: (5.0, 0.0, 0.0),
                            y_axis: (0.0, 5.0, 0.0),
                            start_angle: -1.5707963267948966,
                            end_angle: 1.5707963267948966,
                        ),
                        Line(start: (10.0, 10.0, 0.0), end: (0.0, 10.0, 0.0)),
                        Line(start: (0.0, 10.0, 0.0), end: (0.0, 0.0, 0.0)),
                    ]],
                ),
            ],
        )"#;

        let document = BrepDocument::from_ron_str(text).unwrap();
        assert_eq!(document.name.as_deref(), Some("plate"));
        assert!(document.solids.is_empty());
        assert_eq!(document.faces.len(), 1);
        assert_eq!(document.faces[0].loops[0].len(), 4);
        assert!(document.faces[0].is_planar());
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let result = BrepDocument::from_ron_str("(solids: [ (faces: 3) ])");
        assert!(matches!(result, Err(CadError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = BrepDocument::load(dir.path().join("missing.ron"));
        assert!(matches!(result, Err(CadError::FileIo(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.ron");
        let document = BrepDocument {
            solids: vec![BodyDef::cuboid(DVec3::ZERO, DVec3::ONE)],
            ..Default::default()
        };
        document.save(&path).unwrap();
        assert_eq!(BrepDocument::load(&path).unwrap(), document);
    }
}
