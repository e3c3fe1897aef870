//! Reference B-rep Kernel
//!
//! Reads [`BrepDocument`] files and answers the flattening queries exactly:
//! lines, conic arcs and Bezier segments stay the same curve kind under an
//! orthographic projection.
//!
//! Note: projection keeps the boundary loops of every face. Loops seen
//! edge-on collapse to zero area and are dropped, and loops that land on
//! an earlier loop (the top and bottom of a prism) are kept once. When every
//! loop of an object is seen edge-on, each one is kept as the straight
//! segment it collapses to.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use glam::{DVec2, DVec3};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::curve::Curve;
use crate::document::{BrepDocument, FaceDef, SurfaceDef};
use crate::plane::ProjectionPlane;

use super::{
    CadError, CadKernel, CadModel, CadObject, CadResult, Edge, EdgeLoop, FaceId, ObjectKind,
    PlanarFace,
};

/// Chords per non-straight curve when sampling loops for areas and identity
const CURVE_SAMPLES: usize = 64;

/// Grid used to decide whether two projected loops coincide
const KEY_RESOLUTION: f64 = 1e-6;

/// Loops whose area is below this fraction of their squared extent are edge-on
const EDGE_ON_RATIO: f64 = 1e-9;

/// Faces of one stored object
struct StoredBody {
    model_id: Uuid,
    faces: Vec<FaceDef>,
}

/// Reference kernel backed by RON B-rep documents
pub struct BrepKernel {
    /// Storage for object data (keyed by UUID)
    bodies: Mutex<HashMap<Uuid, StoredBody>>,
}

impl BrepKernel {
    /// Create a new kernel
    pub fn new() -> Self {
        Self {
            bodies: Mutex::new(HashMap::new()),
        }
    }

    /// Register an in-memory document and return its model
    pub fn load_document(&self, document: BrepDocument) -> CadModel {
        let mut model = CadModel::new(Uuid::new_v4());
        model.name = document.name;
        model.native_plane = document
            .native_plane
            .and_then(|def| match def.to_plane() {
                Ok(plane) => Some(plane),
                Err(e) => {
                    tracing::warn!("Ignoring native plane of model: {}", e);
                    None
                }
            });

        for body in document.solids {
            let object = self.store_body(model.id, ObjectKind::Solid, body.faces);
            model.solids.push(object);
        }
        for body in document.shells {
            let object = self.store_body(model.id, ObjectKind::Shell, body.faces);
            model.shells.push(object);
        }
        for face in document.faces {
            let object = self.store_body(model.id, ObjectKind::Face, vec![face]);
            model.faces.push(object);
        }

        model
    }

    /// Number of objects currently held by the kernel
    pub fn object_count(&self) -> usize {
        self.bodies.lock().len()
    }

    /// Store an object and return its handle
    fn store_body(&self, model_id: Uuid, kind: ObjectKind, faces: Vec<FaceDef>) -> CadObject {
        let id = Uuid::new_v4();
        self.bodies
            .lock()
            .insert(id, StoredBody { model_id, faces });
        CadObject::new(id, kind)
    }

    /// Run a query against a stored object
    fn with_body<T>(&self, object: &CadObject, f: impl FnOnce(&StoredBody) -> T) -> CadResult<T> {
        let bodies = self.bodies.lock();
        bodies
            .get(&object.id)
            .map(f)
            .ok_or(CadError::ObjectNotFound(object.id))
    }
}

impl Default for BrepKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl CadKernel for BrepKernel {
    fn name(&self) -> &str {
        "brep"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn parse_model(&self, path: &Path) -> CadResult<CadModel> {
        let document = BrepDocument::load(path)?;
        let model = self.load_document(document);
        tracing::debug!(
            "Parsed {} solids, {} shells, {} faces from {}",
            model.solids.len(),
            model.shells.len(),
            model.faces.len(),
            path.display()
        );
        Ok(model)
    }

    fn planar_faces(&self, object: &CadObject) -> CadResult<Vec<PlanarFace>> {
        self.with_body(object, |body| {
            body.faces
                .iter()
                .enumerate()
                .filter_map(|(index, face)| {
                    let SurfaceDef::Plane {
                        origin,
                        normal,
                        x_dir,
                    } = face.surface
                    else {
                        return None;
                    };
                    let area = face
                        .area
                        .unwrap_or_else(|| planar_face_area(face, origin, normal, x_dir));
                    let planar =
                        PlanarFace::new(FaceId::new(object.id, index as u32), origin, normal, area);
                    Some(match x_dir {
                        Some(x_dir) => planar.with_x_dir(x_dir),
                        None => planar,
                    })
                })
                .collect()
        })
    }

    fn project_onto_plane(
        &self,
        object: &CadObject,
        plane: &ProjectionPlane,
    ) -> CadResult<Vec<EdgeLoop>> {
        self.with_body(object, |body| {
            let mut seen: HashSet<Vec<(i64, i64)>> = HashSet::new();
            let mut loops = Vec::new();
            let mut collapsed = Vec::new();

            for face in &body.faces {
                for curves in face.loops.iter().filter(|l| !l.is_empty()) {
                    let projected: Vec<Curve> = curves.iter().map(|c| c.project(plane)).collect();
                    let samples = sample_loop(&projected);

                    if is_edge_on(&samples) {
                        collapsed.extend(collapsed_segment(&projected));
                        continue;
                    }
                    if !seen.insert(loop_key(&samples)) {
                        continue;
                    }
                    loops.push(EdgeLoop::from_curves(projected));
                }
            }

            if loops.is_empty() && !collapsed.is_empty() {
                tracing::debug!(
                    "All {} loops of {} {} are edge-on, keeping them as segments",
                    collapsed.len(),
                    object.kind.name(),
                    object.id
                );
                for (start, end) in collapsed {
                    if seen.insert(loop_key(&[start.truncate(), end.truncate()])) {
                        loops.push(EdgeLoop::from_curves([Curve::line(start, end)]));
                    }
                }
            }

            tracing::debug!(
                "Projected {} {} onto plane with normal {:?}: {} loops",
                object.kind.name(),
                object.id,
                plane.normal,
                loops.len()
            );
            loops
        })
    }

    fn discretize(&self, edge: &Edge, tolerance: f64) -> CadResult<Vec<DVec3>> {
        edge.curve.discretize(tolerance)
    }

    fn release_model(&self, model: &CadModel) {
        self.bodies
            .lock()
            .retain(|_, body| body.model_id != model.id);
    }
}

/// Area of a planar face: outer loop minus holes, measured in the face plane
fn planar_face_area(face: &FaceDef, origin: DVec3, normal: DVec3, x_dir: Option<DVec3>) -> f64 {
    let Ok(plane) = ProjectionPlane::from_origin_normal(origin, normal, x_dir) else {
        return 0.0;
    };

    let mut areas = face.loops.iter().map(|curves| {
        let projected: Vec<Curve> = curves.iter().map(|c| c.project(&plane)).collect();
        polygon_area(&sample_loop(&projected)).abs()
    });

    let outer = areas.next().unwrap_or(0.0);
    let holes: f64 = areas.sum();
    (outer - holes).max(0.0)
}

/// Sample a closed loop in plane-local XY, one point per chord start
fn sample_loop(curves: &[Curve]) -> Vec<DVec2> {
    sample_points(curves).iter().map(|p| p.truncate()).collect()
}

fn sample_points(curves: &[Curve]) -> Vec<DVec3> {
    let mut points = Vec::new();
    for curve in curves {
        let segments = match curve {
            Curve::Line { .. } => 1,
            _ => CURVE_SAMPLES,
        };
        for i in 0..segments {
            let point = curve.point_at(i as f64 / segments as f64);
            if point.is_finite() {
                points.push(point);
            }
        }
    }
    points
}

/// Segment a loop seen edge-on collapses to: its two samples farthest apart
/// in the plane
fn collapsed_segment(curves: &[Curve]) -> Option<(DVec3, DVec3)> {
    let mut points = sample_points(curves);
    if let Some(end) = curves.last().map(Curve::end_point).filter(|p| p.is_finite()) {
        points.push(end);
    }

    let mut best: Option<(DVec3, DVec3, f64)> = None;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            let distance = a.truncate().distance_squared(b.truncate());
            if best.is_none_or(|(_, _, max)| distance > max) {
                best = Some((*a, *b, distance));
            }
        }
    }
    best.map(|(a, b, _)| (a, b))
}

/// Signed shoelace area of a closed polygon
fn polygon_area(points: &[DVec2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let twice: f64 = (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum();
    twice * 0.5
}

fn is_edge_on(samples: &[DVec2]) -> bool {
    if samples.len() < 3 {
        return true;
    }
    let (min, max) = samples.iter().fold(
        (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
        |(min, max), p| (min.min(*p), max.max(*p)),
    );
    let extent = (max - min).length();
    polygon_area(samples).abs() <= EDGE_ON_RATIO * extent * extent
}

/// Orientation-independent identity of a projected loop
fn loop_key(samples: &[DVec2]) -> Vec<(i64, i64)> {
    let mut key: Vec<(i64, i64)> = samples
        .iter()
        .map(|p| {
            (
                (p.x / KEY_RESOLUTION).round() as i64,
                (p.y / KEY_RESOLUTION).round() as i64,
            )
        })
        .collect();
    key.sort_unstable();
    key.dedup();
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BodyDef;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn cuboid_document() -> BrepDocument {
        BrepDocument {
            solids: vec![BodyDef::cuboid(DVec3::ZERO, DVec3::new(4.0, 2.0, 1.0))],
            ..Default::default()
        }
    }

    fn loop_points(edge_loop: &EdgeLoop) -> Vec<DVec3> {
        edge_loop
            .edges
            .iter()
            .map(|e| e.start_point().unwrap())
            .collect()
    }

    #[test]
    fn test_cuboid_face_areas() {
        let kernel = BrepKernel::new();
        let model = kernel.load_document(cuboid_document());
        let solid = model.primary_object().unwrap();

        let faces = kernel.planar_faces(solid).unwrap();
        let areas: Vec<f64> = faces.iter().map(|f| f.area).collect();
        assert_eq!(faces.len(), 6);
        for (area, expected) in areas.iter().zip([8.0, 8.0, 4.0, 4.0, 2.0, 2.0]) {
            assert_relative_eq!(*area, expected, epsilon = 1e-9);
        }
        assert_eq!(faces[3].id, FaceId::new(solid.id, 3));
    }

    #[test]
    fn test_face_area_subtracts_holes() {
        let outer = vec![
            Curve::line(DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0)),
            Curve::line(DVec3::new(10.0, 0.0, 0.0), DVec3::new(10.0, 10.0, 0.0)),
            Curve::line(DVec3::new(10.0, 10.0, 0.0), DVec3::new(0.0, 10.0, 0.0)),
            Curve::line(DVec3::new(0.0, 10.0, 0.0), DVec3::ZERO),
        ];
        let hole = vec![Curve::circle(DVec3::new(5.0, 5.0, 0.0), DVec3::Z, 2.0)];
        let document = BrepDocument {
            faces: vec![FaceDef::planar(DVec3::ZERO, DVec3::Z, vec![outer, hole])],
            ..Default::default()
        };

        let kernel = BrepKernel::new();
        let model = kernel.load_document(document);
        let faces = kernel.planar_faces(&model.faces[0]).unwrap();
        assert_relative_eq!(faces[0].area, 100.0 - PI * 4.0, epsilon = 0.05);
    }

    #[test]
    fn test_explicit_area_wins() {
        let document = BrepDocument {
            faces: vec![FaceDef::planar(DVec3::ZERO, DVec3::Z, Vec::new()).with_area(42.0)],
            ..Default::default()
        };
        let kernel = BrepKernel::new();
        let model = kernel.load_document(document);
        assert_eq!(kernel.planar_faces(&model.faces[0]).unwrap()[0].area, 42.0);
    }

    #[test]
    fn test_planar_face_keeps_preferred_x_dir() {
        let mut face = FaceDef::planar(DVec3::ZERO, DVec3::Z, Vec::new()).with_area(1.0);
        face.surface = SurfaceDef::Plane {
            origin: DVec3::ZERO,
            normal: DVec3::Z,
            x_dir: Some(DVec3::Y),
        };
        let kernel = BrepKernel::new();
        let model = kernel.load_document(BrepDocument {
            faces: vec![face],
            ..Default::default()
        });

        let faces = kernel.planar_faces(&model.faces[0]).unwrap();
        assert_eq!(faces[0].x_dir, Some(DVec3::Y));
        assert_relative_eq!(faces[0].plane().unwrap().x_dir, DVec3::Y, epsilon = 1e-12);
    }

    #[test]
    fn test_top_down_projection_of_cuboid() {
        let kernel = BrepKernel::new();
        let model = kernel.load_document(cuboid_document());
        let solid = model.primary_object().unwrap();

        let loops = kernel
            .project_onto_plane(solid, &ProjectionPlane::top_down())
            .unwrap();
        // Side faces are edge-on, top and bottom coincide
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 4);
        let points = loop_points(&loops[0]);
        assert!(points.contains(&DVec3::new(4.0, 2.0, 0.0)));
    }

    #[test]
    fn test_front_projection_of_cuboid() {
        let kernel = BrepKernel::new();
        let model = kernel.load_document(cuboid_document());
        let solid = model.primary_object().unwrap();
        let front = ProjectionPlane::from_origin_normal(DVec3::ZERO, -DVec3::Y, None).unwrap();

        let loops = kernel.project_onto_plane(solid, &front).unwrap();
        assert_eq!(loops.len(), 1);
        let (min, max) = loop_points(&loops[0])
            .iter()
            .fold((DVec2::splat(f64::MAX), DVec2::splat(f64::MIN)), |(lo, hi), p| {
                (lo.min(p.truncate()), hi.max(p.truncate()))
            });
        assert_relative_eq!(max.x - min.x, 4.0, epsilon = 1e-12);
        assert_relative_eq!(max.y - min.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cylinder_shell_has_no_planar_faces() {
        let document = BrepDocument {
            shells: vec![BodyDef::cylinder_shell(DVec3::ZERO, 3.0, 10.0)],
            ..Default::default()
        };
        let kernel = BrepKernel::new();
        let model = kernel.load_document(document);
        let shell = model.primary_object().unwrap();
        assert_eq!(shell.kind, ObjectKind::Shell);
        assert!(kernel.planar_faces(shell).unwrap().is_empty());

        let loops = kernel
            .project_onto_plane(shell, &ProjectionPlane::top_down())
            .unwrap();
        assert_eq!(loops.len(), 1);
        assert!(matches!(loops[0].edges[0].curve, Curve::Arc { .. }));
    }

    fn lying_cylinder_document() -> BrepDocument {
        BrepDocument {
            shells: vec![BodyDef::new(vec![FaceDef::curved(vec![
                vec![Curve::circle(DVec3::ZERO, DVec3::X, 5.0)],
                vec![Curve::circle(DVec3::new(12.0, 0.0, 0.0), DVec3::X, 5.0)],
            ])])],
            ..Default::default()
        }
    }

    #[test]
    fn test_edge_on_loops_become_segments_when_nothing_else_is_left() {
        let kernel = BrepKernel::new();
        let model = kernel.load_document(lying_cylinder_document());
        let shell = model.primary_object().unwrap();

        let loops = kernel
            .project_onto_plane(shell, &ProjectionPlane::top_down())
            .unwrap();
        assert_eq!(loops.len(), 2);
        for (edge_loop, x) in loops.iter().zip([0.0, 12.0]) {
            assert_eq!(edge_loop.len(), 1);
            let Curve::Line { start, end } = edge_loop.edges[0].curve else {
                panic!("expected a line, got {:?}", edge_loop.edges[0].curve);
            };
            assert_relative_eq!(start.x, x, epsilon = 1e-9);
            assert_relative_eq!(end.x, x, epsilon = 1e-9);
            assert_relative_eq!((end.y - start.y).abs(), 10.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_coinciding_edge_on_loops_are_kept_once() {
        let document = BrepDocument {
            shells: vec![BodyDef::new(vec![FaceDef::curved(vec![
                vec![Curve::circle(DVec3::new(0.0, 0.0, 1.0), DVec3::X, 5.0)],
                vec![Curve::circle(DVec3::new(0.0, 0.0, 1.0), -DVec3::X, 5.0)],
            ])])],
            ..Default::default()
        };
        let kernel = BrepKernel::new();
        let model = kernel.load_document(document);
        let loops = kernel
            .project_onto_plane(model.primary_object().unwrap(), &ProjectionPlane::top_down())
            .unwrap();
        assert_eq!(loops.len(), 1);
    }

    #[test]
    fn test_release_model_drops_storage() {
        let kernel = BrepKernel::new();
        let first = kernel.load_document(cuboid_document());
        let second = kernel.load_document(cuboid_document());
        assert_eq!(kernel.object_count(), 2);

        kernel.release_model(&first);
        assert_eq!(kernel.object_count(), 1);
        assert!(matches!(
            kernel.planar_faces(&first.solids[0]),
            Err(CadError::ObjectNotFound(_))
        ));
        assert!(kernel.planar_faces(&second.solids[0]).is_ok());
    }

    #[test]
    fn test_parse_model_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.ron");
        let mut document = cuboid_document();
        document.name = Some("block".into());
        document.save(&path).unwrap();

        let kernel = BrepKernel::new();
        let model = kernel.parse_model(&path).unwrap();
        assert_eq!(model.name.as_deref(), Some("block"));
        assert_eq!(model.solids.len(), 1);
    }

    #[test]
    fn test_parse_model_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.ron");
        std::fs::write(&path, b"ISO-10303-21; not a ron file").unwrap();

        let kernel = BrepKernel::new();
        assert!(matches!(
            kernel.parse_model(&path),
            Err(CadError::Parse(_))
        ));
    }

    #[test]
    fn test_loop_key_ignores_orientation() {
        let a = [DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::Y];
        let b = [DVec2::Y, DVec2::ONE, DVec2::X, DVec2::ZERO];
        assert_eq!(loop_key(&a), loop_key(&b));
        assert_relative_eq!(polygon_area(&a), 1.0);
        assert_relative_eq!(polygon_area(&b), -1.0);
    }
}
