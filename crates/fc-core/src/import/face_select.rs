//! Largest planar face selection

use fc_cad::PlanarFace;

/// Pick the planar face with the largest area
///
/// Faces with a non-finite or negative area, or an area below
/// `min_face_area`, are never chosen. On equal areas the face enumerated
/// first wins.
pub fn select_largest_face(faces: Vec<PlanarFace>, min_face_area: f64) -> Option<PlanarFace> {
    let mut candidates: Vec<PlanarFace> = faces
        .into_iter()
        .filter(|face| face.area.is_finite() && face.area >= 0.0 && face.area >= min_face_area)
        .collect();

    // Stable: equal areas keep enumeration order
    candidates.sort_by(|a, b| b.area.total_cmp(&a.area));
    candidates.into_iter().next()
}
