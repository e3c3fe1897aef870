//! Projection plane choice
//!
//! The model is projected onto the plane of its largest flat face when one
//! exists. Any problem on that path degrades to the model's default plane
//! instead of failing the import.

use fc_cad::{CadError, CadKernel, CadModel, CadObject, EdgeLoop, ProjectionPlane};

use super::face_select::select_largest_face;
use super::{ImportError, ImportOptions};

/// Why the face-aligned projection was not used
#[derive(Debug, Clone)]
pub enum FallbackReason {
    /// Alignment switched off in the options
    Disabled,
    /// The object has no usable planar face
    NoPlanarFaces,
    /// The kernel failed to enumerate faces
    FaceQuery(CadError),
    /// The chosen face does not define a plane
    DegenerateFace(CadError),
    /// Projecting onto the face plane failed
    Projection(CadError),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::Disabled => write!(f, "auto-alignment disabled"),
            FallbackReason::NoPlanarFaces => write!(f, "no planar faces found"),
            FallbackReason::FaceQuery(e) => write!(f, "face query failed: {}", e),
            FallbackReason::DegenerateFace(e) => write!(f, "largest face has no plane: {}", e),
            FallbackReason::Projection(e) => write!(f, "face-aligned projection failed: {}", e),
        }
    }
}

/// Which plane the geometry was projected onto
#[derive(Debug, Clone)]
pub enum AlignmentOutcome {
    /// Projected onto the plane of the largest planar face
    Aligned {
        plane: ProjectionPlane,
        face_area: f64,
    },
    /// Projected onto the model's default plane
    Fallback(FallbackReason),
}

impl AlignmentOutcome {
    pub fn is_aligned(&self) -> bool {
        matches!(self, AlignmentOutcome::Aligned { .. })
    }
}

/// Projected loops and how they were obtained
#[derive(Debug, Clone)]
pub struct Projection {
    pub loops: Vec<EdgeLoop>,
    pub plane: ProjectionPlane,
    pub alignment: AlignmentOutcome,
}

/// Choose the primary object and a plane, and project
pub fn plan_projection(
    kernel: &dyn CadKernel,
    model: &CadModel,
    options: &ImportOptions,
) -> Result<Projection, ImportError> {
    let object = model
        .primary_object()
        .ok_or(ImportError::NoRecognizedGeometry)?;

    let (loops, plane, alignment) = match try_align(kernel, object, options) {
        Ok((loops, plane, face_area)) => {
            tracing::info!(
                "Aligned {} to largest face (area {:.3})",
                object.kind.name(),
                face_area
            );
            (loops, plane, AlignmentOutcome::Aligned { plane, face_area })
        }
        Err(reason) => {
            if matches!(reason, FallbackReason::Disabled) {
                tracing::debug!("Auto-alignment disabled, using default plane");
            } else {
                tracing::warn!("Could not auto-align model: {}. Using default plane.", reason);
            }
            let plane = model.default_plane();
            let loops = kernel
                .project_onto_plane(object, &plane)
                .map_err(ImportError::Kernel)?;
            (loops, plane, AlignmentOutcome::Fallback(reason))
        }
    };

    if loops.is_empty() {
        return Err(ImportError::EmptyProjection);
    }

    Ok(Projection {
        loops,
        plane,
        alignment,
    })
}

/// Project onto the largest planar face; every failure is a fallback reason
fn try_align(
    kernel: &dyn CadKernel,
    object: &CadObject,
    options: &ImportOptions,
) -> Result<(Vec<EdgeLoop>, ProjectionPlane, f64), FallbackReason> {
    if !options.auto_align {
        return Err(FallbackReason::Disabled);
    }

    let faces = kernel
        .planar_faces(object)
        .map_err(FallbackReason::FaceQuery)?;
    tracing::debug!("Found {} planar faces", faces.len());

    let face = select_largest_face(faces, options.min_face_area)
        .ok_or(FallbackReason::NoPlanarFaces)?;
    let plane = face.plane().map_err(FallbackReason::DegenerateFace)?;
    let loops = kernel
        .project_onto_plane(object, &plane)
        .map_err(FallbackReason::Projection)?;

    Ok((loops, plane, face.area))
}
