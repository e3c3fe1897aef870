//! CAD Kernel Abstraction for flatcut
//!
//! This crate provides:
//! - The [`CadKernel`] trait, the only seam through which the flattening
//!   pipeline talks to a B-rep kernel
//! - Kernel-side value types: projection planes, curves, edges, edge loops
//! - A reference kernel ([`BrepKernel`]) that reads RON B-rep documents

pub mod curve;
pub mod document;
pub mod kernel;
pub mod plane;

// Re-exports for convenience
pub use curve::Curve;
pub use document::{BodyDef, BrepDocument, FaceDef, PlaneDef, SurfaceDef};
pub use kernel::{
    BrepKernel, CadError, CadKernel, CadModel, CadObject, CadResult, Edge, EdgeLoop, FaceId,
    NullKernel, ObjectKind, PlanarFace, default_kernel,
};
pub use plane::ProjectionPlane;
