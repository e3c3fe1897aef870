//! Flattening pipeline for flatcut
//!
//! This crate provides:
//! - Model import: face-aligned projection of a CAD model into a normalized
//!   2D outline ([`import::StepImporter`])
//! - 2D path geometry and transform helpers
//! - The payload handed to the host application
//! - SVG export of imported outlines

pub mod export;
pub mod geometry;
pub mod import;
pub mod payload;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use export::{ExportError, geometry_to_svg, payload_to_svg};
pub use geometry::{Bounds2D, PathBuilder, PathGeometry, Subpath};
pub use import::{
    AlignmentOutcome, FallbackReason, ImportError, ImportOptions, ImportOutcome, OptionsError,
    StepImporter,
};
pub use payload::{ImportPayload, SourceAsset, SourceAssetSegment, VectorizationSpec, WorkPiece};
