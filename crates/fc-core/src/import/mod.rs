//! Model import
//!
//! Turns the bytes of a CAD file into a normalized 2D outline: the model is
//! parsed by a [`CadKernel`], projected onto the plane of its largest flat
//! face, discretized into polylines and moved into unit space.

mod align;
mod assemble;
mod discretize;
mod face_select;
mod normalize;
mod options;
mod scratch;

use std::path::Path;
use std::sync::{Arc, Once};

use fc_cad::{CadError, CadKernel, CadModel, default_kernel};

use crate::payload::{
    ImportPayload, SourceAsset, SourceAssetSegment, VectorizationSpec, WorkPiece, display_name,
};

pub use align::{AlignmentOutcome, FallbackReason, Projection, plan_projection};
pub use assemble::{Assembly, assemble_paths};
pub use discretize::{DiscretizeError, discretize_edge};
pub use face_select::select_largest_face;
pub use normalize::{Normalized, normalize};
pub use options::{DEFAULT_TOLERANCE, ImportOptions, OptionsError};

static KERNEL_UNAVAILABLE: Once = Once::new();

/// Errors that can occur during model import
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImportError {
    #[error("CAD kernel '{0}' is not available")]
    KernelUnavailable(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("CAD kernel error: {0}")]
    Kernel(#[from] CadError),

    #[error("Invalid import options: {0}")]
    Options(#[from] OptionsError),

    #[error("No recognized geometry found in model")]
    NoRecognizedGeometry,

    #[error("Projection resulted in no geometry")]
    EmptyProjection,

    #[error("Geometry extraction failed")]
    EmptyGeometry,
}

/// A successful import with diagnostics
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub payload: ImportPayload,
    pub alignment: AlignmentOutcome,
    /// Edges discretized successfully
    pub edges_processed: usize,
    /// Edges returned by the projection
    pub edges_total: usize,
}

/// Releases kernel storage for a model when dropped
struct ModelGuard<'a> {
    kernel: &'a dyn CadKernel,
    model: CadModel,
}

impl Drop for ModelGuard<'_> {
    fn drop(&mut self) {
        self.kernel.release_model(&self.model);
    }
}

/// Importer for 3D CAD models
pub struct StepImporter {
    kernel: Arc<dyn CadKernel>,
    options: ImportOptions,
}

impl StepImporter {
    /// Name shown to users when picking an importer
    pub const LABEL: &'static str = "STEP (Auto-Align)";

    /// File extensions routed to this importer
    ///
    /// The reference kernel recognizes its documents by content, so model
    /// files keep their STEP extension; `.ron` is its native one.
    pub const EXTENSIONS: &'static [&'static str] = &[".step", ".stp", ".ron"];

    /// MIME types routed to this importer
    pub const MIME_TYPES: &'static [&'static str] =
        &["application/step", "model/step", "text/plain"];

    /// Check whether a file name carries one of [`Self::EXTENSIONS`]
    pub fn handles(path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        Self::EXTENSIONS
            .iter()
            .any(|known| known.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Create an importer over a kernel
    pub fn new(kernel: Arc<dyn CadKernel>, options: ImportOptions) -> Self {
        Self { kernel, options }
    }

    /// Create an importer over the default kernel
    pub fn with_default_kernel(options: ImportOptions) -> Self {
        Self::new(Arc::from(default_kernel()), options)
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Kernel the importer parses with
    pub fn kernel(&self) -> &dyn CadKernel {
        self.kernel.as_ref()
    }

    /// Import a model for the host application
    ///
    /// Returns `None` on any failure; details go to the log only. The
    /// vectorization spec is accepted for interface parity: model outlines
    /// are always passed through.
    pub fn get_doc_items(
        &self,
        raw_data: &[u8],
        source_file: &Path,
        vectorization: Option<VectorizationSpec>,
    ) -> Option<ImportPayload> {
        if let Some(spec) = vectorization {
            tracing::debug!("Vectorization {:?} ignored for model import", spec);
        }

        match self.try_import(raw_data, source_file) {
            Ok(outcome) => Some(outcome.payload),
            Err(ImportError::KernelUnavailable(name)) => {
                KERNEL_UNAVAILABLE.call_once(|| {
                    tracing::error!(
                        "Model import is unavailable: CAD kernel '{}' could not be loaded",
                        name
                    );
                });
                None
            }
            Err(e) => {
                tracing::error!("Failed to import {}: {}", source_file.display(), e);
                None
            }
        }
    }

    /// Import a model, returning the typed error on failure
    pub fn try_import(
        &self,
        raw_data: &[u8],
        source_file: &Path,
    ) -> Result<ImportOutcome, ImportError> {
        let kernel = self.kernel.as_ref();
        if !kernel.is_available() {
            return Err(ImportError::KernelUnavailable(kernel.name().to_string()));
        }
        self.options.validate()?;

        let model = scratch::parse_bytes(kernel, raw_data, source_file)?;
        let guard = ModelGuard { kernel, model };

        let projection = plan_projection(kernel, &guard.model, &self.options)?;
        let assembly = assemble_paths(kernel, &projection.loops, self.options.tolerance);
        if assembly.geometry.is_empty() {
            return Err(ImportError::EmptyGeometry);
        }
        tracing::info!(
            "Processed {} of {} edges into {} paths",
            assembly.edges_processed,
            assembly.edges_total,
            assembly.geometry.subpaths().len()
        );

        let normalized = normalize(&assembly.geometry, self.options.flip_y)?;
        drop(guard);

        let payload = package(raw_data, source_file, normalized);
        Ok(ImportOutcome {
            payload,
            alignment: projection.alignment,
            edges_processed: assembly.edges_processed,
            edges_total: assembly.edges_total,
        })
    }
}

/// Wrap normalized geometry into a source asset and one workpiece
fn package(raw_data: &[u8], source_file: &Path, normalized: Normalized) -> ImportPayload {
    let size = normalized.size();
    let source = SourceAsset::vector(source_file, raw_data.to_vec(), size);

    let workpiece = WorkPiece {
        uid: uuid::Uuid::new_v4(),
        name: display_name(source_file),
        segment: SourceAssetSegment {
            source_asset_uid: source.uid,
            segment_mask_geometry: normalized.geometry,
            vectorization_spec: VectorizationSpec::Passthrough,
            width_mm: size.x,
            height_mm: size.y,
        },
        matrix: normalized.placement,
    };

    ImportPayload {
        source,
        items: vec![workpiece],
    }
}
