//! Import payload handed to the host application

use std::path::{Path, PathBuf};

use glam::{DAffine2, DVec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::PathGeometry;

/// How a vector source should be traced into cut paths
///
/// Only passthrough exists: model outlines are already vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VectorizationSpec {
    #[default]
    Passthrough,
}

/// Renderer used to preview a source asset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RendererKind {
    #[default]
    Svg,
}

/// Descriptive metadata of a source asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    /// The asset is vector data, not a raster image
    pub is_vector: bool,
    /// Physical size (width, height) in mm
    pub natural_size: DVec2,
}

/// Provenance record of an imported file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAsset {
    pub uid: Uuid,
    /// File the bytes came from
    pub source_file: PathBuf,
    /// Raw file content (not serialized)
    #[serde(skip)]
    pub original_data: Vec<u8>,
    pub renderer: RendererKind,
    pub metadata: AssetMetadata,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl SourceAsset {
    /// Create a vector asset of the given physical size
    pub fn vector(source_file: impl Into<PathBuf>, original_data: Vec<u8>, size: DVec2) -> Self {
        Self {
            uid: Uuid::new_v4(),
            source_file: source_file.into(),
            original_data,
            renderer: RendererKind::Svg,
            metadata: AssetMetadata {
                is_vector: true,
                natural_size: size,
            },
            width_mm: size.x,
            height_mm: size.y,
        }
    }
}

/// Slice of a source asset rendered into a workpiece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAssetSegment {
    pub source_asset_uid: Uuid,
    /// Normalized outline in unit space, top-left origin
    pub segment_mask_geometry: PathGeometry,
    pub vectorization_spec: VectorizationSpec,
    pub width_mm: f64,
    pub height_mm: f64,
}

/// A placed item on the work surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPiece {
    pub uid: Uuid,
    /// Display name
    pub name: String,
    pub segment: SourceAssetSegment,
    /// Maps unit-space geometry to its physical position and size
    pub matrix: DAffine2,
}

impl WorkPiece {
    /// Geometry in physical coordinates
    pub fn placed_geometry(&self) -> PathGeometry {
        self.segment.segment_mask_geometry.transformed(&self.matrix)
    }
}

/// Everything produced by one successful import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportPayload {
    pub source: SourceAsset,
    pub items: Vec<WorkPiece>,
}

impl ImportPayload {
    /// Serialize the payload manifest to RON (raw bytes are left out)
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Parse a payload manifest
    pub fn from_ron_str(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }
}

/// Display name for an imported file: its stem
pub fn display_name(source_file: &Path) -> String {
    source_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_file.to_string_lossy().into_owned())
}
