//! Outline export

mod svg;

use std::path::Path;

use crate::payload::ImportPayload;

pub use svg::{format_number, geometry_to_svg, path_data, xml_escape};

/// Render the first workpiece of a payload as SVG at its physical size
pub fn payload_to_svg(payload: &ImportPayload) -> Result<String, ExportError> {
    let workpiece = payload.items.first().ok_or(ExportError::NoWorkpiece)?;
    let segment = &workpiece.segment;
    Ok(svg::svg_document(
        &segment.segment_mask_geometry,
        segment.width_mm,
        segment.height_mm,
        Some(&workpiece.name),
    ))
}

/// Write the SVG of a payload to a file
pub fn save_svg(payload: &ImportPayload, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let svg = payload_to_svg(payload)?;
    std::fs::write(path, svg).map_err(|e| ExportError::Io(e.to_string()))
}

/// Write the RON manifest of a payload to a file
pub fn save_manifest(payload: &ImportPayload, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let manifest = payload
        .to_ron_string()
        .map_err(|e| ExportError::Serialize(e.to_string()))?;
    std::fs::write(path, manifest).map_err(|e| ExportError::Io(e.to_string()))
}

/// Export-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("Payload has no workpiece")]
    NoWorkpiece,
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
}
