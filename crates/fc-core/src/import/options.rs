//! Import options

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default maximum deviation between a curve and its polyline, in model units
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// Options for model import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Curve discretization tolerance (must be finite and positive)
    pub tolerance: f64,
    /// Project onto the largest planar face instead of the model's default plane
    pub auto_align: bool,
    /// Flip Y so the normalized geometry has a top-left origin
    pub flip_y: bool,
    /// Planar faces smaller than this are never chosen for alignment
    pub min_face_area: f64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            auto_align: true,
            flip_y: true,
            min_face_area: 0.0,
        }
    }
}

impl ImportOptions {
    /// Parse options from RON text and validate them
    pub fn from_ron_str(content: &str) -> Result<Self, OptionsError> {
        let options: ImportOptions =
            ron::from_str(content).map_err(|e| OptionsError::Deserialize(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Serialize options to RON text
    pub fn to_ron_string(&self) -> Result<String, OptionsError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| OptionsError::Serialize(e.to_string()))
    }

    /// Load options from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| OptionsError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save options to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), OptionsError> {
        let content = self.to_ron_string()?;
        std::fs::write(path, content).map_err(|e| OptionsError::Io(e.to_string()))
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(OptionsError::InvalidTolerance(self.tolerance));
        }
        if !(self.min_face_area.is_finite() && self.min_face_area >= 0.0) {
            return Err(OptionsError::InvalidMinFaceArea(self.min_face_area));
        }
        Ok(())
    }
}

/// Options-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Tolerance must be finite and positive, got {0}")]
    InvalidTolerance(f64),
    #[error("Minimum face area must be finite and non-negative, got {0}")]
    InvalidMinFaceArea(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ImportOptions::default();
        assert_eq!(options.tolerance, 0.05);
        assert!(options.auto_align);
        assert!(options.flip_y);
        assert_eq!(options.min_face_area, 0.0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let options = ImportOptions::from_ron_str("(tolerance: 0.01, flip_y: false)").unwrap();
        assert_eq!(options.tolerance, 0.01);
        assert!(!options.flip_y);
        assert!(options.auto_align);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            ImportOptions::from_ron_str("(tolerance: 0.0)"),
            Err(OptionsError::InvalidTolerance(_))
        ));
        assert!(matches!(
            ImportOptions::from_ron_str("(min_face_area: -1.0)"),
            Err(OptionsError::InvalidMinFaceArea(_))
        ));
        assert!(matches!(
            ImportOptions::from_ron_str("(tolerance: \"fine\")"),
            Err(OptionsError::Deserialize(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.ron");
        let options = ImportOptions {
            tolerance: 0.2,
            auto_align: false,
            ..Default::default()
        };
        options.save(&path).unwrap();
        assert_eq!(ImportOptions::load(&path).unwrap(), options);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImportOptions::load(dir.path().join("nope.ron")),
            Err(OptionsError::Io(_))
        ));
    }
}
