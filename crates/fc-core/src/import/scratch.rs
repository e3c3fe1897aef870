//! Temporary files for kernels that only read from disk

use std::io::Write;
use std::path::Path;

use fc_cad::{CadKernel, CadModel};

use super::ImportError;

/// Parse in-memory file content through a scoped temporary file
///
/// The file keeps the source extension, since kernels may dispatch on it,
/// and is removed as soon as the kernel returns. A failed removal is ignored.
pub fn parse_bytes(
    kernel: &dyn CadKernel,
    raw_data: &[u8],
    source_file: &Path,
) -> Result<CadModel, ImportError> {
    let suffix = source_file
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let mut file = tempfile::Builder::new()
        .prefix("flatcut-")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| ImportError::Io(e.to_string()))?;
    file.write_all(raw_data)
        .and_then(|()| file.flush())
        .map_err(|e| ImportError::Io(e.to_string()))?;

    tracing::debug!("Parsing {} through {}", source_file.display(), file.path().display());
    let model = kernel.parse_model(file.path()).map_err(ImportError::Kernel)?;
    drop(file);

    Ok(model)
}
