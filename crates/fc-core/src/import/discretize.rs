//! Per-edge curve discretization

use fc_cad::{CadError, CadKernel, Edge};
use glam::DVec2;

/// Why one edge could not be turned into a polyline
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiscretizeError {
    #[error("Kernel failed to discretize edge: {0}")]
    Kernel(#[from] CadError),
    #[error("Kernel returned no points")]
    Empty,
    #[error("Kernel returned a non-finite point at index {0}")]
    NonFinite(usize),
}

/// Approximate one projected edge as a 2D polyline
///
/// The depth coordinate of the kernel's plane-local points is dropped. The
/// first point is the edge start and the last the edge end.
pub fn discretize_edge(
    kernel: &dyn CadKernel,
    edge: &Edge,
    tolerance: f64,
) -> Result<Vec<DVec2>, DiscretizeError> {
    let points = kernel.discretize(edge, tolerance)?;
    if points.is_empty() {
        return Err(DiscretizeError::Empty);
    }

    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let point = p.truncate();
            if point.is_finite() {
                Ok(point)
            } else {
                Err(DiscretizeError::NonFinite(i))
            }
        })
        .collect()
}
