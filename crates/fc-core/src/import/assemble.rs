//! Projected edge loops to path geometry

use fc_cad::{CadKernel, EdgeLoop};

use super::discretize::discretize_edge;
use crate::geometry::{PathBuilder, PathGeometry};

/// Geometry assembled from projected loops, with edge statistics
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub geometry: PathGeometry,
    /// Edges seen over all loops
    pub edges_total: usize,
    /// Edges that were discretized successfully
    pub edges_processed: usize,
    /// Loops skipped because they had no usable start point
    pub loops_skipped: usize,
}

/// Turn projected loops into subpaths, one per loop, in loop order
///
/// Edges that fail to discretize are left out; the subpath continues with
/// the next edge. A loop that ends up with fewer than two points produces no
/// subpath.
pub fn assemble_paths(kernel: &dyn CadKernel, loops: &[EdgeLoop], tolerance: f64) -> Assembly {
    let mut builder = PathBuilder::new();
    let mut assembly = Assembly::default();

    for (loop_index, edge_loop) in loops.iter().enumerate() {
        assembly.edges_total += edge_loop.len();

        let Some(first) = edge_loop.edges.first() else {
            assembly.loops_skipped += 1;
            continue;
        };
        let start = match first.start_point() {
            Ok(start) => start,
            Err(e) => {
                tracing::debug!("Skipping loop {}: {}", loop_index, e);
                assembly.loops_skipped += 1;
                continue;
            }
        };

        builder.move_to(start.truncate());
        for (edge_index, edge) in edge_loop.edges.iter().enumerate() {
            match discretize_edge(kernel, edge, tolerance) {
                Ok(points) => {
                    for point in points.into_iter().skip(1) {
                        builder.line_to(point);
                    }
                    assembly.edges_processed += 1;
                }
                Err(e) => {
                    tracing::debug!(
                        "Skipping edge {} of loop {}: {}",
                        edge_index,
                        loop_index,
                        e
                    );
                }
            }
        }
    }

    assembly.geometry = builder.finish();
    assembly
}
