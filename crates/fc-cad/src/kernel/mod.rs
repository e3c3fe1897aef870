//! CAD kernel interface and backends

mod brep;
mod traits;

pub use brep::BrepKernel;
pub use traits::*;
