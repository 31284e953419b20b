//! Flat grid assembly (C9) on top of `geotess-core`'s tessellation engine:
//! vertex/triangle flattening, the optional Delaunay flip pass, and the
//! stable content hash consumed by downstream serializers.

pub mod delaunay;
pub mod error;
pub mod grid;

pub use error::{GridError, GridResult};
pub use grid::{assemble_grid, Grid, Range};
