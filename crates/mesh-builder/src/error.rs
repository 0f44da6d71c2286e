//! Error types for mesh construction.

use surface_common::SurfaceError;
use thiserror::Error;

/// Result type alias using MeshError.
pub type MeshResult<T> = Result<T, MeshError>;

/// Input validation errors raised while building a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error("Elevation array has {len} values; frame has {nodes} nodes")]
    ElevationLength { len: usize, nodes: usize },

    #[error("Mesh with {vertices} vertices exceeds the 32-bit index range")]
    TooManyVertices { vertices: usize },

    #[error("Vertex array length {0} is not a multiple of 3")]
    VertexLength(usize),

    #[error("Triangle index array length {0} is not a multiple of 3")]
    IndexLength(usize),

    #[error("Triangle index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: u32, vertices: usize },
}
