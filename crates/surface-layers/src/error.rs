//! Error types for the layer controllers.

use mesh_builder::MeshError;
use mesh_pool::PoolError;
use surface_common::SurfaceError;
use surface_loader::LoadError;
use thiserror::Error;

/// Result type alias using LayerError.
pub type LayerResult<T> = Result<T, LayerError>;

/// Why a surface build failed.
#[derive(Debug, Error)]
pub enum LayerError {
    #[error("Failed to load surface data: {0}")]
    Load(#[from] LoadError),

    #[error("Failed to build mesh: {0}")]
    Mesh(#[from] MeshError),

    #[error("Worker pool error: {0}")]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
