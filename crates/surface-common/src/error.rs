//! Error types for the surface data model.

use thiserror::Error;

/// Result type alias using SurfaceError.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Validation and configuration errors for surface inputs.
#[derive(Debug, Error)]
pub enum SurfaceError {
    // === Input validation ===
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error(
        "Property array has {len} values; expected {nodes} (one per node) or {cells} (one per cell)"
    )]
    PropertyLayout { len: usize, nodes: usize, cells: usize },

    #[error("One or both of mesh and properties must be given")]
    MissingData,

    // === Configuration ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file '{path}': {message}")]
    ConfigFile { path: String, message: String },
}

impl SurfaceError {
    /// Create an InvalidFrame error.
    pub fn invalid_frame(msg: impl Into<String>) -> Self {
        Self::InvalidFrame(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_json::Error> for SurfaceError {
    fn from(err: serde_json::Error) -> Self {
        SurfaceError::Config(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for SurfaceError {
    fn from(err: serde_yaml::Error) -> Self {
        SurfaceError::Config(format!("YAML error: {}", err))
    }
}
