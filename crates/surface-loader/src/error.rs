//! Error types for data loading.

use surface_common::SurfaceError;
use thiserror::Error;

/// Result type alias using LoadError.
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors that can occur while fetching or decoding an array.
#[derive(Debug, Error)]
pub enum LoadError {
    // === Fetch errors ===
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request for {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    // === Decode errors ===
    #[error("Buffer from {url} has {len} bytes, not a multiple of 4")]
    TruncatedBuffer { url: String, len: usize },

    #[error("Invalid PNG from {url}: {source}")]
    Png {
        url: String,
        #[source]
        source: PngError,
    },

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Errors from the PNG float container codec.
#[derive(Debug, Error)]
pub enum PngError {
    #[error("missing PNG signature")]
    InvalidSignature,

    #[error("PNG decode failed: {0}")]
    Decode(String),

    #[error("unsupported format: {0}")]
    Unsupported(String),

    #[error("decode limits exceeded: {0}")]
    LimitsExceeded(String),

    #[error("PNG encode failed: {0}")]
    Encode(String),

    #[error("invalid dimensions: {0}")]
    Dimensions(String),
}
