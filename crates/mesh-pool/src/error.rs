//! Error types for the worker pool.

use thiserror::Error;

/// Result type alias using PoolError.
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors returned by the worker pool.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Invalid worker pool configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(String),

    #[error("Worker pool has been shut down")]
    Shutdown,

    #[error("Task panicked: {0}")]
    TaskPanicked(String),

    #[error("Task was dropped before completing")]
    Cancelled,
}
