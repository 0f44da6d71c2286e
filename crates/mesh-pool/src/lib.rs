//! Worker pool for offloading mesh construction.
//!
//! The pool is an explicit object owned by whoever composes the application
//! and is shared by cloning. Tasks cannot be cancelled once submitted; callers
//! that only care about the newest result discard stale ones themselves.

pub mod config;
pub mod error;
pub mod pool;

pub use config::{WorkerPoolConfig, DEFAULT_MAX_WORKERS, WORKER_POOL_CONFIG_PATH};
pub use error::{PoolError, PoolResult};
pub use pool::{PoolStats, TaskHandle, WorkerPool};
