//! Services shared by every layer.

use crate::error::LayerResult;
use mesh_pool::{WorkerPool, WorkerPoolConfig};
use serde_json::Value;
use surface_loader::{FetchConfig, SurfaceLoader};
use tracing::info;

/// Data loader and worker pool shared by all mounted layers.
///
/// Cheap to clone; clones share the same pool.
#[derive(Debug, Clone)]
pub struct LayerContext {
    pub loader: SurfaceLoader,
    pub pool: WorkerPool,
}

impl LayerContext {
    pub fn new(loader: SurfaceLoader, pool: WorkerPool) -> Self {
        Self { loader, pool }
    }

    /// HTTP and file loading plus a pool configured from `config`.
    ///
    /// `layer` selects the `config/layer/<layer>/workerpool` fallback.
    pub fn from_config(fetch: &FetchConfig, config: &Value, layer: &str) -> LayerResult<Self> {
        let pool_config = WorkerPoolConfig::from_config_document(config, layer)?;
        info!(
            layer = layer,
            max_workers = pool_config.max_workers,
            "Creating layer context"
        );
        Ok(Self {
            loader: SurfaceLoader::with_default_fetcher(fetch)?,
            pool: WorkerPool::new(pool_config)?,
        })
    }
}
