//! Worker pool configuration.

use crate::error::{PoolError, PoolResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use surface_common::{find_config, ConfigPath};
use tracing::debug;

/// Default cap on concurrently running workers.
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// Path of the shared pool settings in a config document.
pub const WORKER_POOL_CONFIG_PATH: &str = "config/workerpool";

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkerPoolConfig {
    /// Maximum number of worker threads alive at once.
    pub max_workers: usize,

    /// Worker threads are named `<prefix>-<n>`.
    pub thread_name_prefix: String,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            thread_name_prefix: "mesh-worker".to_string(),
        }
    }
}

impl WorkerPoolConfig {
    /// Create a config with the given worker cap.
    pub fn with_max_workers(max_workers: usize) -> Self {
        Self {
            max_workers,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("MESH_POOL_MAX_WORKERS") {
            if let Ok(n) = val.parse() {
                config.max_workers = n;
            }
        }

        if let Ok(val) = std::env::var("MESH_POOL_THREAD_PREFIX") {
            config.thread_name_prefix = val;
        }

        config
    }

    /// Resolve settings from a config document.
    ///
    /// Reads `config/workerpool`, falling back to
    /// `config/layer/<layer>/workerpool`, layered over the defaults.
    pub fn from_config_document(config: &Value, layer: &str) -> PoolResult<Self> {
        let fallback = ConfigPath::from(format!("config/layer/{}/workerpool", layer));
        let resolved = match find_config(config, WORKER_POOL_CONFIG_PATH, Some(fallback)) {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| PoolError::InvalidConfig(e.to_string()))?,
            None => {
                debug!(layer = layer, "No worker pool config found, using defaults");
                Self::default()
            }
        };
        resolved.validate()?;
        Ok(resolved)
    }

    /// Check that the settings describe a usable pool.
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_workers == 0 {
            return Err(PoolError::InvalidConfig(
                "maxWorkers must be at least 1".to_string(),
            ));
        }
        if self.thread_name_prefix.contains('\0') {
            return Err(PoolError::InvalidConfig(
                "thread name prefix must not contain NUL".to_string(),
            ));
        }
        Ok(())
    }
}
