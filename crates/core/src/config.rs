//! Runtime configuration and the shared context handed to every service.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::registry::KindRegistry;

/// Smallest page size the resync back-off will shrink to.
pub const MIN_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Value of the cluster-identity tag; every resync query is scoped to it.
    pub cluster: String,
    /// Objects per hierarchical patch.
    pub batch_page_size: usize,
    /// Initial page size of resync search calls.
    pub resync_page_size: u32,
    /// Amount the resync page size shrinks by after a `PageSizeExceeded`.
    pub page_size_decrement: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { cluster: "default".to_string(), batch_page_size: 500, resync_page_size: 1000, page_size_decrement: 100 }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}

impl SyncConfig {
    /// Defaults overridden by `NETSYNC_*` environment variables; unparsable values are ignored.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            cluster: std::env::var("NETSYNC_CLUSTER").ok().filter(|s| !s.is_empty()).unwrap_or(d.cluster),
            batch_page_size: env_parse("NETSYNC_BATCH_PAGE_SIZE").filter(|n| *n > 0).unwrap_or(d.batch_page_size),
            resync_page_size: env_parse("NETSYNC_RESYNC_PAGE_SIZE").filter(|n| *n > 0).unwrap_or(d.resync_page_size),
            page_size_decrement: env_parse("NETSYNC_PAGE_SIZE_DECREMENT")
                .filter(|n| *n > 0)
                .unwrap_or(d.page_size_decrement),
        }
    }
}

/// Constructed once at startup and shared by every service; replaces process-wide globals.
#[derive(Debug, Clone)]
pub struct SyncContext {
    pub config: Arc<SyncConfig>,
    pub registry: Arc<KindRegistry>,
}

impl SyncContext {
    pub fn new(config: SyncConfig, registry: KindRegistry) -> Self {
        Self { config: Arc::new(config), registry: Arc::new(registry) }
    }
}

impl Default for SyncContext {
    fn default() -> Self {
        Self::new(SyncConfig::default(), KindRegistry::builtin())
    }
}
