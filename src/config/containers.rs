//! Cache container and cache block configuration.

use serde::Deserialize;

use crate::host::{CacheSettings, StageKind};
use super::defaults::{default_concurrency_level, default_stages, default_version};

/// A named group of caches.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerConfig {
    /// Container name (first half of the cache address).
    pub name: String,
    /// Caches in this container.
    #[serde(default, rename = "cache")]
    pub caches: Vec<CacheConfig>,
}

/// One cache instance.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Cache name (second half of the cache address).
    pub name: String,
    /// Whether the cache replicates; enables the clustered metrics.
    #[serde(default)]
    pub clustered: bool,
    /// Processing chain, head first (default: `["management"]`).
    #[serde(default = "default_stages")]
    pub stages: Vec<StageKind>,
    /// Lock stripes (default: 1000).
    #[serde(default = "default_concurrency_level")]
    pub concurrency_level: u32,
    /// Whether a passivation manager is configured.
    #[serde(default)]
    pub passivation: bool,
    /// Whether an activation manager is configured.
    #[serde(default)]
    pub activation: bool,
    /// Reported version string (default: the daemon's version).
    #[serde(default = "default_version")]
    pub version: String,
}

impl CacheConfig {
    /// Settings for starting this cache on the host.
    pub fn settings(&self) -> CacheSettings {
        CacheSettings {
            version: self.version.clone(),
            clustered: self.clustered,
            stages: self.stages.clone(),
            concurrency_level: self.concurrency_level,
            passivation: self.passivation,
            activation: self.activation,
        }
    }
}
