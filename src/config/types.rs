//! Core configuration types and loading.

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use thiserror::Error;

use super::containers::ContainerConfig;
use super::defaults::default_bind;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Daemon identity and HTTP surface.
    pub server: ServerConfig,
    /// Cache containers hosted by this daemon.
    #[serde(default, rename = "container")]
    pub containers: Vec<ContainerConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Total number of configured caches across all containers.
    pub fn cache_count(&self) -> usize {
        self.containers.iter().map(|c| c.caches.len()).sum()
    }
}

/// Daemon identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Daemon name, reported in logs.
    pub name: String,
    /// HTTP port for `/metrics` and attribute reads. Disabled when unset or 0.
    pub metrics_port: Option<u16>,
    /// Address the HTTP surface binds to (default: 0.0.0.0).
    #[serde(default = "default_bind")]
    pub bind: IpAddr,
}

impl ServerConfig {
    /// Socket address of the HTTP surface, if enabled.
    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.metrics_port
            .filter(|&port| port != 0)
            .map(|port| SocketAddr::new(self.bind, port))
    }
}
