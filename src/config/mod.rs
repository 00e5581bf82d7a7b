//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Top-level config structs (Config, ServerConfig) and loading
//! - [`containers`]: Cache container and cache blocks (ContainerConfig, CacheConfig)
//! - [`defaults`]: Default value functions for serde
//! - [`validation`]: Startup validation that reports every problem at once

mod containers;
mod defaults;
mod types;
mod validation;

pub use containers::{CacheConfig, ContainerConfig};
pub use types::{Config, ConfigError, ServerConfig};
pub use validation::{ValidationError, validate};
