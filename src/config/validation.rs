//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::collections::HashSet;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("container.name is required")]
    MissingContainerName,
    #[error("duplicate container name: {0}")]
    DuplicateContainer(String),
    #[error("cache.name is required in container {0}")]
    MissingCacheName(String),
    #[error("duplicate cache name {1} in container {0}")]
    DuplicateCache(String, String),
    #[error("cache {0}/{1}: concurrency_level must be greater than zero")]
    ZeroConcurrencyLevel(String, String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    let mut containers = HashSet::new();
    for container in &config.containers {
        if container.name.is_empty() {
            errors.push(ValidationError::MissingContainerName);
        } else if !containers.insert(container.name.as_str()) {
            errors.push(ValidationError::DuplicateContainer(container.name.clone()));
        }

        let mut caches = HashSet::new();
        for cache in &container.caches {
            if cache.name.is_empty() {
                errors.push(ValidationError::MissingCacheName(container.name.clone()));
            } else if !caches.insert(cache.name.as_str()) {
                errors.push(ValidationError::DuplicateCache(
                    container.name.clone(),
                    cache.name.clone(),
                ));
            }
            if cache.concurrency_level == 0 {
                errors.push(ValidationError::ZeroConcurrencyLevel(
                    container.name.clone(),
                    cache.name.clone(),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
