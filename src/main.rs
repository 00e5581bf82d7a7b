//! cachewatch - runtime metrics daemon for hosted caches.
//!
//! Starts the caches named in the configuration, attaches each to the
//! management model, and serves attribute reads and Prometheus metrics over
//! HTTP until interrupted.

use cachewatch::config::{self, Config};
use cachewatch::host::CacheHost;
use cachewatch::management::ManagementModel;
use cachewatch::telemetry::PrometheusObserver;
use cachewatch::{http, metrics};
use cachewatch_core::{
    ComponentLocator, InstanceKey, MetricCatalog, MetricDispatcher, RegistrationSplitter,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("CACHEWATCH_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "cachewatch.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        server = %config.server.name,
        containers = config.containers.len(),
        caches = config.cache_count(),
        "Starting cachewatch"
    );

    metrics::init();

    let host = Arc::new(CacheHost::new());
    let catalog = MetricCatalog::standard();
    info!(metrics = catalog.len(), "Metric catalog loaded");

    let dispatcher = Arc::new(
        MetricDispatcher::new(catalog, ComponentLocator::new(host.clone()))
            .with_observer(Arc::new(PrometheusObserver)),
    );
    let model = Arc::new(ManagementModel::new(RegistrationSplitter::new(dispatcher)));

    for container in &config.containers {
        for cache in &container.caches {
            let key = InstanceKey::new(container.name.clone(), cache.name.clone());
            host.start(key.clone(), &cache.settings())
                .inspect_err(|e| {
                    error!(code = e.error_code(), error = %e, "Failed to start cache");
                })?;
            model.attach(key, cache.clustered);
        }
    }
    metrics::set_registered_caches(model.len());

    match config.server.http_addr() {
        Some(addr) => {
            let listener = http::bind(addr).await.inspect_err(|e| {
                error!(%addr, error = %e, "Failed to bind HTTP server");
            })?;
            let state = http::AppState {
                model: Arc::clone(&model),
            };
            tokio::spawn(http::run_http_server(listener, state));
            info!(%addr, "HTTP server listening");
        }
        None => info!("HTTP surface disabled"),
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    for key in model.keys() {
        model.detach(&key);
    }
    host.stop_all();
    metrics::set_registered_caches(model.len());

    info!("cachewatch stopped");
    Ok(())
}
