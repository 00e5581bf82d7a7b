//! HTTP server for metrics and attribute reads.
//!
//! Runs on a separate tokio task. Serves `/metrics` for Prometheus scraping
//! and a small JSON surface over the management model:
//!
//! - `GET /containers/:container/caches/:cache/attributes`
//! - `GET /containers/:container/caches/:cache/attributes/:attribute`

use crate::error::ApiError;
use crate::management::ManagementModel;
use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use cachewatch_core::{InstanceKey, MetricResult};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ManagementModel>,
}

/// Body of the attribute listing.
#[derive(Debug, Serialize)]
pub struct AttributeList {
    pub container: String,
    pub cache: String,
    pub attributes: Vec<&'static str>,
}

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// Handler for the attribute listing of one cache.
async fn list_attributes(
    State(state): State<AppState>,
    Path((container, cache)): Path<(String, String)>,
) -> Result<Json<AttributeList>, ApiError> {
    let key = InstanceKey::new(container, cache);
    let attributes = state
        .model
        .attributes(&key)
        .ok_or_else(|| ApiError::UnknownResource(key.clone()))?;
    Ok(Json(AttributeList {
        container: key.container,
        cache: key.instance,
        attributes,
    }))
}

/// Handler for one attribute read.
async fn read_attribute(
    State(state): State<AppState>,
    Path((container, cache, attribute)): Path<(String, String, String)>,
) -> Result<Json<MetricResult>, ApiError> {
    let span = crate::telemetry::spans::attribute_read(&container, &cache, &attribute);
    let key = InstanceKey::new(container, cache);
    span.in_scope(|| state.model.read(&key, &attribute)).map(Json)
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route(
            "/containers/:container/caches/:cache/attributes",
            get(list_attributes),
        )
        .route(
            "/containers/:container/caches/:cache/attributes/:attribute",
            get(read_attribute),
        )
        .with_state(state)
}

/// Bind the HTTP listener.
pub async fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    TcpListener::bind(addr).await
}

/// Run the HTTP server on a bound listener.
///
/// This is a long-running task that should be spawned in the background.
pub async fn run_http_server(listener: TcpListener, state: AppState) {
    let app = router(state);
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("HTTP server error: {}", e);
    }
}
