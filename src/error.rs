//! Unified error handling for cachewatch.
//!
//! Host lifecycle errors and the mapping of read failures onto the HTTP
//! surface, with static codes for metric labeling.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cachewatch_core::{DispatchError, InstanceKey};
use thiserror::Error;

// ============================================================================
// Host Errors (cache lifecycle)
// ============================================================================

/// Errors raised while starting or stopping hosted caches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("cache {0} is already running")]
    AlreadyRunning(InstanceKey),

    #[error("cache {0} is not running")]
    NotRunning(InstanceKey),

    #[error("malformed cache address {0}")]
    MalformedKey(InstanceKey),
}

impl HostError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyRunning(_) => "already_running",
            Self::NotRunning(_) => "not_running",
            Self::MalformedKey(_) => "malformed_key",
        }
    }
}

// ============================================================================
// API Errors (HTTP surface)
// ============================================================================

/// A read that produced no value, rendered as `404 {"failure": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Dispatch(#[from] DispatchError),

    #[error("unavailable cache {}", .0.instance)]
    UnknownResource(InstanceKey),
}

impl ApiError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Dispatch(e) => e.error_code(),
            Self::UnknownResource(_) => "unknown_resource",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "failure": self.to_string() });
        (StatusCode::NOT_FOUND, Json(body)).into_response()
    }
}
