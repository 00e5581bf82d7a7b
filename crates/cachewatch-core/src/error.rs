//! Soft failures reported by the dispatcher.

use thiserror::Error;

/// Why a metric read produced no value.
///
/// These are carried inside [`DispatchOutcome`](crate::DispatchOutcome)
/// and rendered as the failure description; they are never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The attribute name is not in the catalog.
    #[error("unknown metric {0}")]
    UnknownMetric(String),

    /// No live instance answers to the requested key.
    #[error("unavailable cache {0}")]
    UnavailableInstance(String),
}

impl DispatchError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownMetric(_) => "unknown_metric",
            Self::UnavailableInstance(_) => "unavailable_cache",
        }
    }
}
