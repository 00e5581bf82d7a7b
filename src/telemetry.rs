//! Telemetry glue between the dispatcher and Prometheus.

use cachewatch_core::{DispatchError, DispatchObserver, DispatchOutcome};
use std::time::Duration;

/// Label shared by every attribute name the catalog does not know.
pub const UNKNOWN_ATTRIBUTE: &str = "unknown";

/// Feeds every dispatch into the process metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusObserver;

impl PrometheusObserver {
    /// Attribute label for a dispatch outcome.
    pub fn attribute_label<'a>(attribute: &'a str, outcome: &DispatchOutcome) -> &'a str {
        match outcome {
            DispatchOutcome::SoftFailure(DispatchError::UnknownMetric(_)) => UNKNOWN_ATTRIBUTE,
            _ => attribute,
        }
    }
}

impl DispatchObserver for PrometheusObserver {
    fn observe(&self, attribute: &str, outcome: &DispatchOutcome, elapsed: Duration) {
        let label = Self::attribute_label(attribute, outcome);
        crate::metrics::record_dispatch(label, elapsed.as_secs_f64());
        if let DispatchOutcome::SoftFailure(reason) = outcome {
            crate::metrics::record_failure(reason.error_code());
        }
    }
}

/// Standardized span constructors for the HTTP surface.
pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for one attribute read request.
    pub fn attribute_read(container: &str, cache: &str, attribute: &str) -> Span {
        info_span!("attribute_read", container = %container, cache = %cache, attribute = %attribute)
    }
}
