//! Request-facing entry point for metric reads.
//!
//! [`MetricDispatcher::handle`] never panics and never returns `Err`:
//! an unknown attribute or a missing cache becomes a
//! [`DispatchOutcome::SoftFailure`] carrying a human-readable reason.

use crate::catalog::MetricCatalog;
use crate::error::DispatchError;
use crate::instance::InstanceKey;
use crate::locator::ComponentLocator;
use crate::resolver::MetricResolver;
use crate::value::MetricResult;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, debug_span};

/// One management read: which cache, which attribute.
#[derive(Debug, Clone, Copy)]
pub struct MetricRequest<'a> {
    /// Cache to read from.
    pub key: &'a InstanceKey,
    /// Attribute name.
    pub attribute: &'a str,
}

impl<'a> MetricRequest<'a> {
    /// Create a request.
    pub fn new(key: &'a InstanceKey, attribute: &'a str) -> Self {
        Self { key, attribute }
    }
}

/// Result of a dispatch: a value, or a reason there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The metric was resolved.
    Success(MetricResult),
    /// No value could be produced.
    SoftFailure(DispatchError),
}

impl DispatchOutcome {
    /// Whether a value was produced.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The failure description, if this is a soft failure.
    pub fn failure_description(&self) -> Option<String> {
        match self {
            Self::Success(_) => None,
            Self::SoftFailure(e) => Some(e.to_string()),
        }
    }

    /// Convert into a `Result` for callers that prefer `?`.
    pub fn into_result(self) -> Result<MetricResult, DispatchError> {
        match self {
            Self::Success(result) => Ok(result),
            Self::SoftFailure(e) => Err(e),
        }
    }
}

/// Hook notified after every dispatch (latency, outcome).
pub trait DispatchObserver: Send + Sync {
    /// Called once per [`MetricDispatcher::handle`] call.
    fn observe(&self, attribute: &str, outcome: &DispatchOutcome, elapsed: Duration);
}

/// Parses the attribute, locates the cache, and resolves the value.
pub struct MetricDispatcher {
    catalog: Arc<MetricCatalog>,
    locator: ComponentLocator,
    resolver: MetricResolver,
    observer: Option<Arc<dyn DispatchObserver>>,
}

impl MetricDispatcher {
    /// Create a dispatcher over `catalog` and `locator`.
    pub fn new(catalog: Arc<MetricCatalog>, locator: ComponentLocator) -> Self {
        Self {
            catalog,
            locator,
            resolver: MetricResolver::new(),
            observer: None,
        }
    }

    /// Attach an observer.
    pub fn with_observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The catalog this dispatcher serves.
    pub fn catalog(&self) -> &Arc<MetricCatalog> {
        &self.catalog
    }

    /// Serve one read.
    pub fn handle(&self, request: &MetricRequest<'_>) -> DispatchOutcome {
        let span = debug_span!(
            "metric.read",
            container = %request.key.container,
            cache = %request.key.instance,
            attribute = %request.attribute,
        );
        let _enter = span.enter();
        let started = Instant::now();

        let outcome = self.resolve(request);
        if let DispatchOutcome::SoftFailure(ref e) = outcome {
            debug!(code = e.error_code(), error = %e, "Metric read failed");
        }

        if let Some(observer) = &self.observer {
            observer.observe(request.attribute, &outcome, started.elapsed());
        }
        outcome
    }

    fn resolve(&self, request: &MetricRequest<'_>) -> DispatchOutcome {
        let Some(descriptor) = self.catalog.lookup(request.attribute) else {
            let error = DispatchError::UnknownMetric(request.attribute.to_string());
            return DispatchOutcome::SoftFailure(error);
        };
        let Some(instance) = self.locator.resolve(request.key) else {
            let error = DispatchError::UnavailableInstance(request.key.instance.clone());
            return DispatchOutcome::SoftFailure(error);
        };
        DispatchOutcome::Success(self.resolver.compute(instance.as_ref(), descriptor))
    }
}

impl std::fmt::Debug for MetricDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricDispatcher")
            .field("metrics", &self.catalog.len())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
