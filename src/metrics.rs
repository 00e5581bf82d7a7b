//! Prometheus metrics collection for cachewatch.
//!
//! Self-observability of the dispatcher, exposed on the HTTP endpoint next
//! to the attribute reads.
//!
//! - `cachewatch_dispatch_total{attribute}` - Reads dispatched by attribute
//! - `cachewatch_dispatch_failures_total{reason}` - Soft failures by reason
//! - `cachewatch_dispatch_duration_seconds` - Dispatch latency histogram
//! - `cachewatch_registered_caches` - Caches attached to the management model

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Reads dispatched, by attribute. Unknown names share one label.
pub static DISPATCH_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Soft failures, by reason code.
pub static DISPATCH_FAILURES: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

/// Time spent in one dispatch.
pub static DISPATCH_LATENCY: OnceLock<Histogram> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

/// Caches currently attached to the management model.
pub static REGISTERED_CACHES: OnceLock<IntGauge> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(
                    error = %e,
                    concat!("Failed to register metric ", stringify!($metric))
                );
            }
            let _ = $metric.set(m);
        };
    }

    register!(
        DISPATCH_COUNTER,
        IntCounterVec::new(
            Opts::new(
                "cachewatch_dispatch_total",
                "Metric reads dispatched by attribute",
            ),
            &["attribute"],
        )
    );
    register!(
        DISPATCH_FAILURES,
        IntCounterVec::new(
            Opts::new(
                "cachewatch_dispatch_failures_total",
                "Metric reads that soft-failed by reason",
            ),
            &["reason"],
        )
    );
    register!(
        DISPATCH_LATENCY,
        Histogram::with_opts(
            HistogramOpts::new(
                "cachewatch_dispatch_duration_seconds",
                "Metric dispatch latency",
            )
            .buckets(vec![
                0.000001, 0.000005, 0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005,
            ]),
        )
    );
    register!(
        REGISTERED_CACHES,
        IntGauge::new(
            "cachewatch_registered_caches",
            "Caches attached to the management model",
        )
    );
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

/// Record one dispatch with its latency.
#[inline]
pub fn record_dispatch(attribute: &str, duration_secs: f64) {
    if let Some(c) = DISPATCH_COUNTER.get() {
        c.with_label_values(&[attribute]).inc();
    }
    if let Some(h) = DISPATCH_LATENCY.get() {
        h.observe(duration_secs);
    }
}

/// Record a soft failure.
#[inline]
pub fn record_failure(reason: &str) {
    if let Some(c) = DISPATCH_FAILURES.get() {
        c.with_label_values(&[reason]).inc();
    }
}

/// Set the number of attached caches.
#[inline]
pub fn set_registered_caches(count: usize) {
    if let Some(g) = REGISTERED_CACHES.get() {
        g.set(i64::try_from(count).unwrap_or(i64::MAX));
    }
}
