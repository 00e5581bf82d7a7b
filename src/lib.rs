//! cachewatch - runtime metrics daemon for hosted caches.
//!
//! The daemon binary wires these modules together; they are exposed as a
//! library so the reference host can be embedded and driven directly.

pub mod config;
pub mod error;
pub mod host;
pub mod http;
pub mod management;
pub mod metrics;
pub mod telemetry;
