//! # cachewatch-core
//!
//! Runtime metrics dispatch for live cache instances.
//!
//! Given a cache address `(container, instance)` and an attribute name,
//! [`MetricDispatcher::handle`] looks the attribute up in the static
//! [`MetricCatalog`], locates the live instance through an
//! [`InstanceRegistry`], and computes the value by consulting whichever
//! optional subcomponents the instance has: its lock table, its replication
//! counters, the first stage of its processing chain that declares the
//! needed [`Capability`], or a named internal manager.
//!
//! ## Failure model
//!
//! - Unknown attribute or unavailable cache: a soft failure with a
//!   human-readable reason ([`DispatchError`]), never a panic.
//! - Missing stage or manager: not a failure. The value is present and
//!   equals the zero value of the metric's type.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cachewatch_core::{
//!     ComponentLocator, DispatchOutcome, InstanceKey, MetricCatalog, MetricDispatcher,
//!     MetricRequest,
//! };
//!
//! let locator = ComponentLocator::new(registry);
//! let dispatcher = MetricDispatcher::new(MetricCatalog::standard(), locator);
//! let key = InstanceKey::new("clustered", "default");
//! match dispatcher.handle(&MetricRequest::new(&key, "hits")) {
//!     DispatchOutcome::Success(result) => println!("hits = {}", result.value),
//!     DispatchOutcome::SoftFailure(reason) => println!("{reason}"),
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod instance;
pub mod locator;
pub mod registration;
pub mod resolver;
pub mod scanner;
pub mod stage;
pub mod value;

pub use catalog::{Metric, MetricCatalog, MetricDescriptor};
pub use dispatch::{DispatchObserver, DispatchOutcome, MetricDispatcher, MetricRequest};
pub use error::DispatchError;
pub use instance::{
    ActivationManager, CacheInstance, ComponentStatus, InstanceKey, InstanceRegistry, LockState,
    PassivationManager, ReplicationStats,
};
pub use locator::ComponentLocator;
pub use registration::{MetricBinding, RegistrationSplitter, RegistrationTarget};
pub use resolver::MetricResolver;
pub use scanner::first_implementing;
pub use stage::{
    ActivationStats, CacheManagementStats, Capability, CapabilitySet, InvalidationStats,
    ProcessingStage, StoreWriteStats, TransactionStats,
};
pub use value::{MetricResult, MetricValue, ValueType};
