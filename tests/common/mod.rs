//! Integration test common infrastructure.
//!
//! Provides utilities for spawning a test daemon and reading its HTTP
//! surface.

pub mod server;

#[allow(unused_imports)]
pub use server::TestDaemon;
