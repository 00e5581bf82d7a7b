//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use crate::host::StageKind;
use std::net::{IpAddr, Ipv4Addr};

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

// =============================================================================
// Cache Defaults
// =============================================================================

pub fn default_stages() -> Vec<StageKind> {
    vec![StageKind::Management]
}

pub fn default_concurrency_level() -> u32 {
    1000
}

pub fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
