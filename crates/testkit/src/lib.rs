//! # latency-proxy-testkit
//!
//! Test helpers: in-memory event sinks and a sample contract with a
//! hand-written timed proxy implementation.
//! This crate depends on `core`, `domain`, and `ports`.

pub mod in_memory;
pub mod sample;

pub use in_memory::{NoopEventSink, RecordingEventSink};
pub use sample::{INVENTORY_CONTRACT, InventoryError, InventoryService, Warehouse};

/// Returns the testkit crate version.
#[must_use]
pub const fn testkit_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
