//! # latency-proxy-ports
//!
//! Port traits for the latency-proxy hexagonal architecture.
//!
//! This crate defines the output boundary of the instrumentation engine. It
//! depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by async contract methods.
///
/// Contracts routed through a timed proxy return this from their async
/// operations so the proxy can wrap the future without knowing its type.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod events;

pub use events::*;

// Re-export the domain types used in event payloads, so adapter crates can
// implement ports without directly depending on `latency-proxy-domain`.
pub use latency_proxy_domain::{CallOutcome, OperationKey, ReturnShape, SlowCall, SummaryEntry};
