//! # latency-proxy-core
//!
//! The instrumentation engine: wraps a service instance behind its contract and
//! measures the latency of every call routed through it.
//!
//! - [`wrap`] / [`dispose`] - construction and scoped release
//! - [`TimedProxy`] - the proxy; contract traits are implemented on
//!   `TimedProxy<dyn Contract>`
//! - [`OperationTable`] - per-contract dispatch table built once at wrap time
//! - [`CallInterceptor`] - per-call measure/forward decision
//! - [`StatsAggregator`] / [`SlowestRanking`] - running summary and bounded ranking
//! - [`Reporter`] / [`FinalReport`] - snapshots and the disposal report
//!
//! ## Dependency Rules
//!
//! - Depends on `domain`, `ports`, and `shared` only
//! - Performs no I/O; all output goes through an injected `EventSinkPort`

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod aggregator;
pub mod completion;
pub mod dispatch;
pub mod error;
pub mod info;
pub mod interceptor;
pub mod proxy;
pub mod ranking;
pub mod reporter;

pub use aggregator::StatsAggregator;
pub use completion::Completion;
pub use dispatch::{EntryPoint, OperationEntry, OperationTable, Route};
pub use error::WrapError;
pub use info::{EngineInfo, engine_info};
pub use interceptor::CallInterceptor;
pub use proxy::{TimedProxy, WrapOptions, dispose, wrap, wrap_described};
pub use ranking::{DEFAULT_SLOWEST_CAPACITY, SlowestRanking};
pub use reporter::{FinalReport, Reporter};

/// Returns the core crate version.
#[must_use]
pub const fn core_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================
