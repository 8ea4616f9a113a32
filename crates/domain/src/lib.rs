//! # latency-proxy-domain
//!
//! Value objects for call-latency instrumentation.
//!
//! - **Markers** - `TimingMarker` attached to contracts, implementations, operations
//! - **Policy** - `InstrumentationPolicy` resolved once per wrapped instance
//! - **Operations** - `OperationKey`, `ReturnShape`, `ResultKind`
//! - **Contracts** - `ContractSpec`, `OperationSpec`, `ImplementationSpec`
//! - **Statistics** - `RunningStat`, `SummaryEntry`, `SlowCall`, `CallOutcome`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No I/O, no clocks, no locks

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use latency_proxy_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod contract;
pub mod marker;
pub mod operation;
pub mod policy;
pub mod stats;

pub use contract::{
    ContractSpec, DescribeContract, DescribeImplementation, ImplementationSpec, OperationSpec,
};
pub use marker::TimingMarker;
pub use operation::{OperationKey, ResultKind, ReturnShape};
pub use policy::{InstrumentationPolicy, MarkerSource};
pub use stats::{CallOutcome, RunningStat, SlowCall, SummaryEntry};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================
