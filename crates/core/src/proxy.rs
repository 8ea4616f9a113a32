//! The timed proxy and its `wrap` / `dispose` entry points.

use crate::aggregator::StatsAggregator;
use crate::completion::{outcome_of, succeeded};
use crate::dispatch::OperationTable;
use crate::error::WrapError;
use crate::interceptor::CallInterceptor;
use crate::ranking::DEFAULT_SLOWEST_CAPACITY;
use crate::reporter::{FinalReport, Reporter};
use latency_proxy_domain::{
    ContractSpec, DescribeContract, ImplementationSpec, InstrumentationPolicy, SlowCall,
    SummaryEntry,
};
use latency_proxy_ports::{BoxFuture, EventSinkPort};
use std::fmt;
use std::sync::Arc;

/// Resolved inputs handed to [`wrap`] by the registration layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapOptions {
    /// Master switch; when off every call is forwarded untouched.
    pub enabled: bool,
    /// Number of slowest calls retained.
    pub slowest_capacity: usize,
    /// Emit an event for every measured call.
    pub live_events: bool,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            slowest_capacity: DEFAULT_SLOWEST_CAPACITY,
            live_events: true,
        }
    }
}

/// Wrap `instance` behind a timing proxy for `contract`.
///
/// Fails with [`WrapError::NullImplementation`] when `instance` is `None` and
/// with [`WrapError::ProxyConstructionFailed`] when the contract description
/// cannot be turned into a dispatch table.
pub fn wrap<T: ?Sized>(
    contract: &ContractSpec,
    implementation: &ImplementationSpec,
    instance: Option<Box<T>>,
    sink: Arc<dyn EventSinkPort>,
    options: WrapOptions,
) -> Result<TimedProxy<T>, WrapError> {
    let Some(inner) = instance else {
        return Err(WrapError::NullImplementation {
            contract: contract.name().into(),
        });
    };

    let table = OperationTable::build(contract, implementation)?;
    let aggregator = StatsAggregator::new(table.policy().record_slowest, options.slowest_capacity);
    let interceptor =
        CallInterceptor::new(table, aggregator, sink, options.enabled, options.live_events);

    Ok(TimedProxy {
        interceptor,
        reported: false,
        inner,
    })
}

/// Same as [`wrap`], taking the contract description from `T` itself.
pub fn wrap_described<T: ?Sized + DescribeContract>(
    implementation: &ImplementationSpec,
    instance: Option<Box<T>>,
    sink: Arc<dyn EventSinkPort>,
    options: WrapOptions,
) -> Result<TimedProxy<T>, WrapError> {
    wrap(&T::contract_spec(), implementation, instance, sink, options)
}

/// Release a proxy: publish the final report, then drop the wrapped instance.
pub fn dispose<T: ?Sized>(proxy: TimedProxy<T>) -> FinalReport {
    proxy.dispose()
}

/// A wrapped instance plus the interceptor timing its calls.
///
/// Contract traits are implemented for `TimedProxy<dyn Contract>` by routing
/// each method through [`Self::call`], [`Self::try_call`],
/// [`Self::call_async`], or [`Self::try_call_async`].
pub struct TimedProxy<T: ?Sized> {
    interceptor: CallInterceptor,
    reported: bool,
    // Declared last so the final report is emitted before the instance drops.
    inner: Box<T>,
}

impl<T: ?Sized> TimedProxy<T> {
    /// Forward a synchronous operation.
    pub fn call<R>(&self, operation: &str, forward: impl FnOnce(&T) -> R) -> R {
        self.interceptor
            .intercept(operation, || forward(&*self.inner), succeeded::<R>)
    }

    /// Forward a synchronous operation returning `Result`; `Err` is recorded
    /// as a failed completion and returned unchanged.
    pub fn try_call<R, E>(
        &self,
        operation: &str,
        forward: impl FnOnce(&T) -> Result<R, E>,
    ) -> Result<R, E> {
        self.interceptor
            .intercept(operation, || forward(&*self.inner), outcome_of::<R, E>)
    }

    /// Forward an operation returning a future.
    pub fn call_async<'a, R: 'a>(
        &'a self,
        operation: &str,
        forward: impl FnOnce(&'a T) -> BoxFuture<'a, R>,
    ) -> BoxFuture<'a, R> {
        let inner: &'a T = &self.inner;
        self.interceptor
            .intercept_async(operation, || forward(inner), succeeded::<R>)
    }

    /// Forward an operation returning a future of `Result`.
    pub fn try_call_async<'a, R: 'a, E: 'a>(
        &'a self,
        operation: &str,
        forward: impl FnOnce(&'a T) -> BoxFuture<'a, Result<R, E>>,
    ) -> BoxFuture<'a, Result<R, E>> {
        let inner: &'a T = &self.inner;
        self.interceptor
            .intercept_async(operation, || forward(inner), outcome_of::<R, E>)
    }

    /// Borrow the wrapped instance directly, bypassing measurement.
    #[must_use]
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Resolved policy.
    #[must_use]
    pub const fn policy(&self) -> InstrumentationPolicy {
        self.interceptor.policy()
    }

    /// Dispatch table built at wrap time.
    #[must_use]
    pub const fn table(&self) -> &OperationTable {
        self.interceptor.table()
    }

    /// Read-only statistics view.
    #[must_use]
    pub const fn reporter(&self) -> Reporter<'_> {
        Reporter::new(&self.interceptor)
    }

    /// Summary rows as of now.
    #[must_use]
    pub fn snapshot_summary(&self) -> Vec<SummaryEntry> {
        self.reporter().snapshot_summary()
    }

    /// Slowest calls as of now, slowest first.
    #[must_use]
    pub fn snapshot_slowest(&self) -> Vec<SlowCall> {
        self.reporter().snapshot_slowest()
    }

    /// Publish the final report and release the wrapped instance.
    pub fn dispose(mut self) -> FinalReport {
        self.reported = true;
        self.reporter().publish_final()
    }
}

impl<T: ?Sized> Drop for TimedProxy<T> {
    fn drop(&mut self) {
        if !self.reported {
            self.reported = true;
            self.reporter().publish_final();
        }
    }
}

impl<T: ?Sized> fmt::Debug for TimedProxy<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TimedProxy")
            .field("interceptor", &self.interceptor)
            .field("reported", &self.reported)
            .finish_non_exhaustive()
    }
}
