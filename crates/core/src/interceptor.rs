//! The call interceptor: per-call measure/forward decision and timing capture.

use crate::aggregator::StatsAggregator;
use crate::completion::{self, Completion};
use crate::dispatch::{EntryPoint, OperationTable, Route};
use latency_proxy_domain::{CallOutcome, InstrumentationPolicy, OperationKey, ReturnShape};
use latency_proxy_ports::{BoxFuture, EventSinkPort, InstrumentationEvent};
use std::sync::Arc;

/// Dispatch point shared by every call routed through one proxy.
pub struct CallInterceptor {
    table: OperationTable,
    aggregator: StatsAggregator,
    sink: Arc<dyn EventSinkPort>,
    enabled: bool,
    live_events: bool,
}

impl CallInterceptor {
    /// Assemble an interceptor from a built table.
    #[must_use]
    pub fn new(
        table: OperationTable,
        aggregator: StatsAggregator,
        sink: Arc<dyn EventSinkPort>,
        enabled: bool,
        live_events: bool,
    ) -> Self {
        Self {
            table,
            aggregator,
            sink,
            enabled,
            live_events,
        }
    }

    /// Dispatch table.
    #[must_use]
    pub const fn table(&self) -> &OperationTable {
        &self.table
    }

    /// Resolved policy.
    #[must_use]
    pub const fn policy(&self) -> InstrumentationPolicy {
        self.table.policy()
    }

    /// Statistics collected so far.
    #[must_use]
    pub const fn aggregator(&self) -> &StatsAggregator {
        &self.aggregator
    }

    /// Whether timing is enabled for this instance at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn sink(&self) -> &dyn EventSinkPort {
        self.sink.as_ref()
    }

    fn route(
        &self,
        operation: &str,
        entry_point: EntryPoint,
        inferred: impl FnOnce() -> ReturnShape,
    ) -> Route {
        if !self.enabled {
            return Route::Forward;
        }
        self.table.route(operation, entry_point, inferred)
    }

    /// Run a synchronous call, timing it when the policy says so.
    ///
    /// A panic inside `call` is recorded and keeps unwinding.
    pub fn intercept<R>(
        &self,
        operation: &str,
        call: impl FnOnce() -> R,
        classify: fn(&R) -> CallOutcome,
    ) -> R {
        match self.route(operation, EntryPoint::Sync, || ReturnShape::Synchronous) {
            Route::Forward => call(),
            Route::Mismatch { key, declared } => {
                self.warn_mismatch(key, declared, EntryPoint::Sync);
                call()
            },
            Route::Measure { key, shape } => {
                let completion = Completion::start(self, key, shape);
                let output = call();
                completion.finish(classify(&output));
                output
            },
        }
    }

    /// Run a call that returns a future, timing it up to its completion.
    ///
    /// The timer starts before `call` runs; the forwarding itself is not
    /// recorded separately.
    pub fn intercept_async<'a, R: 'a>(
        &'a self,
        operation: &str,
        call: impl FnOnce() -> BoxFuture<'a, R>,
        classify: fn(&R) -> CallOutcome,
    ) -> BoxFuture<'a, R> {
        match self.route(operation, EntryPoint::Async, inferred_async_shape::<R>) {
            Route::Forward => call(),
            Route::Mismatch { key, declared } => {
                self.warn_mismatch(key, declared, EntryPoint::Async);
                call()
            },
            Route::Measure { key, shape } => {
                let completion = Completion::start(self, key, shape);
                let pending = call();
                completion::observe(completion, pending, classify)
            },
        }
    }

    pub(crate) fn complete(
        &self,
        operation: &OperationKey,
        shape: &ReturnShape,
        outcome: CallOutcome,
        elapsed_ms: i64,
    ) {
        self.aggregator.record(operation, elapsed_ms);
        if self.live_events {
            self.sink.emit(InstrumentationEvent::OperationTimed {
                implementation: self.table.implementation().into(),
                operation: operation.clone(),
                shape: shape.clone(),
                outcome,
                elapsed_ms,
            });
        }
    }

    fn warn_mismatch(&self, operation: OperationKey, declared: ReturnShape, entry_point: EntryPoint) {
        self.sink.emit(InstrumentationEvent::UnsupportedReturnShape {
            implementation: self.table.implementation().into(),
            operation,
            declared,
            observed: entry_point.label(),
        });
    }
}

impl std::fmt::Debug for CallInterceptor {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("CallInterceptor")
            .field("table", &self.table)
            .field("enabled", &self.enabled)
            .field("live_events", &self.live_events)
            .finish_non_exhaustive()
    }
}

fn inferred_async_shape<R>() -> ReturnShape {
    if std::any::type_name::<R>() == "()" {
        ReturnShape::AsyncVoid
    } else {
        ReturnShape::async_typed::<R>()
    }
}
