//! Completion tracking for measured calls.
//!
//! A [`Completion`] owns the timer of one measured call. It records exactly
//! once: explicitly through [`Completion::finish`], or from `Drop` when the
//! call unwound or its future was dropped before resolving. A dropped future
//! is always a cancellation, even while the dropping thread is unwinding.

use crate::interceptor::CallInterceptor;
use futures_util::FutureExt;
use latency_proxy_domain::{CallOutcome, OperationKey, ReturnShape};
use latency_proxy_ports::BoxFuture;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Timer for one in-flight measured call.
pub struct Completion<'a> {
    interceptor: &'a CallInterceptor,
    operation: OperationKey,
    shape: ReturnShape,
    started: Instant,
    recorded: bool,
    awaited: bool,
}

impl<'a> Completion<'a> {
    /// Start the timer. Must be called before the wrapped method is invoked.
    pub(crate) fn start(
        interceptor: &'a CallInterceptor,
        operation: OperationKey,
        shape: ReturnShape,
    ) -> Self {
        Self {
            interceptor,
            operation,
            shape,
            started: Instant::now(),
            recorded: false,
            awaited: false,
        }
    }

    /// Stop the timer and record the outcome.
    pub(crate) fn finish(mut self, outcome: CallOutcome) {
        self.record(outcome);
    }

    fn record(&mut self, outcome: CallOutcome) {
        if self.recorded {
            return;
        }
        self.recorded = true;
        let elapsed_ms = elapsed_ms(self.started);
        self.interceptor
            .complete(&self.operation, &self.shape, outcome, elapsed_ms);
    }
}

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        let outcome = if !self.awaited && std::thread::panicking() {
            CallOutcome::Panicked
        } else {
            CallOutcome::Cancelled
        };
        self.record(outcome);
    }
}

/// Attach timing to the point where `pending` settles.
///
/// The returned future yields the original output unchanged and resumes any
/// panic from the original future after recording it. Dropping it before it
/// resolves records a cancelled completion.
pub(crate) fn observe<'a, R: 'a>(
    mut completion: Completion<'a>,
    pending: BoxFuture<'a, R>,
    classify: fn(&R) -> CallOutcome,
) -> BoxFuture<'a, R> {
    // Panics inside `pending` are caught below.
    completion.awaited = true;
    Box::pin(async move {
        match AssertUnwindSafe(pending).catch_unwind().await {
            Ok(output) => {
                completion.finish(classify(&output));
                output
            },
            Err(payload) => {
                completion.finish(CallOutcome::Panicked);
                panic::resume_unwind(payload)
            },
        }
    })
}

/// Whole milliseconds since `started`, saturating at `i64::MAX`.
pub(crate) fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}

/// Outcome for entry points that cannot observe failure.
pub(crate) const fn succeeded<R>(_: &R) -> CallOutcome {
    CallOutcome::Succeeded
}

/// Outcome for `Result`-returning entry points.
pub(crate) const fn outcome_of<T, E>(result: &Result<T, E>) -> CallOutcome {
    match result {
        Ok(_) => CallOutcome::Succeeded,
        Err(_) => CallOutcome::Failed,
    }
}
