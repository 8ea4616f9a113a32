//! Structured instrumentation event boundary contract.

use latency_proxy_domain::{CallOutcome, OperationKey, ReturnShape, SlowCall, SummaryEntry};
use latency_proxy_shared::ErrorCode;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Event level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventLevel {
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Warn.
    Warn,
    /// Error.
    Error,
}

impl EventLevel {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Returns true when an event at `self` passes a `min_level` filter.
    #[must_use]
    pub const fn passes(self, min_level: Self) -> bool {
        self.rank() >= min_level.rank()
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Debug => 10,
            Self::Info => 20,
            Self::Warn => 30,
            Self::Error => 40,
        }
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Additional event fields.
pub type EventFields = BTreeMap<Box<str>, Value>;

/// Event name for a measured call.
pub const OPERATION_TIMED_EVENT: &str = "timing.operation";
/// Event name for a call whose entry point does not match its declared shape.
pub const UNSUPPORTED_RETURN_SHAPE_EVENT: &str = "timing.unsupportedReturnShape";
/// Event name for the final summary table.
pub const SUMMARY_REPORT_EVENT: &str = "timing.summary";
/// Event name for the final slowest-calls table.
pub const SLOWEST_REPORT_EVENT: &str = "timing.slowest";

/// Everything the instrumentation engine can observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstrumentationEvent {
    /// One measured call completed (or was abandoned).
    OperationTimed {
        /// Implementation type name.
        implementation: Box<str>,
        /// Operation that was called.
        operation: OperationKey,
        /// Declared return shape.
        shape: ReturnShape,
        /// How the call finished.
        outcome: CallOutcome,
        /// Elapsed whole milliseconds.
        elapsed_ms: i64,
    },
    /// The entry point used for a call did not match the declared shape.
    UnsupportedReturnShape {
        /// Implementation type name.
        implementation: Box<str>,
        /// Operation that was called.
        operation: OperationKey,
        /// Shape declared by the contract.
        declared: ReturnShape,
        /// Label of the entry point actually used (`sync` or `async`).
        observed: &'static str,
    },
    /// Final per-operation summary table.
    SummaryReport {
        /// Implementation type name.
        implementation: Box<str>,
        /// Rows in first-recorded order.
        entries: Vec<SummaryEntry>,
    },
    /// Final slowest-calls table.
    SlowestReport {
        /// Implementation type name.
        implementation: Box<str>,
        /// Entries ordered slowest first.
        entries: Vec<SlowCall>,
    },
}

impl InstrumentationEvent {
    /// Stable dotted event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OperationTimed { .. } => OPERATION_TIMED_EVENT,
            Self::UnsupportedReturnShape { .. } => UNSUPPORTED_RETURN_SHAPE_EVENT,
            Self::SummaryReport { .. } => SUMMARY_REPORT_EVENT,
            Self::SlowestReport { .. } => SLOWEST_REPORT_EVENT,
        }
    }

    /// Severity.
    #[must_use]
    pub const fn level(&self) -> EventLevel {
        match self {
            Self::UnsupportedReturnShape { .. } => EventLevel::Warn,
            Self::OperationTimed { .. } | Self::SummaryReport { .. } | Self::SlowestReport { .. } => {
                EventLevel::Info
            },
        }
    }

    /// Implementation the event belongs to.
    #[must_use]
    pub fn implementation(&self) -> &str {
        match self {
            Self::OperationTimed { implementation, .. }
            | Self::UnsupportedReturnShape { implementation, .. }
            | Self::SummaryReport { implementation, .. }
            | Self::SlowestReport { implementation, .. } => implementation,
        }
    }

    /// Human-readable one-line message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::OperationTimed {
                operation,
                elapsed_ms,
                ..
            } => format!("{operation} took {elapsed_ms} ms"),
            Self::UnsupportedReturnShape {
                operation,
                declared,
                observed,
                ..
            } => format!("{operation} is declared {declared} but was called as {observed}; not timed"),
            Self::SummaryReport {
                implementation,
                entries,
            } => format!("{implementation}: {} operations timed", entries.len()),
            Self::SlowestReport {
                implementation,
                entries,
            } => format!("{implementation}: {} slowest calls", entries.len()),
        }
    }

    /// Structured payload for sinks that log fields.
    #[must_use]
    pub fn fields(&self) -> EventFields {
        let mut fields = EventFields::new();
        fields.insert(
            "implementation".into(),
            Value::String(self.implementation().to_owned()),
        );
        match self {
            Self::OperationTimed {
                operation,
                shape,
                outcome,
                elapsed_ms,
                ..
            } => {
                fields.insert("operation".into(), Value::String(operation.to_string()));
                fields.insert("shape".into(), Value::String(shape.to_string()));
                fields.insert("outcome".into(), Value::String(outcome.as_str().to_owned()));
                fields.insert("elapsedMs".into(), Value::from(*elapsed_ms));
            },
            Self::UnsupportedReturnShape {
                operation,
                declared,
                observed,
                ..
            } => {
                fields.insert("operation".into(), Value::String(operation.to_string()));
                fields.insert("declared".into(), Value::String(declared.to_string()));
                fields.insert("observed".into(), Value::String((*observed).to_owned()));
                fields.insert(
                    "code".into(),
                    Value::String(ErrorCode::unsupported_return_shape().to_string()),
                );
            },
            Self::SummaryReport { entries, .. } => {
                fields.insert("entries".into(), to_value(entries));
            },
            Self::SlowestReport { entries, .. } => {
                fields.insert("entries".into(), to_value(entries));
            },
        }
        fields
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Boundary contract for instrumentation output.
///
/// The engine never writes to a terminal; every observation goes through here.
/// Implementations must not block for long and must not panic.
pub trait EventSinkPort: Send + Sync {
    /// Emit one structured event.
    fn emit(&self, event: InstrumentationEvent);
}
