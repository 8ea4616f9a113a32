//! On-demand snapshots and the final report.

use crate::interceptor::CallInterceptor;
use latency_proxy_domain::{SlowCall, SummaryEntry};
use latency_proxy_ports::InstrumentationEvent;
use serde::{Deserialize, Serialize};

/// The structured data produced when a proxy is disposed.
///
/// A table is `None` when its flag is off or timing is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    /// Implementation type name.
    pub implementation: Box<str>,
    /// Per-operation summary, first-recorded order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<SummaryEntry>>,
    /// Slowest calls, slowest first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slowest: Option<Vec<SlowCall>>,
}

impl FinalReport {
    /// Returns true when neither table was produced.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.summary.is_none() && self.slowest.is_none()
    }
}

/// Read-only view over one interceptor's statistics.
#[derive(Debug, Clone, Copy)]
pub struct Reporter<'a> {
    interceptor: &'a CallInterceptor,
}

impl<'a> Reporter<'a> {
    pub(crate) const fn new(interceptor: &'a CallInterceptor) -> Self {
        Self { interceptor }
    }

    /// Summary rows as of now.
    #[must_use]
    pub fn snapshot_summary(&self) -> Vec<SummaryEntry> {
        self.interceptor.aggregator().summary()
    }

    /// Slowest calls as of now, slowest first.
    #[must_use]
    pub fn snapshot_slowest(&self) -> Vec<SlowCall> {
        self.interceptor.aggregator().slowest()
    }

    /// Build the final report without emitting it.
    #[must_use]
    pub fn final_report(&self) -> FinalReport {
        let policy = self.interceptor.policy();
        let enabled = self.interceptor.is_enabled();

        FinalReport {
            implementation: self.interceptor.table().implementation().into(),
            summary: (enabled && policy.record_summary).then(|| self.snapshot_summary()),
            slowest: (enabled && policy.record_slowest).then(|| self.snapshot_slowest()),
        }
    }

    /// Build the final report and emit one event per produced table.
    pub fn publish_final(&self) -> FinalReport {
        let report = self.final_report();
        let sink = self.interceptor.sink();

        if let Some(entries) = &report.summary {
            sink.emit(InstrumentationEvent::SummaryReport {
                implementation: report.implementation.clone(),
                entries: entries.clone(),
            });
        }
        if let Some(entries) = &report.slowest {
            sink.emit(InstrumentationEvent::SlowestReport {
                implementation: report.implementation.clone(),
                entries: entries.clone(),
            });
        }
        report
    }
}
