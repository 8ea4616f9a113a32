//! Per-instance statistics aggregation.

use crate::ranking::SlowestRanking;
use latency_proxy_domain::{OperationKey, RunningStat, SlowCall, SummaryEntry};
use rustc_hash::FxHashMap;
use std::sync::{Mutex, PoisonError};

/// Insertion-ordered summary table.
#[derive(Debug, Default)]
struct SummaryTable {
    rows: Vec<SummaryEntry>,
    index: FxHashMap<OperationKey, usize>,
}

impl SummaryTable {
    fn record(&mut self, operation: &OperationKey, elapsed_ms: i64) {
        if let Some(row) = self
            .index
            .get(operation)
            .and_then(|slot| self.rows.get_mut(*slot))
        {
            row.stat.record(elapsed_ms);
            return;
        }
        self.index.insert(operation.clone(), self.rows.len());
        self.rows.push(SummaryEntry {
            operation: operation.clone(),
            stat: RunningStat::first(elapsed_ms),
        });
    }
}

/// Running summary plus bounded slowest ranking for one wrapped instance.
///
/// The two structures sit behind separate locks; updates to one never wait on
/// the other. Poisoned locks are recovered, so recording never fails.
#[derive(Debug)]
pub struct StatsAggregator {
    record_slowest: bool,
    summary: Mutex<SummaryTable>,
    slowest: Mutex<SlowestRanking>,
}

impl StatsAggregator {
    /// Create an aggregator; the ranking is only fed when `record_slowest` is set.
    #[must_use]
    pub fn new(record_slowest: bool, slowest_capacity: usize) -> Self {
        Self {
            record_slowest,
            summary: Mutex::new(SummaryTable::default()),
            slowest: Mutex::new(SlowestRanking::new(slowest_capacity)),
        }
    }

    /// Record one completed call.
    pub fn record(&self, operation: &OperationKey, elapsed_ms: i64) {
        {
            let mut summary = self.summary.lock().unwrap_or_else(PoisonError::into_inner);
            summary.record(operation, elapsed_ms);
        }
        if self.record_slowest {
            let mut slowest = self.slowest.lock().unwrap_or_else(PoisonError::into_inner);
            slowest.insert(operation.clone(), elapsed_ms);
        }
    }

    /// Point-in-time copy of the summary, in first-recorded order.
    #[must_use]
    pub fn summary(&self) -> Vec<SummaryEntry> {
        self.summary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rows
            .clone()
    }

    /// Point-in-time copy of the ranking, slowest first.
    #[must_use]
    pub fn slowest(&self) -> Vec<SlowCall> {
        self.slowest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    /// Current statistics for one operation.
    #[must_use]
    pub fn stat(&self, operation: &OperationKey) -> Option<RunningStat> {
        let summary = self.summary.lock().unwrap_or_else(PoisonError::into_inner);
        summary
            .index
            .get(operation)
            .and_then(|slot| summary.rows.get(*slot))
            .map(|row| row.stat)
    }
}
