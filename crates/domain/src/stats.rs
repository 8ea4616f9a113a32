//! Statistics value objects.

use crate::OperationKey;
use serde::{Deserialize, Serialize};

/// How a measured call finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallOutcome {
    /// Returned (or resolved) a value.
    Succeeded,
    /// Returned (or resolved) an error.
    Failed,
    /// Unwound while the call was in flight.
    Panicked,
    /// The pending future was dropped before it resolved.
    Cancelled,
}

impl CallOutcome {
    /// Stable label used in events and tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Panicked => "panicked",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Running count, total, min, and max for one operation.
///
/// All arithmetic saturates; elapsed values are whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningStat {
    /// Number of recorded calls (always at least one).
    pub count: u64,
    /// Sum of elapsed milliseconds.
    pub total_elapsed_ms: i64,
    /// Smallest elapsed milliseconds seen.
    pub min_elapsed_ms: i64,
    /// Largest elapsed milliseconds seen.
    pub max_elapsed_ms: i64,
}

impl RunningStat {
    /// Start a record from the first observed call.
    #[must_use]
    pub const fn first(elapsed_ms: i64) -> Self {
        Self {
            count: 1,
            total_elapsed_ms: elapsed_ms,
            min_elapsed_ms: elapsed_ms,
            max_elapsed_ms: elapsed_ms,
        }
    }

    /// Fold another observed call into the record.
    pub fn record(&mut self, elapsed_ms: i64) {
        self.count = self.count.saturating_add(1);
        self.total_elapsed_ms = self.total_elapsed_ms.saturating_add(elapsed_ms);
        self.min_elapsed_ms = self.min_elapsed_ms.min(elapsed_ms);
        self.max_elapsed_ms = self.max_elapsed_ms.max(elapsed_ms);
    }

    /// Mean elapsed milliseconds, rounded toward zero.
    #[must_use]
    pub fn average_ms(&self) -> i64 {
        let count = i64::try_from(self.count).unwrap_or(i64::MAX);
        if count == 0 {
            return 0;
        }
        self.total_elapsed_ms / count
    }
}

/// One row of the per-operation summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEntry {
    /// Operation the row belongs to.
    pub operation: OperationKey,
    /// Aggregated statistics.
    #[serde(flatten)]
    pub stat: RunningStat,
}

impl SummaryEntry {
    /// Mean elapsed milliseconds for the row.
    #[must_use]
    pub fn average_ms(&self) -> i64 {
        self.stat.average_ms()
    }
}

/// One entry of the slowest-calls table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlowCall {
    /// Operation that was called.
    pub operation: OperationKey,
    /// Elapsed whole milliseconds.
    pub elapsed_ms: i64,
}
