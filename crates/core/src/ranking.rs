//! Bounded slowest-calls ranking.
//!
//! A min-heap of at most `capacity` entries: the fastest retained call sits on
//! top and is evicted first, so the heap always holds the largest latencies
//! seen over the instance's lifetime. A sequence number breaks ties so equal
//! latencies are never collapsed.

use latency_proxy_domain::{OperationKey, SlowCall};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Default number of retained slowest calls.
pub const DEFAULT_SLOWEST_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RankedCall {
    elapsed_ms: i64,
    sequence: u64,
    operation: OperationKey,
}

/// Capacity-bounded ranking of the slowest individual calls.
#[derive(Debug, Clone)]
pub struct SlowestRanking {
    capacity: usize,
    next_sequence: u64,
    heap: BinaryHeap<Reverse<RankedCall>>,
}

impl SlowestRanking {
    /// Create an empty ranking. A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            next_sequence: 0,
            heap: BinaryHeap::with_capacity(capacity.saturating_add(1)),
        }
    }

    /// Maximum number of retained entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Smallest retained latency (the next eviction candidate).
    #[must_use]
    pub fn min_elapsed_ms(&self) -> Option<i64> {
        self.heap.peek().map(|Reverse(call)| call.elapsed_ms)
    }

    /// Insert one observation, evicting the fastest entry when over capacity.
    pub fn insert(&mut self, operation: OperationKey, elapsed_ms: i64) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);

        self.heap.push(Reverse(RankedCall {
            elapsed_ms,
            sequence,
            operation,
        }));
        if self.heap.len() > self.capacity {
            self.heap.pop();
        }
    }

    /// Entries ordered slowest first; equal latencies keep recording order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SlowCall> {
        let mut calls: Vec<&RankedCall> = self.heap.iter().map(|Reverse(call)| call).collect();
        calls.sort_by_key(|call| (Reverse(call.elapsed_ms), call.sequence));
        calls
            .into_iter()
            .map(|call| SlowCall {
                operation: call.operation.clone(),
                elapsed_ms: call.elapsed_ms,
            })
            .collect()
    }
}

impl Default for SlowestRanking {
    fn default() -> Self {
        Self::new(DEFAULT_SLOWEST_CAPACITY)
    }
}
