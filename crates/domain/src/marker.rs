//! Declarative timing markers.
//!
//! A marker is plain data attached to a contract, an implementation, or a
//! single operation at registration time. Nothing in the workspace discovers
//! markers by itself; callers build them and hand them to the engine.

use serde::{Deserialize, Serialize};

/// Class-level (contract or implementation) timing marker.
///
/// Presence of the marker means "measure every operation"; the flags select
/// which aggregate views are reported when the proxy is disposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingMarker {
    /// Feed the per-operation summary table.
    pub record_summary: bool,
    /// Feed the slowest-calls table.
    pub record_slowest: bool,
}

impl TimingMarker {
    /// Build a marker with explicit flags.
    #[must_use]
    pub const fn new(record_summary: bool, record_slowest: bool) -> Self {
        Self {
            record_summary,
            record_slowest,
        }
    }

    /// Measure everything but only report the summary table.
    #[must_use]
    pub const fn summary_only() -> Self {
        Self::new(true, false)
    }

    /// Measure everything but only report the slowest-calls table.
    #[must_use]
    pub const fn slowest_only() -> Self {
        Self::new(false, true)
    }

    /// Measure everything, report nothing (live events only).
    #[must_use]
    pub const fn silent() -> Self {
        Self::new(false, false)
    }
}

impl Default for TimingMarker {
    fn default() -> Self {
        Self::new(true, true)
    }
}
