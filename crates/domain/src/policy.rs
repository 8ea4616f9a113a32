//! Instrumentation policy resolution.

use crate::TimingMarker;
use serde::{Deserialize, Serialize};

/// Where the effective class-level marker came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerSource {
    /// The concrete implementation carried a marker.
    Implementation,
    /// Only the contract carried a marker.
    Contract,
    /// Neither carried a marker.
    None,
}

/// Resolved switches controlling what one wrapped instance measures and reports.
///
/// Derived once when a proxy is built and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentationPolicy {
    /// Time every operation of the contract.
    pub measure_all_operations: bool,
    /// Report the summary table on disposal.
    pub record_summary: bool,
    /// Maintain and report the slowest-calls table.
    pub record_slowest: bool,
}

impl InstrumentationPolicy {
    /// Resolve the policy from optional contract and implementation markers.
    ///
    /// The implementation marker wins outright when present; the two are never
    /// merged. Without any marker nothing is measured by default and nothing is
    /// reported, although per-operation markers still force measurement.
    #[must_use]
    pub const fn resolve(
        contract_marker: Option<TimingMarker>,
        implementation_marker: Option<TimingMarker>,
    ) -> Self {
        Self::resolve_with_source(contract_marker, implementation_marker).0
    }

    /// Same as [`Self::resolve`], also reporting which marker was effective.
    #[must_use]
    pub const fn resolve_with_source(
        contract_marker: Option<TimingMarker>,
        implementation_marker: Option<TimingMarker>,
    ) -> (Self, MarkerSource) {
        match (implementation_marker, contract_marker) {
            (Some(marker), _) => (Self::from_marker(marker), MarkerSource::Implementation),
            (None, Some(marker)) => (Self::from_marker(marker), MarkerSource::Contract),
            (None, None) => (Self::measure_nothing(), MarkerSource::None),
        }
    }

    /// Policy used when no class-level marker exists.
    #[must_use]
    pub const fn measure_nothing() -> Self {
        Self {
            measure_all_operations: false,
            record_summary: false,
            record_slowest: false,
        }
    }

    const fn from_marker(marker: TimingMarker) -> Self {
        Self {
            measure_all_operations: true,
            record_summary: marker.record_summary,
            record_slowest: marker.record_slowest,
        }
    }

    /// Per-call decision: measure when everything is measured or the
    /// operation carries its own marker.
    #[must_use]
    pub const fn should_measure(&self, operation_has_marker: bool) -> bool {
        self.measure_all_operations || operation_has_marker
    }

    /// Returns true when disposal produces at least one report.
    #[must_use]
    pub const fn reports_anything(&self) -> bool {
        self.record_summary || self.record_slowest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn no_markers_measures_nothing() {
        let (policy, source) = InstrumentationPolicy::resolve_with_source(None, None);

        assert_eq!(policy, InstrumentationPolicy::measure_nothing());
        assert_eq!(source, MarkerSource::None);
        assert!(!policy.should_measure(false));
        assert!(policy.should_measure(true));
        assert!(!policy.reports_anything());
    }

    #[test]
    fn contract_marker_applies_without_implementation_marker() {
        let (policy, source) =
            InstrumentationPolicy::resolve_with_source(Some(TimingMarker::slowest_only()), None);

        assert_eq!(source, MarkerSource::Contract);
        assert!(policy.measure_all_operations);
        assert!(!policy.record_summary);
        assert!(policy.record_slowest);
    }

    #[test]
    fn implementation_marker_is_not_merged_with_contract_marker() {
        let policy = InstrumentationPolicy::resolve(
            Some(TimingMarker::new(true, true)),
            Some(TimingMarker::silent()),
        );

        assert!(policy.measure_all_operations);
        assert!(!policy.record_summary);
        assert!(!policy.record_slowest);
    }

    proptest! {
        #[test]
        fn implementation_marker_flags_win(
            contract in proptest::option::of(marker()),
            implementation in marker(),
        ) {
            let policy = InstrumentationPolicy::resolve(contract, Some(implementation));
            prop_assert!(policy.measure_all_operations);
            prop_assert_eq!(policy.record_summary, implementation.record_summary);
            prop_assert_eq!(policy.record_slowest, implementation.record_slowest);
        }

        #[test]
        fn per_operation_marker_always_measures(
            contract in proptest::option::of(marker()),
            implementation in proptest::option::of(marker()),
        ) {
            let policy = InstrumentationPolicy::resolve(contract, implementation);
            prop_assert!(policy.should_measure(true));
        }
    }

    fn marker() -> impl Strategy<Value = TimingMarker> {
        (any::<bool>(), any::<bool>())
            .prop_map(|(summary, slowest)| TimingMarker::new(summary, slowest))
    }
}
