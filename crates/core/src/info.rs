//! Compile-time facts about the engine.

use crate::ranking::DEFAULT_SLOWEST_CAPACITY;
use latency_proxy_ports::{
    OPERATION_TIMED_EVENT, SLOWEST_REPORT_EVENT, SUMMARY_REPORT_EVENT,
    UNSUPPORTED_RETURN_SHAPE_EVENT,
};

/// Static description of the engine build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    /// Package name.
    pub name: &'static str,
    /// Package version (semver).
    pub version: &'static str,
    /// Minimum supported Rust version.
    pub rust_version: &'static str,
    /// `debug` or `release`.
    pub profile: &'static str,
    /// Slowest-calls capacity used when none is configured.
    pub default_slowest_capacity: usize,
    /// Every event name the engine can emit.
    pub event_names: [&'static str; 4],
}

impl EngineInfo {
    /// `name version (profile)`.
    #[must_use]
    pub fn version_string(&self) -> String {
        format!("{} {} ({})", self.name, self.version, self.profile)
    }

    /// Returns true for debug builds.
    #[must_use]
    pub const fn is_debug_profile(&self) -> bool {
        matches!(self.profile.as_bytes(), b"debug")
    }
}

/// Returns the engine's compile-time description.
#[must_use]
pub const fn engine_info() -> EngineInfo {
    EngineInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        rust_version: env!("CARGO_PKG_RUST_VERSION"),
        profile: if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        default_slowest_capacity: DEFAULT_SLOWEST_CAPACITY,
        event_names: [
            OPERATION_TIMED_EVENT,
            UNSUPPORTED_RETURN_SHAPE_EVENT,
            SUMMARY_REPORT_EVENT,
            SLOWEST_REPORT_EVENT,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_info_is_deterministic() {
        assert_eq!(engine_info(), engine_info());
    }

    #[test]
    fn engine_info_fields_are_populated() {
        let info = engine_info();
        assert_eq!(info.name, "latency-proxy-core");
        assert!(!info.version.is_empty());
        assert_eq!(info.default_slowest_capacity, 100);
        assert!(info.version_string().contains(info.version));
        assert_eq!(info.is_debug_profile(), cfg!(debug_assertions));
    }
}
