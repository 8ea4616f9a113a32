//! # latency-proxy-adapters
//!
//! `EventSinkPort` implementations: JSON lines, `tracing`, and fan-out.
//! This crate depends on `ports` only.

pub mod fanout;
pub mod json_sink;
pub mod log_sink;
pub mod tracing_sink;

pub use fanout::FanoutEventSink;
pub use json_sink::JsonEventSink;
pub use log_sink::{LogSink, MemoryLogSink, StderrLogSink};
pub use tracing_sink::{TRACING_TARGET, TracingEventSink};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use latency_proxy_ports::ports_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;
        let mut in_dev_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]";
                in_dev_deps = line == "[dev-dependencies]";
                continue;
            }
            if !(in_deps || in_dev_deps) {
                continue;
            }
            if line.starts_with("latency-proxy-") {
                let key = line.split('=').next().unwrap_or("").trim();
                let name = key.split('.').next().unwrap_or("").trim();
                deps.push(name.to_string());
            }
        }

        deps
    }

    #[test]
    fn adapters_do_not_depend_on_the_engine_or_facade() {
        let deps = workspace_deps();
        let forbidden = [
            "latency-proxy-core",
            "latency-proxy-facade",
            "latency-proxy-config",
        ];

        for dep in &deps {
            assert!(
                !forbidden.contains(&dep.as_str()),
                "forbidden dependency found: {dep}"
            );
        }
    }

    #[test]
    fn adapters_crate_compiles() {
        assert!(!adapters_crate_version().is_empty());
        assert!(!ports_crate_version().is_empty());
    }
}
