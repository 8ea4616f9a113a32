//! # latency-proxy-facade
//!
//! Registration layer for consumers (CLI and host applications): turns a
//! validated `TimingConfig` into `WrapOptions` plus an event sink, and wraps
//! instances through the core engine.
//! This crate depends on `config`, `adapters`, and `core`.

use latency_proxy_adapters::{FanoutEventSink, JsonEventSink, TracingEventSink};
use latency_proxy_config::{
    SinkFormat, SinkLevel, TimingEnv, load_timing_config_from_path, to_pretty_json,
};
use latency_proxy_core::{WrapOptions, wrap_described};
use latency_proxy_domain::{DescribeContract, ImplementationSpec};
use latency_proxy_ports::{EventLevel, EventSinkPort};
use latency_proxy_shared::ErrorEnvelope;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

pub use latency_proxy_config::{TimingConfig, ValidatedTimingConfig};
pub use latency_proxy_core::{EngineInfo, FinalReport, TimedProxy, dispose, engine_info};
pub use latency_proxy_domain::{
    DescribeImplementation, OperationKey, RunningStat, SlowCall, SummaryEntry,
};

/// Returns the facade crate version.
#[must_use]
pub const fn facade_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Map the configured sink level onto the event level scale.
#[must_use]
pub const fn event_level(level: SinkLevel) -> EventLevel {
    match level {
        SinkLevel::Debug => EventLevel::Debug,
        SinkLevel::Info => EventLevel::Info,
        SinkLevel::Warn => EventLevel::Warn,
        SinkLevel::Error => EventLevel::Error,
    }
}

/// Engine options derived from the config.
#[must_use]
pub fn wrap_options(config: &ValidatedTimingConfig) -> WrapOptions {
    WrapOptions {
        enabled: config.enabled,
        slowest_capacity: config.slowest_capacity(),
        live_events: config.live_events,
    }
}

/// Build the sinks selected by the config's format, in emission order.
#[must_use]
pub fn build_sinks(config: &ValidatedTimingConfig) -> Vec<Arc<dyn EventSinkPort>> {
    let min_level = event_level(config.sink.min_level);
    let json_sink = || -> Arc<dyn EventSinkPort> {
        Arc::new(JsonEventSink::stderr().with_min_level(min_level))
    };
    let tracing_sink = || -> Arc<dyn EventSinkPort> {
        Arc::new(TracingEventSink::new().with_min_level(min_level))
    };
    match config.sink.format {
        SinkFormat::Json => vec![json_sink()],
        SinkFormat::Tracing => vec![tracing_sink()],
        SinkFormat::Both => vec![json_sink(), tracing_sink()],
    }
}

/// Build the event sink described by the config.
#[must_use]
pub fn build_sink(config: &ValidatedTimingConfig) -> Arc<dyn EventSinkPort> {
    fan_out(build_sinks(config))
}

fn fan_out(mut sinks: Vec<Arc<dyn EventSinkPort>>) -> Arc<dyn EventSinkPort> {
    if sinks.len() == 1
        && let Some(only) = sinks.pop()
    {
        return only;
    }
    Arc::new(FanoutEventSink::new(sinks))
}

/// Wrap an instance using the config's options and sink.
pub fn register<T: ?Sized + DescribeContract>(
    implementation: &ImplementationSpec,
    instance: Option<Box<T>>,
    config: &ValidatedTimingConfig,
) -> Result<TimedProxy<T>, ErrorEnvelope> {
    register_with_sink(implementation, instance, config, build_sink(config))
}

/// Wrap an instance using the config's options and a caller-provided sink.
pub fn register_with_sink<T: ?Sized + DescribeContract>(
    implementation: &ImplementationSpec,
    instance: Option<Box<T>>,
    config: &ValidatedTimingConfig,
    sink: Arc<dyn EventSinkPort>,
) -> Result<TimedProxy<T>, ErrorEnvelope> {
    let options = wrap_options(config);
    let proxy = wrap_described(implementation, instance, sink, options)?;
    tracing::debug!(
        contract = proxy.table().contract(),
        implementation = implementation.type_name(),
        enabled = options.enabled,
        measure_all = proxy.policy().measure_all_operations,
        "registered timed proxy"
    );
    Ok(proxy)
}

/// Wrap an instance, sending events to the configured sinks and `extra`.
pub fn register_with_sinks<T: ?Sized + DescribeContract>(
    implementation: &ImplementationSpec,
    instance: Option<Box<T>>,
    config: &ValidatedTimingConfig,
    extra: impl IntoIterator<Item = Arc<dyn EventSinkPort>>,
) -> Result<TimedProxy<T>, ErrorEnvelope> {
    let mut sinks = build_sinks(config);
    sinks.extend(extra);
    register_with_sink(implementation, instance, config, fan_out(sinks))
}

/// Load and validate the effective config from an explicit env map.
pub fn load_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<ValidatedTimingConfig, ErrorEnvelope> {
    let env = TimingEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    load_timing_config_from_path(config_path, overrides_json, &env)
}

/// Load and validate the effective config, returning deterministic pretty JSON.
pub fn load_effective_config_json(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<String, ErrorEnvelope> {
    let config = load_config(env, config_path, overrides_json)?;
    to_pretty_json(&config)
}
