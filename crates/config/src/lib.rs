//! # latency-proxy-config
//!
//! Timing configuration: schema, validation, env overrides, and file loading.
//! This crate depends on `shared` only; the engine never sees it.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file + overrides).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use schema::{
    CURRENT_CONFIG_VERSION, ConfigSchemaError, DEFAULT_SLOWEST_CAPACITY, SinkConfig, SinkFormat,
    SinkLevel, TimingConfig, ValidatedTimingConfig, parse_timing_config_json,
    parse_timing_config_toml,
};

pub use env::{
    ENV_LIVE_EVENTS, ENV_SINK_FORMAT, ENV_SINK_MIN_LEVEL, ENV_SLOWEST_CAPACITY, ENV_TIMING_ENABLED,
    EnvParseError, TimingEnv, apply_env_overrides,
};
pub use load::{
    load_timing_config_from_path, load_timing_config_from_sources, load_timing_config_std_env,
    to_pretty_json, to_pretty_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
