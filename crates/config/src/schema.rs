//! Timing configuration schema, defaults, and validation.
//!
//! - Deserialization uses `serde` (JSON and TOML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.

use latency_proxy_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Default bound on the slowest-calls ranking.
pub const DEFAULT_SLOWEST_CAPACITY: u32 = 100;

const SLOWEST_CAPACITY_MIN: u32 = 1;
const SLOWEST_CAPACITY_MAX: u32 = 10_000;

/// Top-level timing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct TimingConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Whether proxies measure anything at all.
    pub enabled: bool,
    /// Bound on the slowest-calls ranking kept per proxy.
    pub slowest_capacity: u32,
    /// Emit one event per measured call.
    pub live_events: bool,
    /// Event sink settings.
    pub sink: SinkConfig,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            enabled: true,
            slowest_capacity: DEFAULT_SLOWEST_CAPACITY,
            live_events: true,
            sink: SinkConfig::default(),
        }
    }
}

impl TimingConfig {
    /// Validate the config.
    pub fn validate(self) -> Result<ValidatedTimingConfig, ConfigSchemaError> {
        self.validate_version()?;
        validate_range(
            "timing",
            "slowestCapacity",
            self.slowest_capacity,
            SLOWEST_CAPACITY_MIN,
            SLOWEST_CAPACITY_MAX,
        )?;
        Ok(ValidatedTimingConfig { raw: self })
    }

    const fn validate_version(&self) -> Result<(), ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }
        Ok(())
    }
}

fn validate_range(
    section: &'static str,
    field: &'static str,
    value: u32,
    min: u32,
    max: u32,
) -> Result<(), ConfigSchemaError> {
    if value < min || value > max {
        return Err(ConfigSchemaError::LimitOutOfRange {
            section,
            field,
            value: u64::from(value),
            min: u64::from(min),
            max: u64::from(max),
        });
    }
    Ok(())
}

/// Validated config wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTimingConfig {
    raw: TimingConfig,
}

impl ValidatedTimingConfig {
    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &TimingConfig {
        &self.raw
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> TimingConfig {
        self.raw
    }

    /// Ranking capacity as a collection size.
    #[must_use]
    pub fn slowest_capacity(&self) -> usize {
        usize::try_from(self.raw.slowest_capacity).unwrap_or(usize::MAX)
    }
}

impl AsRef<TimingConfig> for ValidatedTimingConfig {
    fn as_ref(&self) -> &TimingConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedTimingConfig {
    type Target = TimingConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Parse a timing config from a JSON string, applying validation.
pub fn parse_timing_config_json(input: &str) -> Result<ValidatedTimingConfig, ErrorEnvelope> {
    let config: TimingConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate().map_err(Into::into)
}

/// Parse a timing config from a TOML string, applying validation.
pub fn parse_timing_config_toml(input: &str) -> Result<ValidatedTimingConfig, ErrorEnvelope> {
    let config: TimingConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate().map_err(Into::into)
}

/// Event sink configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SinkConfig {
    /// Output format.
    pub format: SinkFormat,
    /// Events below this level are dropped.
    pub min_level: SinkLevel,
}

/// Where instrumentation events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SinkFormat {
    /// One JSON object per line on stderr.
    #[default]
    Json,
    /// Forward to the `tracing` subscriber.
    Tracing,
    /// Both of the above.
    Both,
}

impl SinkFormat {
    /// Return the canonical config string for this format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Tracing => "tracing",
            Self::Both => "both",
        }
    }

    /// Parse a sink format from user or env input.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "json" | "jsonl" => Some(Self::Json),
            "tracing" => Some(Self::Tracing),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

impl fmt::Display for SinkFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Minimum severity written by the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SinkLevel {
    /// Everything.
    Debug,
    /// Timings and reports.
    #[default]
    Info,
    /// Only shape mismatches.
    Warn,
    /// Nothing the engine currently emits.
    Error,
}

impl SinkLevel {
    /// Return the canonical config string for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Parse a level from user or env input.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for SinkLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Typed validation errors for the config schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A numeric limit is out of bounds.
    LimitOutOfRange {
        /// Schema section (e.g. `timing`).
        section: &'static str,
        /// Field name in the config file (e.g. `slowestCapacity`).
        field: &'static str,
        /// Value provided.
        value: u64,
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::LimitOutOfRange { .. } => ErrorCode::new("config", "invalid_limit"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => {
                write!(
                    formatter,
                    "unsupported config version: {found} (supported: {supported})"
                )
            },
            Self::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => write!(
                formatter,
                "{section}.{field} must be between {min} and {max} (got {value})"
            ),
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value", value.to_string())
                .with_metadata("min", min.to_string())
                .with_metadata("max", max.to_string()),
        }
    }
}
