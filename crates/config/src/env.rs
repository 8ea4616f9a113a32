//! Environment variable parsing and env-to-config merging.
//!
//! Parsing is strict: a variable that is present but blank or malformed fails
//! fast instead of falling back to the file or default value.

use crate::schema::{SinkFormat, SinkLevel, TimingConfig, ValidatedTimingConfig};
use latency_proxy_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: master switch for measurement.
pub const ENV_TIMING_ENABLED: &str = "LPX_TIMING_ENABLED";
/// Env var: bound on the slowest-calls ranking.
pub const ENV_SLOWEST_CAPACITY: &str = "LPX_SLOWEST_CAPACITY";
/// Env var: emit one event per measured call.
pub const ENV_LIVE_EVENTS: &str = "LPX_LIVE_EVENTS";
/// Env var: sink format (`json` | `tracing`).
pub const ENV_SINK_FORMAT: &str = "LPX_SINK_FORMAT";
/// Env var: sink minimum level.
pub const ENV_SINK_MIN_LEVEL: &str = "LPX_SINK_MIN_LEVEL";

const ALL_VARS: [&str; 5] = [
    ENV_TIMING_ENABLED,
    ENV_SLOWEST_CAPACITY,
    ENV_LIVE_EVENTS,
    ENV_SINK_FORMAT,
    ENV_SINK_MIN_LEVEL,
];

/// Parsed env overrides. `None` means the variable was not set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingEnv {
    /// `LPX_TIMING_ENABLED`
    pub enabled: Option<bool>,
    /// `LPX_SLOWEST_CAPACITY`
    pub slowest_capacity: Option<u32>,
    /// `LPX_LIVE_EVENTS`
    pub live_events: Option<bool>,
    /// `LPX_SINK_FORMAT`
    pub sink_format: Option<SinkFormat>,
    /// `LPX_SINK_MIN_LEVEL`
    pub sink_min_level: Option<SinkLevel>,
}

impl TimingEnv {
    /// Parse overrides from an explicit variable map.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            enabled: parse_optional_bool(map, ENV_TIMING_ENABLED)?,
            slowest_capacity: parse_optional_u32(map, ENV_SLOWEST_CAPACITY)?,
            live_events: parse_optional_bool(map, ENV_LIVE_EVENTS)?,
            sink_format: parse_optional_enum(map, ENV_SINK_FORMAT, SinkFormat::parse)?,
            sink_min_level: parse_optional_enum(map, ENV_SINK_MIN_LEVEL, SinkLevel::parse)?,
        })
    }

    /// Parse overrides from the process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in ALL_VARS {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_string(), value);
            }
        }

        Self::from_map(&map)
    }

    /// Whether any override is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.enabled.is_none()
            && self.slowest_capacity.is_none()
            && self.live_events.is_none()
            && self.sink_format.is_none()
            && self.sink_min_level.is_none()
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
pub fn apply_env_overrides(
    base: TimingConfig,
    env: &TimingEnv,
) -> Result<ValidatedTimingConfig, ErrorEnvelope> {
    let mut config = base;
    if let Some(enabled) = env.enabled {
        config.enabled = enabled;
    }
    if let Some(capacity) = env.slowest_capacity {
        config.slowest_capacity = capacity;
    }
    if let Some(live_events) = env.live_events {
        config.live_events = live_events;
    }
    if let Some(format) = env.sink_format {
        config.sink.format = format;
    }
    if let Some(level) = env.sink_min_level {
        config.sink.min_level = level;
    }

    config.validate().map_err(Into::into)
}

/// Typed env parsing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Boolean env var had an invalid value.
    InvalidBool {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidBool { .. } => ErrorCode::new("config", "invalid_env_bool"),
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidBool { var, .. } => write!(formatter, "{var} must be a boolean"),
            Self::InvalidInt { var, .. } => write!(formatter, "{var} must be an integer"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidBool { var, value }
            | EnvParseError::InvalidInt { var, value }
            | EnvParseError::InvalidEnum { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", value),
        }
    }
}

fn non_empty<'a>(
    map: &'a BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<(&'a str, &'a String)>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    Ok(Some((trimmed, raw)))
}

fn parse_optional_u32(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u32>, EnvParseError> {
    let Some((trimmed, raw)) = non_empty(map, var)? else {
        return Ok(None);
    };

    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: raw.clone(),
        })
}

fn parse_optional_bool(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<bool>, EnvParseError> {
    let Some((trimmed, raw)) = non_empty(map, var)? else {
        return Ok(None);
    };

    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(EnvParseError::InvalidBool {
            var,
            value: raw.clone(),
        }),
    }
}

fn parse_optional_enum<T>(
    map: &BTreeMap<String, String>,
    var: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, EnvParseError> {
    let Some((trimmed, raw)) = non_empty(map, var)? else {
        return Ok(None);
    };

    parse(trimmed)
        .map(Some)
        .ok_or_else(|| EnvParseError::InvalidEnum {
            var,
            value: raw.clone(),
        })
}
