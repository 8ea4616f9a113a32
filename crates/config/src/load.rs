//! Config loading helpers (env + file + overrides).
//!
//! The loader owns the merge order and surfaces user-facing errors as typed
//! `ErrorEnvelope`s.

use crate::{SinkFormat, SinkLevel, TimingConfig, TimingEnv, ValidatedTimingConfig, apply_env_overrides};
use latency_proxy_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

/// Load the timing config from sources using a deterministic precedence order.
///
/// Precedence (highest wins):
/// - env overrides (`TimingEnv`)
/// - overrides JSON (partial config)
/// - config JSON (file content)
/// - defaults (`TimingConfig::default()`)
pub fn load_timing_config_from_sources(
    config_json: Option<&str>,
    overrides_json: Option<&str>,
    env: &TimingEnv,
) -> Result<ValidatedTimingConfig, ErrorEnvelope> {
    let config = match config_json {
        None => TimingConfig::default(),
        Some(input) => parse_config_unvalidated(input, ConfigFormat::Json)?,
    };
    merge_and_validate(config, overrides_json, env)
}

/// Load the timing config from an optional file path (`.json` or `.toml`).
pub fn load_timing_config_from_path(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    env: &TimingEnv,
) -> Result<ValidatedTimingConfig, ErrorEnvelope> {
    let config = match config_path {
        None => TimingConfig::default(),
        Some(path) => {
            let config_text = read_config_file(path)?;
            let format = detect_config_format(path)?;
            parse_config_unvalidated(&config_text, format)?
        },
    };
    merge_and_validate(config, overrides_json, env)
}

/// Load the timing config from std env and an optional file path.
pub fn load_timing_config_std_env(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<ValidatedTimingConfig, ErrorEnvelope> {
    let env = TimingEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_timing_config_from_path(config_path, overrides_json, &env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &TimingConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &TimingConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn merge_and_validate(
    mut config: TimingConfig,
    overrides_json: Option<&str>,
    env: &TimingEnv,
) -> Result<ValidatedTimingConfig, ErrorEnvelope> {
    if let Some(input) = overrides_json {
        let overrides = parse_overrides_json(input)?;
        overrides.apply(&mut config);
    }

    // env is applied last and also validates the resulting config.
    apply_env_overrides(config, env)
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<TimingConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
            .with_metadata("source", "config")
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
            .with_metadata("source", "config")
        }),
    }
}

fn parse_overrides_json(input: &str) -> Result<TimingConfigOverrides, ErrorEnvelope> {
    serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid overrides JSON: {error}"),
        )
        .with_metadata("source", "overrides")
    })
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "unsupported config format; use .json or .toml",
        )
        .with_metadata("extension", other.to_string())),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct TimingConfigOverrides {
    version: Option<u32>,
    enabled: Option<bool>,
    slowest_capacity: Option<u32>,
    live_events: Option<bool>,
    sink: SinkConfigOverrides,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct SinkConfigOverrides {
    format: Option<SinkFormat>,
    min_level: Option<SinkLevel>,
}

impl TimingConfigOverrides {
    fn apply(self, config: &mut TimingConfig) {
        if let Some(version) = self.version {
            config.version = version;
        }
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(capacity) = self.slowest_capacity {
            config.slowest_capacity = capacity;
        }
        if let Some(live_events) = self.live_events {
            config.live_events = live_events;
        }
        if let Some(format) = self.sink.format {
            config.sink.format = format;
        }
        if let Some(level) = self.sink.min_level {
            config.sink.min_level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn overrides_beat_file_and_env_beats_overrides() -> Result<(), Box<dyn Error>> {
        let env = TimingEnv {
            live_events: Some(true),
            ..TimingEnv::default()
        };
        let config = load_timing_config_from_sources(
            Some(r#"{"slowestCapacity":10,"liveEvents":false}"#),
            Some(r#"{"slowestCapacity":20,"sink":{"minLevel":"warn"}}"#),
            &env,
        )?;

        assert_eq!(config.slowest_capacity, 20);
        assert_eq!(config.sink.min_level, SinkLevel::Warn);
        assert!(config.live_events);
        Ok(())
    }

    #[test]
    fn overrides_reject_unknown_fields() {
        let Err(error) =
            load_timing_config_from_sources(None, Some(r#"{"capacity":3}"#), &TimingEnv::default())
        else {
            panic!("unknown override must fail");
        };
        assert_eq!(error.code, ErrorCode::new("config", "invalid_json"));
        assert_eq!(
            error.metadata.get("source").map(String::as_str),
            Some("overrides")
        );
    }

    #[test]
    fn format_is_detected_by_extension() -> Result<(), Box<dyn Error>> {
        assert_eq!(
            detect_config_format(Path::new("timing.TOML"))?,
            ConfigFormat::Toml
        );
        assert_eq!(detect_config_format(Path::new("timing"))?, ConfigFormat::Json);
        assert!(detect_config_format(Path::new("timing.yaml")).is_err());
        Ok(())
    }

    #[test]
    fn missing_file_has_a_dedicated_code() {
        let Err(error) = load_timing_config_from_path(
            Some(Path::new("/definitely/not/here/timing.json")),
            None,
            &TimingEnv::default(),
        ) else {
            panic!("missing file must fail");
        };
        assert_eq!(error.code, ErrorCode::new("config", "config_file_not_found"));
    }

    #[test]
    fn pretty_output_round_trips() -> Result<(), Box<dyn Error>> {
        let config = TimingConfig::default();
        let json = to_pretty_json(&config)?;
        assert!(json.ends_with('\n'));
        assert!(json.contains("\"slowestCapacity\": 100"));
        let toml_text = to_pretty_toml(&config)?;
        assert!(toml_text.contains("slowestCapacity = 100"));
        Ok(())
    }
}
