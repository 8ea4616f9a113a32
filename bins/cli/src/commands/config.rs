//! Config command handlers.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{
    CliOutput, ENV_PREFIX, collect_scoped_env, format_error_output, format_ndjson_summary,
    log_info,
};
use latency_proxy_facade::load_effective_config_json;
use std::collections::BTreeMap;
use std::path::Path;

/// Print the effective config.
pub fn run_config_show(
    mode: OutputMode,
    path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<CliOutput, CliError> {
    let env = collect_scoped_env(ENV_PREFIX);
    config_show_with_env(mode, &env, path, overrides_json)
}

/// Validate the effective config.
pub fn run_config_validate(
    mode: OutputMode,
    path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<CliOutput, CliError> {
    let env = collect_scoped_env(ENV_PREFIX);
    config_validate_with_env(mode, &env, path, overrides_json)
}

fn config_show_with_env(
    mode: OutputMode,
    env: &BTreeMap<String, String>,
    path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<CliOutput, CliError> {
    let config_json = match load_effective_config_json(env, path, overrides_json) {
        Ok(config) => config,
        Err(error) => {
            return Ok(format_error_output(
                mode,
                &error,
                ExitCode::for_envelope(&error),
            ));
        },
    };

    let mut stderr = String::new();
    log_info(&mut stderr, "config show completed", mode.no_progress);

    let config_value: serde_json::Value = serde_json::from_str(config_json.trim())?;
    let stdout = if mode.is_ndjson() {
        format_ndjson_summary(
            "ok",
            "config",
            Some(serde_json::json!({ "effectiveConfig": config_value })),
        )
    } else if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "configPath": path.map(|value| value.to_string_lossy().to_string()),
            "effectiveConfig": config_value,
        });
        let mut output = serde_json::to_string_pretty(&payload)?;
        output.push('\n');
        output
    } else {
        let mut out = String::new();
        out.push_str("status: ok\nconfig:\n");
        out.push_str(&config_json);
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

fn config_validate_with_env(
    mode: OutputMode,
    env: &BTreeMap<String, String>,
    path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<CliOutput, CliError> {
    if let Err(error) = load_effective_config_json(env, path, overrides_json) {
        return Ok(format_error_output(
            mode,
            &error,
            ExitCode::for_envelope(&error),
        ));
    }

    let mut stderr = String::new();
    log_info(&mut stderr, "config validate completed", mode.no_progress);

    let stdout = if mode.is_ndjson() {
        format_ndjson_summary("ok", "config", None)
    } else if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "configPath": path.map(|value| value.to_string_lossy().to_string()),
        });
        let mut output = serde_json::to_string_pretty(&payload)?;
        output.push('\n');
        output
    } else {
        path.map_or_else(
            || "status: ok\nconfig: ok\n".to_string(),
            |path| format!("status: ok\nconfig: ok\npath: {}\n", path.to_string_lossy()),
        )
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;
    use std::path::PathBuf;

    const fn mode(format: OutputFormat) -> OutputMode {
        OutputMode {
            format,
            no_progress: true,
        }
    }

    fn fixture_path(relative: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../crates/testkit/fixtures/config")
            .join(relative)
    }

    #[test]
    fn config_overrides_are_applied() -> Result<(), Box<dyn std::error::Error>> {
        let mut env = BTreeMap::new();
        env.insert("LPX_SINK_MIN_LEVEL".to_string(), "error".to_string());

        let output = config_show_with_env(
            mode(OutputFormat::Json),
            &env,
            Some(fixture_path("timing-config.valid.json").as_path()),
            Some(r#"{"slowestCapacity":40}"#),
        )?;
        let value: serde_json::Value = serde_json::from_str(&output.stdout)?;

        assert_eq!(output.exit_code, ExitCode::Ok);
        assert_eq!(value["effectiveConfig"]["slowestCapacity"], 40);
        assert_eq!(value["effectiveConfig"]["liveEvents"], false);
        assert_eq!(value["effectiveConfig"]["sink"]["minLevel"], "error");
        Ok(())
    }

    #[test]
    fn config_show_text_prints_pretty_json() -> Result<(), CliError> {
        let output = config_show_with_env(mode(OutputFormat::Text), &BTreeMap::new(), None, None)?;

        assert!(output.stdout.starts_with("status: ok\nconfig:\n{"));
        assert!(output.stdout.contains("\"slowestCapacity\": 100"));
        Ok(())
    }

    #[test]
    fn config_validate_failure_exit_code_is_invalid_input() -> Result<(), CliError> {
        let output = config_validate_with_env(
            mode(OutputFormat::Text),
            &BTreeMap::new(),
            Some(fixture_path("timing-config.invalid.json").as_path()),
            None,
        )?;

        assert_eq!(output.exit_code, ExitCode::InvalidInput);
        assert!(output.stdout.contains("status: error"));
        assert!(output.stdout.contains("config:invalid_limit"));
        Ok(())
    }

    #[test]
    fn missing_config_file_is_invalid_input() -> Result<(), CliError> {
        let missing = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("missing-config.json");

        let output = config_validate_with_env(
            mode(OutputFormat::Ndjson),
            &BTreeMap::new(),
            Some(missing.as_path()),
            None,
        )?;

        assert_eq!(output.exit_code, ExitCode::InvalidInput);
        assert!(output.stdout.contains("config:config_file_not_found"));
        Ok(())
    }

    #[test]
    fn invalid_env_is_reported() -> Result<(), CliError> {
        let mut env = BTreeMap::new();
        env.insert("LPX_TIMING_ENABLED".to_string(), "sometimes".to_string());

        let output = config_show_with_env(mode(OutputFormat::Json), &env, None, None)?;

        assert_eq!(output.exit_code, ExitCode::InvalidInput);
        assert!(output.stdout.contains("config:invalid_env_bool"));
        Ok(())
    }
}
