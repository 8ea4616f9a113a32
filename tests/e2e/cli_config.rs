//! CLI config command tests: precedence and validation errors.

use std::io;
use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../crates/testkit/fixtures/config")
        .join(relative)
}

fn lpx(args: &[&str], env: &[(&str, &str)]) -> io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_lpx"));
    for (key, _) in std::env::vars().filter(|(key, _)| key.starts_with("LPX_")) {
        command.env_remove(key);
    }
    command.envs(env.iter().copied()).args(args).output()
}

#[test]
fn env_beats_overrides_beats_file() -> io::Result<()> {
    let path = fixture("timing-config.valid.json").to_string_lossy().into_owned();
    let output = lpx(
        &[
            "--output",
            "json",
            "config",
            "show",
            "--config",
            path.as_str(),
            "--overrides-json",
            r#"{"slowestCapacity":40,"liveEvents":true}"#,
        ],
        &[("LPX_LIVE_EVENTS", "false")],
    )?;

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).map_err(io::Error::other)?;
    let config = &value["effectiveConfig"];
    assert_eq!(config["slowestCapacity"], 40);
    assert_eq!(config["liveEvents"], false);
    assert_eq!(config["sink"]["format"], "tracing");
    assert_eq!(config["sink"]["minLevel"], "warn");
    Ok(())
}

#[test]
fn toml_defaults_match_builtin_defaults() -> io::Result<()> {
    let path = fixture("timing-config.default.toml").to_string_lossy().into_owned();
    let from_file = lpx(
        &["--output", "json", "config", "show", "--config", path.as_str()],
        &[],
    )?;
    let builtin = lpx(&["--output", "json", "config", "show"], &[])?;

    let from_file: serde_json::Value =
        serde_json::from_slice(&from_file.stdout).map_err(io::Error::other)?;
    let builtin: serde_json::Value =
        serde_json::from_slice(&builtin.stdout).map_err(io::Error::other)?;
    assert_eq!(from_file["effectiveConfig"], builtin["effectiveConfig"]);
    Ok(())
}

#[test]
fn out_of_range_capacity_is_rejected() -> io::Result<()> {
    let path = fixture("timing-config.invalid.json").to_string_lossy().into_owned();
    let output = lpx(
        &["config", "validate", "--config", path.as_str()],
        &[],
    )?;

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("status: error"));
    assert!(stdout.contains("code: config:invalid_limit"));
    Ok(())
}

#[test]
fn malformed_env_is_rejected() -> io::Result<()> {
    let output = lpx(
        &["--output", "json", "config", "validate"],
        &[("LPX_SLOWEST_CAPACITY", "lots")],
    )?;

    assert_eq!(output.status.code(), Some(2));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).map_err(io::Error::other)?;
    assert_eq!(value["error"]["code"], "config:invalid_env_int");
    Ok(())
}
