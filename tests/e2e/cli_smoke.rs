//! CLI smoke tests: build info and argument handling.

use std::io;
use std::process::{Command, Output};

fn lpx(args: &[&str]) -> io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_lpx"));
    for (key, _) in std::env::vars().filter(|(key, _)| key.starts_with("LPX_")) {
        command.env_remove(key);
    }
    command.args(args).output()
}

#[test]
fn info_json_is_deterministic() -> io::Result<()> {
    let first = lpx(&["--output", "json", "info"])?;
    let second = lpx(&["--output", "json", "info"])?;

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout, "info output should be deterministic");

    let value: serde_json::Value = serde_json::from_slice(&first.stdout).map_err(io::Error::other)?;
    assert_eq!(value["status"], "ok");
    assert_eq!(value["engine"]["name"], "latency-proxy-core");
    Ok(())
}

#[test]
fn info_ndjson_is_one_summary_line() -> io::Result<()> {
    let output = lpx(&["--agent", "info"])?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("\"type\":\"summary\""));
    assert!(stdout.contains("\"kind\":\"info\""));
    Ok(())
}

#[test]
fn unknown_subcommand_fails_with_usage() -> io::Result<()> {
    let output = lpx(&["frobnicate"])?;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
    Ok(())
}

#[test]
fn zero_concurrency_exits_with_invalid_input() -> io::Result<()> {
    let output = lpx(&["demo", "--calls", "1", "--concurrency", "0"])?;

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("concurrency must be at least 1"));
    Ok(())
}
