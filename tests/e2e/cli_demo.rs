//! CLI demo tests: a wrapped service reports its calls on disposal.

use std::io;
use std::process::{Command, Output};

fn lpx(args: &[&str], env: &[(&str, &str)]) -> io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_lpx"));
    for (key, _) in std::env::vars().filter(|(key, _)| key.starts_with("LPX_")) {
        command.env_remove(key);
    }
    command.envs(env.iter().copied()).args(args).output()
}

fn json_lines(bytes: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

#[test]
fn demo_reports_every_call() -> io::Result<()> {
    let output = lpx(
        &[
            "--output",
            "json",
            "--no-progress",
            "demo",
            "--calls",
            "12",
            "--concurrency",
            "3",
            "--latency-ms",
            "0",
        ],
        &[("LPX_LIVE_EVENTS", "false")],
    )?;

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).map_err(io::Error::other)?;
    let summary = value["report"]["summary"]
        .as_array()
        .ok_or_else(|| io::Error::other("summary missing"))?;
    let total: u64 = summary.iter().filter_map(|row| row["count"].as_u64()).sum();
    assert_eq!(total, 24);
    Ok(())
}

#[test]
fn json_sink_emits_one_report_of_each_kind() -> io::Result<()> {
    let output = lpx(
        &["--no-progress", "demo", "--calls", "4", "--concurrency", "2", "--latency-ms", "0"],
        &[("LPX_SINK_FORMAT", "json")],
    )?;

    assert!(output.status.success());
    let events = json_lines(&output.stderr);
    let count = |name: &str| events.iter().filter(|event| event["event"] == name).count();
    assert_eq!(count("timing.operation"), 8);
    assert_eq!(count("timing.summary"), 1);
    assert_eq!(count("timing.slowest"), 1);
    Ok(())
}

#[test]
fn warn_level_sink_hides_per_call_events() -> io::Result<()> {
    let output = lpx(
        &["--no-progress", "demo", "--calls", "4", "--latency-ms", "0"],
        &[("LPX_SINK_MIN_LEVEL", "warn")],
    )?;

    assert!(output.status.success());
    assert!(json_lines(&output.stderr).is_empty());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("summary:"));
    assert!(stdout.contains("slowest:"));
    Ok(())
}

#[test]
fn disabled_timing_is_silent() -> io::Result<()> {
    let output = lpx(
        &["--output", "ndjson", "demo", "--calls", "4", "--latency-ms", "0"],
        &[("LPX_TIMING_ENABLED", "false")],
    )?;

    assert!(output.status.success());
    assert!(json_lines(&output.stderr).is_empty());
    let lines = json_lines(&output.stdout);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["kind"], "demo");
    assert!(lines[0]["report"].get("summary").is_none());
    Ok(())
}
