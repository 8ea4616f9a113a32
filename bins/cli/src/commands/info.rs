//! Info command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use latency_proxy_facade::{EngineInfo, engine_info, facade_crate_version};

/// Run the info command.
pub fn run_info(mode: OutputMode) -> Result<CliOutput, CliError> {
    let engine = engine_info();
    let facade_version = facade_crate_version();

    let stdout = if mode.is_ndjson() {
        format_info_ndjson(&engine, facade_version)?
    } else if mode.is_json() {
        format_info_json(&engine, facade_version)?
    } else {
        format_info_text(&engine, facade_version)
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn format_info_text(engine: &EngineInfo, facade_version: &str) -> String {
    format!(
        "status: ok\nname: {}\nversion: {}\nfacade: {}\nrust: {}\nprofile: {}\nslowestCapacity: {}\nevents: {}\n",
        engine.name,
        engine.version,
        facade_version,
        engine.rust_version,
        engine.profile,
        engine.default_slowest_capacity,
        engine.event_names.join(", "),
    )
}

fn engine_value(engine: &EngineInfo, facade_version: &str) -> serde_json::Value {
    serde_json::json!({
        "name": engine.name,
        "version": engine.version,
        "facadeVersion": facade_version,
        "rustVersion": engine.rust_version,
        "profile": engine.profile,
        "defaultSlowestCapacity": engine.default_slowest_capacity,
        "events": engine.event_names,
    })
}

fn format_info_json(engine: &EngineInfo, facade_version: &str) -> Result<String, CliError> {
    let payload = serde_json::json!({
        "status": "ok",
        "engine": engine_value(engine, facade_version),
    });
    let mut output = serde_json::to_string_pretty(&payload)?;
    output.push('\n');
    Ok(output)
}

fn format_info_ndjson(engine: &EngineInfo, facade_version: &str) -> Result<String, CliError> {
    let payload = serde_json::json!({
        "type": "summary",
        "status": "ok",
        "kind": "info",
        "engine": engine_value(engine, facade_version),
    });
    let mut output = serde_json::to_string(&payload)?;
    output.push('\n');
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;

    #[test]
    fn info_json_output_shape() -> Result<(), Box<dyn std::error::Error>> {
        let output = run_info(OutputMode {
            format: OutputFormat::Json,
            no_progress: true,
        })?;
        let value: serde_json::Value = serde_json::from_str(&output.stdout)?;

        assert_eq!(value["status"], "ok");
        let engine = value["engine"]
            .as_object()
            .ok_or("engine object missing")?;
        for key in [
            "name",
            "version",
            "facadeVersion",
            "rustVersion",
            "profile",
            "defaultSlowestCapacity",
            "events",
        ] {
            assert!(engine.contains_key(key), "missing {key}");
        }
        assert_eq!(value["engine"]["defaultSlowestCapacity"], 100);
        Ok(())
    }

    #[test]
    fn info_text_lists_event_names() -> Result<(), CliError> {
        let output = run_info(OutputMode {
            format: OutputFormat::Text,
            no_progress: true,
        })?;

        assert!(output.stdout.starts_with("status: ok\n"));
        assert!(output.stdout.contains("timing.operation"));
        assert!(output.stdout.contains("timing.slowest"));
        Ok(())
    }
}
