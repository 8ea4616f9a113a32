//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Parser, Subcommand};
use commands::{DemoCommandInput, run_config_show, run_config_validate, run_demo, run_info};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode};
use latency_proxy_shared::ErrorEnvelope;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Prefix shared by every environment variable the CLI reads.
pub(crate) const ENV_PREFIX: &str = "LPX_";

/// Filter directives for the CLI's own `tracing` output.
const LOG_ENV: &str = "LPX_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "lpx",
    version,
    about = "Call-latency instrumentation proxy CLI",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show engine build information.
    Info,
    /// Inspect the effective timing configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Wrap the sample inventory service, drive calls through it, and report.
    Demo {
        /// Config file (JSON or TOML).
        #[arg(long = "config")]
        path: Option<PathBuf>,
        /// JSON overrides applied on top of the config file.
        #[arg(long)]
        overrides_json: Option<String>,
        /// Synchronous calls to issue (the same number of async calls follows).
        #[arg(long, default_value_t = 20)]
        calls: usize,
        /// Concurrent tasks sharing the proxy.
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
        /// Simulated base latency of async calls, in milliseconds.
        #[arg(long, default_value_t = 2)]
        latency_ms: u64,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Print the effective config after env and overrides.
    Show {
        /// Config file (JSON or TOML).
        #[arg(long = "config")]
        path: Option<PathBuf>,
        /// JSON overrides applied on top of the config file.
        #[arg(long)]
        overrides_json: Option<String>,
    },
    /// Validate the effective config.
    Validate {
        /// Config file (JSON or TOML).
        #[arg(long = "config")]
        path: Option<PathBuf>,
        /// JSON overrides applied on top of the config file.
        #[arg(long)]
        overrides_json: Option<String>,
    },
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing();
    let mode = OutputMode::from_args(&cli.output);

    match run(&cli.command, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed when embedded in a test harness.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(command: &Commands, mode: OutputMode) -> Result<CliOutput, CliError> {
    match command {
        Commands::Info => run_info(mode),
        Commands::Config { command } => match command {
            ConfigCommands::Show {
                path,
                overrides_json,
            } => run_config_show(mode, path.as_deref(), overrides_json.as_deref()),
            ConfigCommands::Validate {
                path,
                overrides_json,
            } => run_config_validate(mode, path.as_deref(), overrides_json.as_deref()),
        },
        Commands::Demo {
            path,
            overrides_json,
            calls,
            concurrency,
            latency_ms,
        } => run_demo(
            mode,
            &DemoCommandInput {
                config_path: path.as_deref(),
                overrides_json: overrides_json.as_deref(),
                calls: *calls,
                concurrency: *concurrency,
                latency_ms: *latency_ms,
            },
        ),
    }
}

pub(crate) fn format_error_output(
    mode: OutputMode,
    error: &ErrorEnvelope,
    exit_code: ExitCode,
) -> CliOutput {
    let mut stderr = String::new();
    log_info(&mut stderr, "command failed", mode.no_progress);

    let payload = serde_json::json!({
        "code": error.code.to_string(),
        "message": error.message,
        "kind": error.kind.to_string(),
        "metadata": error.metadata,
    });

    let stdout = if mode.is_ndjson() {
        let line = serde_json::json!({
            "type": "error",
            "status": "error",
            "error": payload,
        });
        let mut out = serde_json::to_string(&line).unwrap_or_else(|_| {
            "{\"type\":\"error\",\"status\":\"error\",\"error\":{\"code\":\"core:internal\"}}"
                .to_string()
        });
        out.push('\n');
        out
    } else if mode.is_json() {
        let document = serde_json::json!({
            "status": "error",
            "error": payload,
        });
        // This is a CLI boundary, so JSON serialization errors are internal.
        let mut out = serde_json::to_string_pretty(&document).unwrap_or_else(|_| {
            "{\"status\":\"error\",\"error\":{\"code\":\"core:internal\"}}".to_string()
        });
        out.push('\n');
        out
    } else {
        format_error_text(error)
    };

    CliOutput {
        stdout,
        stderr,
        exit_code,
    }
}

fn format_error_text(error: &ErrorEnvelope) -> String {
    let mut out = String::new();
    out.push_str("status: error\n");
    out.push_str("code: ");
    out.push_str(&error.code.to_string());
    out.push('\n');
    out.push_str("message: ");
    out.push_str(&error.message);
    out.push('\n');
    out.push_str("kind: ");
    out.push_str(&error.kind.to_string());
    out.push('\n');

    if !error.metadata.is_empty() {
        out.push_str("meta:\n");
        for (key, value) in &error.metadata {
            out.push_str("  ");
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
    }

    out
}

pub(crate) fn log_info(stderr: &mut String, message: &str, no_progress: bool) {
    if no_progress {
        return;
    }
    stderr.push_str("info: ");
    stderr.push_str(message);
    stderr.push('\n');
}

pub(crate) fn format_ndjson_summary(
    status: &str,
    kind: &str,
    extra: Option<serde_json::Value>,
) -> String {
    let mut payload = serde_json::Map::new();
    payload.insert(
        "type".to_string(),
        serde_json::Value::String("summary".to_string()),
    );
    payload.insert(
        "status".to_string(),
        serde_json::Value::String(status.to_string()),
    );
    payload.insert(
        "kind".to_string(),
        serde_json::Value::String(kind.to_string()),
    );
    if let Some(serde_json::Value::Object(map)) = extra {
        for (key, value) in map {
            payload.insert(key, value);
        }
    }
    let mut out = serde_json::to_string(&serde_json::Value::Object(payload)).unwrap_or_else(|_| {
        "{\"type\":\"summary\",\"status\":\"error\",\"kind\":\"internal\"}".to_string()
    });
    out.push('\n');
    out
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}

pub(crate) fn collect_scoped_env(prefix: &str) -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(prefix))
        .collect()
}
