//! Output format helpers for CLI commands.

use clap::{Args, ValueEnum};
use latency_proxy_facade::{SlowCall, SummaryEntry};
use std::fmt::Write as _;

/// Output format choices for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly text output.
    Text,
    /// Machine-friendly JSON output.
    Json,
    /// Line-delimited JSON (NDJSON) output.
    Ndjson,
}

/// Output-related CLI flags.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output format for command responses.
    #[arg(long, global = true, value_enum)]
    pub output: Option<OutputFormat>,
    /// Emit machine-friendly defaults (NDJSON output, no progress).
    #[arg(long, global = true)]
    pub agent: bool,
    /// Suppress progress/logging output.
    #[arg(long, global = true)]
    pub no_progress: bool,
}

/// Output mode derived from CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct OutputMode {
    pub format: OutputFormat,
    pub no_progress: bool,
}

impl OutputMode {
    /// Build output mode from CLI flags.
    #[must_use]
    pub const fn from_args(args: &OutputArgs) -> Self {
        let format = match (args.output, args.agent) {
            (Some(value), _) => value,
            (None, true) => OutputFormat::Ndjson,
            (None, false) => OutputFormat::Text,
        };

        Self {
            format,
            no_progress: args.agent || args.no_progress,
        }
    }

    /// Returns true when JSON output is requested.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Returns true when NDJSON output is requested.
    #[must_use]
    pub const fn is_ndjson(self) -> bool {
        matches!(self.format, OutputFormat::Ndjson)
    }
}

const SUMMARY_HEADERS: [&str; 6] = [
    "operation",
    "calls",
    "total_ms",
    "avg_ms",
    "min_ms",
    "max_ms",
];
const SLOWEST_HEADERS: [&str; 3] = ["rank", "operation", "elapsed_ms"];

/// Render summary rows as an aligned text table.
#[must_use]
pub fn render_summary_table(entries: &[SummaryEntry]) -> String {
    let rows: Vec<[String; 6]> = entries
        .iter()
        .map(|entry| {
            [
                entry.operation.to_string(),
                entry.stat.count.to_string(),
                entry.stat.total_elapsed_ms.to_string(),
                entry.average_ms().to_string(),
                entry.stat.min_elapsed_ms.to_string(),
                entry.stat.max_elapsed_ms.to_string(),
            ]
        })
        .collect();
    render_table(SUMMARY_HEADERS, &rows)
}

/// Render the slowest calls as an aligned text table, slowest first.
#[must_use]
pub fn render_slowest_table(entries: &[SlowCall]) -> String {
    let rows: Vec<[String; 3]> = entries
        .iter()
        .enumerate()
        .map(|(index, call)| {
            [
                (index + 1).to_string(),
                call.operation.to_string(),
                call.elapsed_ms.to_string(),
            ]
        })
        .collect();
    render_table(SLOWEST_HEADERS, &rows)
}

// Operation names are left-aligned, numbers right-aligned.
fn render_table<const N: usize>(headers: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths = headers.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers, &widths, &headers);
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_row(&mut out, &cells, &widths, &headers);
    }
    out
}

fn push_row(out: &mut String, cells: &[&str], widths: &[usize], headers: &[&str]) {
    let mut line = String::new();
    for ((cell, width), header) in cells.iter().zip(widths).zip(headers) {
        if !line.is_empty() {
            line.push_str("  ");
        }
        if *header == "operation" {
            let _ = write!(line, "{cell:<width$}");
        } else {
            let _ = write!(line, "{cell:>width$}");
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
