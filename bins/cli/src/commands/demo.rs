//! Demo command: drive the sample inventory service through a timed proxy.

use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, render_slowest_table, render_summary_table};
use crate::{
    CliOutput, ENV_PREFIX, collect_scoped_env, format_error_output, format_ndjson_summary,
    log_info,
};
use latency_proxy_facade::{
    DescribeImplementation, FinalReport, TimedProxy, dispose, load_config, register,
};
use latency_proxy_testkit::{InventoryService, Warehouse};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Inputs for the demo command.
#[derive(Debug, Clone, Copy)]
pub struct DemoCommandInput<'a> {
    pub config_path: Option<&'a Path>,
    pub overrides_json: Option<&'a str>,
    pub calls: usize,
    pub concurrency: usize,
    pub latency_ms: u64,
}

#[derive(Debug)]
struct DemoRun {
    report: FinalReport,
    failures: usize,
}

/// Run the demo command.
pub fn run_demo(mode: OutputMode, input: &DemoCommandInput<'_>) -> Result<CliOutput, CliError> {
    let env = collect_scoped_env(ENV_PREFIX);
    demo_with_env(mode, &env, input)
}

fn demo_with_env(
    mode: OutputMode,
    env: &BTreeMap<String, String>,
    input: &DemoCommandInput<'_>,
) -> Result<CliOutput, CliError> {
    if input.concurrency == 0 {
        return Err(CliError::InvalidInput(
            "concurrency must be at least 1".to_string(),
        ));
    }

    let config = match load_config(env, input.config_path, input.overrides_json) {
        Ok(config) => config,
        Err(error) => {
            return Ok(format_error_output(
                mode,
                &error,
                ExitCode::for_envelope(&error),
            ));
        },
    };

    let warehouse: Box<dyn InventoryService> = Box::new(Warehouse::new(input.latency_ms));
    let proxy = match register(&Warehouse::implementation_spec(), Some(warehouse), &config) {
        Ok(proxy) => proxy,
        Err(error) => {
            return Ok(format_error_output(
                mode,
                &error,
                ExitCode::for_envelope(&error),
            ));
        },
    };

    let mut stderr = String::new();
    log_info(
        &mut stderr,
        &format!(
            "driving {calls} sync and {calls} async calls across {tasks} tasks",
            calls = input.calls,
            tasks = input.concurrency
        ),
        mode.no_progress,
    );

    let run = execute(proxy, input.calls, input.concurrency)?;
    tracing::debug!(
        implementation = %run.report.implementation,
        failures = run.failures,
        "demo finished"
    );
    log_info(&mut stderr, "demo completed", mode.no_progress);

    let stdout = if mode.is_ndjson() {
        format_ndjson_summary("ok", "demo", Some(demo_value(input, &run)?))
    } else if mode.is_json() {
        let mut payload = demo_value(input, &run)?;
        if let serde_json::Value::Object(map) = &mut payload {
            map.insert("status".to_string(), serde_json::Value::from("ok"));
        }
        let mut output = serde_json::to_string_pretty(&payload)?;
        output.push('\n');
        output
    } else {
        format_demo_text(input, &run)
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

fn execute(
    proxy: TimedProxy<dyn InventoryService>,
    calls: usize,
    concurrency: usize,
) -> Result<DemoRun, CliError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let proxy = Arc::new(proxy);
    let failures = runtime.block_on(drive(Arc::clone(&proxy), calls, concurrency))?;
    let proxy = Arc::try_unwrap(proxy)
        .map_err(|_| CliError::Runtime("proxy still shared after the demo".to_string()))?;

    Ok(DemoRun {
        report: dispose(proxy),
        failures,
    })
}

async fn drive(
    proxy: Arc<TimedProxy<dyn InventoryService>>,
    calls: usize,
    concurrency: usize,
) -> Result<usize, CliError> {
    let mut handles = Vec::with_capacity(concurrency);
    for task in 0..concurrency {
        let proxy = Arc::clone(&proxy);
        handles.push(tokio::spawn(async move {
            run_task(&*proxy, task, calls, concurrency).await
        }));
    }

    let mut failures = 0;
    for handle in handles {
        failures += handle.await?;
    }
    Ok(failures)
}

// Task `task` takes every `stride`-th call index starting at its own number.
async fn run_task(
    service: &dyn InventoryService,
    task: usize,
    calls: usize,
    stride: usize,
) -> usize {
    let mut failures = 0;
    for index in (task..calls).step_by(stride) {
        let sku = sku_for(index);

        if index % 2 == 0 {
            let _ = service.count();
        } else if service.stock(sku).is_err() {
            failures += 1;
        }

        if index % 3 == 0 {
            service.restock("anvil", 2).await;
        } else if service.reserve(sku, 1).await.is_err() {
            failures += 1;
        }
    }
    failures
}

// "drill" is never stocked, so calls touching it fail.
const fn sku_for(index: usize) -> &'static str {
    match index % 4 {
        0 => "anvil",
        1 => "bucket",
        2 => "chisel",
        _ => "drill",
    }
}

fn demo_value(input: &DemoCommandInput<'_>, run: &DemoRun) -> Result<serde_json::Value, CliError> {
    Ok(serde_json::json!({
        "calls": input.calls,
        "concurrency": input.concurrency,
        "failures": run.failures,
        "report": serde_json::to_value(&run.report)?,
    }))
}

fn format_demo_text(input: &DemoCommandInput<'_>, run: &DemoRun) -> String {
    let mut out = format!(
        "status: ok\nimplementation: {}\ncalls: {} sync + {} async across {} tasks\nfailures: {}\n",
        run.report.implementation, input.calls, input.calls, input.concurrency, run.failures
    );

    match &run.report.summary {
        Some(entries) => {
            out.push_str("\nsummary:\n");
            out.push_str(&render_summary_table(entries));
        },
        None => out.push_str("summary: disabled\n"),
    }
    match &run.report.slowest {
        Some(entries) => {
            out.push_str("\nslowest:\n");
            out.push_str(&render_slowest_table(entries));
        },
        None => out.push_str("slowest: disabled\n"),
    }
    out
}
