//! Synchronous proxy behaviour: transparency, policy, disposal, wrap errors.

mod common;

use common::{Catalog, CatalogError, MemoryCatalog, fixture, fixture_for, measured};
use latency_proxy_core::{WrapError, WrapOptions, dispose, wrap};
use latency_proxy_domain::{
    CallOutcome, ContractSpec, DescribeContract, ImplementationSpec, OperationKey, OperationSpec,
    TimingMarker,
};
use latency_proxy_ports::{EventSinkPort, InstrumentationEvent};
use latency_proxy_shared::ErrorEnvelope;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[test]
fn proxied_results_match_direct_calls() {
    let direct = MemoryCatalog::new(Arc::new(AtomicBool::new(false)));
    let fixture = fixture(&measured(), WrapOptions::default());

    for id in [1, 2, 3, 9] {
        assert_eq!(fixture.proxy.lookup(id), direct.lookup(id));
    }
    assert_eq!(fixture.proxy.size(), direct.size());
    assert_eq!(
        fixture.proxy.lookup(9),
        Err(CatalogError("no item 9".to_owned()))
    );
}

#[test]
fn unmeasured_results_are_identical_too() {
    let fixture = fixture(&ImplementationSpec::new("MemoryCatalog"), WrapOptions::default());

    assert_eq!(fixture.proxy.lookup(2), Ok("bucket".to_owned()));
    assert!(fixture.proxy.snapshot_summary().is_empty());
    assert!(fixture.sink.events().is_empty());
}

#[test]
fn failed_sync_calls_are_timed_and_returned_unchanged() {
    let fixture = fixture(&measured(), WrapOptions::default());

    let result = fixture.proxy.lookup(42);

    assert!(result.is_err());
    assert_eq!(
        fixture.sink.outcomes(),
        vec![("Catalog.lookup".to_owned(), CallOutcome::Failed)]
    );
    let summary = fixture.proxy.snapshot_summary();
    assert_eq!(summary.first().map(|entry| entry.stat.count), Some(1));
}

#[test]
fn per_operation_marker_times_only_that_operation() {
    let implementation = ImplementationSpec::new("MemoryCatalog").mark_operation("lookup");
    let fixture = fixture(&implementation, WrapOptions::default());

    fixture.proxy.lookup(1).ok();
    fixture.proxy.size();

    let summary = fixture.proxy.snapshot_summary();
    let timed: Vec<String> = summary.iter().map(|entry| entry.operation.to_string()).collect();
    assert_eq!(timed, vec!["Catalog.lookup".to_owned()]);

    // No class-level marker: nothing is reported on disposal.
    let report = fixture.proxy.dispose();
    assert!(report.is_empty());
}

#[test]
fn implementation_marker_overrides_contract_flags() {
    let contract = <dyn Catalog>::contract_spec().with_marker(TimingMarker::new(true, false));
    let implementation =
        ImplementationSpec::new("MemoryCatalog").with_marker(TimingMarker::new(false, true));
    let fixture = fixture_for(&contract, &implementation, WrapOptions::default());

    let policy = fixture.proxy.policy();
    assert!(policy.measure_all_operations);
    assert!(!policy.record_summary);
    assert!(policy.record_slowest);

    fixture.proxy.size();
    let report = fixture.proxy.dispose();
    assert!(report.summary.is_none());
    assert_eq!(report.slowest.map(|calls| calls.len()), Some(1));
}

#[test]
fn panicking_calls_are_timed_then_keep_unwinding() {
    let fixture = fixture(&measured(), WrapOptions::default());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| fixture.proxy.explode()));

    assert!(outcome.is_err());
    assert_eq!(
        fixture.sink.outcomes(),
        vec![("Catalog.explode".to_owned(), CallOutcome::Panicked)]
    );
}

#[test]
fn unknown_operations_are_keyed_by_contract_under_measure_all() {
    let fixture = fixture(&measured(), WrapOptions::default());

    let size = fixture.proxy.call("countAll", |inner| inner.size());

    assert_eq!(size, 3);
    let summary = fixture.proxy.snapshot_summary();
    assert_eq!(
        summary.first().map(|entry| entry.operation.clone()),
        Some(OperationKey::new("Catalog", "countAll"))
    );
}

#[test]
fn sync_entry_on_async_operation_warns_and_forwards() {
    let fixture = fixture(&measured(), WrapOptions::default());

    let size = fixture.proxy.call("refresh", |inner| inner.size());

    assert_eq!(size, 3);
    assert!(fixture.proxy.snapshot_summary().is_empty());
    assert_eq!(fixture.sink.names(), vec!["timing.unsupportedReturnShape"]);
}

#[test]
fn disabled_timing_forwards_without_events_or_reports() {
    let options = WrapOptions {
        enabled: false,
        ..WrapOptions::default()
    };
    let fixture = fixture(&measured(), options);

    assert_eq!(fixture.proxy.lookup(3), Ok("chisel".to_owned()));
    let report = fixture.proxy.dispose();

    assert!(report.is_empty());
    assert!(fixture.sink.events().is_empty());
}

#[test]
fn dispose_reports_once_and_releases_the_instance() {
    let fixture = fixture(&measured(), WrapOptions::default());
    for id in [1, 2, 3] {
        fixture.proxy.lookup(id).ok();
    }

    let report = dispose(fixture.proxy);

    assert!(fixture.dropped.load(Ordering::SeqCst));
    let summary = report.summary.unwrap_or_default();
    assert_eq!(summary.first().map(|entry| entry.stat.count), Some(3));
    assert_eq!(report.slowest.map(|calls| calls.len()), Some(3));

    let reports: Vec<&str> = fixture
        .sink
        .names()
        .into_iter()
        .filter(|name| *name != "timing.operation")
        .collect();
    assert_eq!(reports, vec!["timing.summary", "timing.slowest"]);
}

#[test]
fn final_report_serializes_in_camel_case() -> Result<(), serde_json::Error> {
    let fixture = fixture(&measured(), WrapOptions::default());
    fixture.proxy.lookup(1).ok();
    fixture.proxy.lookup(2).ok();

    let report = dispose(fixture.proxy);
    let value = serde_json::to_value(&report)?;

    assert_eq!(value["implementation"], "MemoryCatalog");
    assert_eq!(value["summary"][0]["operation"], "Catalog.lookup");
    assert_eq!(value["summary"][0]["count"], 2);
    assert!(value["summary"][0]["maxElapsedMs"].is_i64());
    assert_eq!(value["slowest"].as_array().map(Vec::len), Some(2));
    assert_eq!(serde_json::from_value::<latency_proxy_core::FinalReport>(value)?, report);
    Ok(())
}

#[test]
fn disabled_report_omits_both_tables() -> Result<(), serde_json::Error> {
    let options = WrapOptions {
        enabled: false,
        ..WrapOptions::default()
    };
    let fixture = fixture(&measured(), options);
    fixture.proxy.size();

    let value = serde_json::to_value(dispose(fixture.proxy))?;

    assert_eq!(value, serde_json::json!({ "implementation": "MemoryCatalog" }));
    Ok(())
}

#[test]
fn dropping_without_dispose_reports_once() {
    let fixture = fixture(&measured(), WrapOptions::default());
    fixture.proxy.size();

    drop(fixture.proxy);

    assert!(fixture.dropped.load(Ordering::SeqCst));
    let summaries = fixture
        .sink
        .events()
        .iter()
        .filter(|event| matches!(event, InstrumentationEvent::SummaryReport { .. }))
        .count();
    assert_eq!(summaries, 1);
}

#[test]
fn live_events_can_be_disabled_while_statistics_continue() {
    let options = WrapOptions {
        live_events: false,
        ..WrapOptions::default()
    };
    let fixture = fixture(&measured(), options);

    fixture.proxy.size();

    assert_eq!(fixture.proxy.snapshot_summary().len(), 1);
    assert!(fixture.sink.outcomes().is_empty());
}

#[test]
fn missing_instance_is_a_null_implementation_error() {
    let sink: Arc<dyn EventSinkPort> = Arc::new(common::RecordingSink::default());
    let result = wrap::<dyn Catalog>(
        &<dyn Catalog>::contract_spec(),
        &measured(),
        None,
        sink,
        WrapOptions::default(),
    );

    let Err(error) = result else {
        panic!("wrapping nothing must fail");
    };
    assert_eq!(
        error,
        WrapError::NullImplementation {
            contract: "Catalog".into()
        }
    );
    let envelope: ErrorEnvelope = error.into();
    assert_eq!(envelope.code.to_string(), "proxy:null_implementation");
}

#[test]
fn conflicting_overloads_fail_proxy_construction() {
    let contract = ContractSpec::new("Catalog")
        .operation(OperationSpec::sync("lookup"))
        .operation(OperationSpec::async_void("lookup"));
    let sink: Arc<dyn EventSinkPort> = Arc::new(common::RecordingSink::default());
    let instance: Box<dyn Catalog> = Box::new(MemoryCatalog::new(Arc::new(AtomicBool::new(false))));

    let result = wrap(&contract, &measured(), Some(instance), sink, WrapOptions::default());

    assert!(matches!(
        result,
        Err(WrapError::ProxyConstructionFailed { .. })
    ));
}

#[test]
fn same_named_overloads_share_one_bucket() {
    let contract = <dyn Catalog>::contract_spec().operation(OperationSpec::sync("lookup"));
    let fixture = fixture_for(&contract, &measured(), WrapOptions::default());

    fixture.proxy.lookup(1).ok();
    fixture.proxy.try_call("lookup", |inner| inner.lookup(2)).ok();

    let summary = fixture.proxy.snapshot_summary();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary.first().map(|entry| entry.stat.count), Some(2));
}
