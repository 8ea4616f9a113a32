//! Shared fixtures: a small catalog contract, its timed proxy, and a recording sink.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use latency_proxy_core::{TimedProxy, WrapOptions, wrap};
use latency_proxy_domain::{
    CallOutcome, ContractSpec, DescribeContract, ImplementationSpec, OperationSpec, TimingMarker,
};
use latency_proxy_ports::{BoxFuture, EventSinkPort, InstrumentationEvent};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogError(pub String);

pub trait Catalog: Send + Sync {
    fn lookup(&self, id: u32) -> Result<String, CatalogError>;
    fn size(&self) -> usize;
    fn explode(&self) -> u32;
    fn refresh(&self, delay_ms: u64) -> BoxFuture<'_, ()>;
    fn fetch(&self, id: u32, delay_ms: u64) -> BoxFuture<'_, Result<String, CatalogError>>;
    fn detonate(&self) -> BoxFuture<'_, u32>;
}

pub struct MemoryCatalog {
    items: BTreeMap<u32, String>,
    dropped: Arc<AtomicBool>,
}

impl MemoryCatalog {
    pub fn new(dropped: Arc<AtomicBool>) -> Self {
        let items = [(1, "anvil"), (2, "bucket"), (3, "chisel")]
            .into_iter()
            .map(|(id, name)| (id, name.to_owned()))
            .collect();
        Self { items, dropped }
    }

    fn find(&self, id: u32) -> Result<String, CatalogError> {
        self.items
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError(format!("no item {id}")))
    }
}

impl Drop for MemoryCatalog {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

impl Catalog for MemoryCatalog {
    fn lookup(&self, id: u32) -> Result<String, CatalogError> {
        self.find(id)
    }

    fn size(&self) -> usize {
        self.items.len()
    }

    fn explode(&self) -> u32 {
        panic!("explode always panics")
    }

    fn refresh(&self, delay_ms: u64) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        })
    }

    fn fetch(&self, id: u32, delay_ms: u64) -> BoxFuture<'_, Result<String, CatalogError>> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            self.find(id)
        })
    }

    fn detonate(&self) -> BoxFuture<'_, u32> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            if self.items.is_empty() {
                return 0_u32;
            }
            panic!("detonate always panics")
        })
    }
}

impl DescribeContract for dyn Catalog {
    fn contract_spec() -> ContractSpec {
        ContractSpec::new("Catalog")
            .operation(OperationSpec::sync("lookup"))
            .operation(OperationSpec::sync("size"))
            .operation(OperationSpec::sync("explode"))
            .operation(OperationSpec::async_void("refresh"))
            .operation(OperationSpec::async_typed::<Result<String, CatalogError>>("fetch"))
            .operation(OperationSpec::async_typed::<u32>("detonate"))
    }
}

impl Catalog for TimedProxy<dyn Catalog> {
    fn lookup(&self, id: u32) -> Result<String, CatalogError> {
        self.try_call("lookup", |inner| inner.lookup(id))
    }

    fn size(&self) -> usize {
        self.call("size", |inner| inner.size())
    }

    fn explode(&self) -> u32 {
        self.call("explode", |inner| inner.explode())
    }

    fn refresh(&self, delay_ms: u64) -> BoxFuture<'_, ()> {
        self.call_async("refresh", move |inner| inner.refresh(delay_ms))
    }

    fn fetch(&self, id: u32, delay_ms: u64) -> BoxFuture<'_, Result<String, CatalogError>> {
        self.try_call_async("fetch", move |inner| inner.fetch(id, delay_ms))
    }

    fn detonate(&self) -> BoxFuture<'_, u32> {
        self.call_async("detonate", |inner| inner.detonate())
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<InstrumentationEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<InstrumentationEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(InstrumentationEvent::name).collect()
    }

    pub fn outcomes(&self) -> Vec<(String, CallOutcome)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                InstrumentationEvent::OperationTimed {
                    operation, outcome, ..
                } => Some((operation.to_string(), outcome)),
                _ => None,
            })
            .collect()
    }
}

impl EventSinkPort for RecordingSink {
    fn emit(&self, event: InstrumentationEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

pub struct Fixture {
    pub proxy: TimedProxy<dyn Catalog>,
    pub sink: Arc<RecordingSink>,
    pub dropped: Arc<AtomicBool>,
}

pub fn measured() -> ImplementationSpec {
    ImplementationSpec::new("MemoryCatalog").with_marker(TimingMarker::default())
}

pub fn fixture(implementation: &ImplementationSpec, options: WrapOptions) -> Fixture {
    fixture_for(&<dyn Catalog>::contract_spec(), implementation, options)
}

pub fn fixture_for(
    contract: &ContractSpec,
    implementation: &ImplementationSpec,
    options: WrapOptions,
) -> Fixture {
    let dropped = Arc::new(AtomicBool::new(false));
    let sink = Arc::new(RecordingSink::default());
    let instance: Box<dyn Catalog> = Box::new(MemoryCatalog::new(Arc::clone(&dropped)));
    let proxy = wrap(
        contract,
        implementation,
        Some(instance),
        Arc::clone(&sink) as Arc<dyn EventSinkPort>,
        options,
    )
    .expect("catalog contract wraps");
    Fixture {
        proxy,
        sink,
        dropped,
    }
}
