//! Sample contract with a timed proxy implementation.
//!
//! `InventoryService` mixes the shapes the engine distinguishes: plain sync
//! values, sync `Result`s, futures resolving to `()`, and futures resolving to
//! a `Result`. `Warehouse` is a small in-memory implementation with simulated
//! latency, used by the CLI demo and by integration tests.

use latency_proxy_core::TimedProxy;
use latency_proxy_domain::{
    ContractSpec, DescribeContract, DescribeImplementation, ImplementationSpec, OperationSpec,
    TimingMarker,
};
use latency_proxy_ports::BoxFuture;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Contract name used in operation keys.
pub const INVENTORY_CONTRACT: &str = "InventoryService";

/// Stock errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// No such SKU.
    UnknownSku(String),
    /// Not enough units left.
    Insufficient {
        /// SKU requested.
        sku: String,
        /// Units requested.
        requested: u32,
        /// Units on hand.
        available: u32,
    },
}

impl fmt::Display for InventoryError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSku(sku) => write!(formatter, "unknown sku {sku}"),
            Self::Insufficient {
                sku,
                requested,
                available,
            } => write!(
                formatter,
                "cannot reserve {requested} of {sku}: {available} available"
            ),
        }
    }
}

impl std::error::Error for InventoryError {}

/// Stock service contract.
pub trait InventoryService: Send + Sync {
    /// Number of distinct SKUs.
    fn count(&self) -> usize;

    /// Units on hand for a SKU.
    fn stock(&self, sku: &str) -> Result<u32, InventoryError>;

    /// Add units, creating the SKU if needed.
    fn restock<'a>(&'a self, sku: &'a str, units: u32) -> BoxFuture<'a, ()>;

    /// Take units out of stock, returning what is left.
    fn reserve<'a>(&'a self, sku: &'a str, units: u32)
    -> BoxFuture<'a, Result<u32, InventoryError>>;
}

impl DescribeContract for dyn InventoryService {
    fn contract_spec() -> ContractSpec {
        ContractSpec::new(INVENTORY_CONTRACT)
            .operation(OperationSpec::sync("count"))
            .operation(OperationSpec::sync("stock"))
            .operation(OperationSpec::async_void("restock"))
            .operation(OperationSpec::async_typed::<Result<u32, InventoryError>>(
                "reserve",
            ))
    }
}

impl InventoryService for TimedProxy<dyn InventoryService> {
    fn count(&self) -> usize {
        self.call("count", |inner| inner.count())
    }

    fn stock(&self, sku: &str) -> Result<u32, InventoryError> {
        self.try_call("stock", |inner| inner.stock(sku))
    }

    fn restock<'a>(&'a self, sku: &'a str, units: u32) -> BoxFuture<'a, ()> {
        self.call_async("restock", move |inner| inner.restock(sku, units))
    }

    fn reserve<'a>(
        &'a self,
        sku: &'a str,
        units: u32,
    ) -> BoxFuture<'a, Result<u32, InventoryError>> {
        self.try_call_async("reserve", move |inner| inner.reserve(sku, units))
    }
}

/// In-memory stock with simulated async latency.
///
/// Each async call sleeps `base_latency_ms` plus a small deterministic jitter
/// (0..=4 ms, cycling with the call count).
#[derive(Debug)]
pub struct Warehouse {
    stock: Mutex<BTreeMap<String, u32>>,
    base_latency_ms: u64,
    calls: AtomicU64,
}

impl Default for Warehouse {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Warehouse {
    /// Create a warehouse seeded with a few SKUs.
    pub fn new(base_latency_ms: u64) -> Self {
        let stock = [("anvil", 5), ("bucket", 12), ("chisel", 40)]
            .into_iter()
            .map(|(sku, units)| (sku.to_owned(), units))
            .collect();
        Self {
            stock: Mutex::new(stock),
            base_latency_ms,
            calls: AtomicU64::new(0),
        }
    }

    fn next_delay(&self) -> Duration {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        Duration::from_millis(self.base_latency_ms + call % 5)
    }

    fn units(&self, sku: &str) -> Result<u32, InventoryError> {
        self.stock
            .lock()
            .expect("warehouse lock")
            .get(sku)
            .copied()
            .ok_or_else(|| InventoryError::UnknownSku(sku.to_owned()))
    }
}

impl DescribeImplementation for Warehouse {
    fn implementation_spec() -> ImplementationSpec {
        ImplementationSpec::of::<Self>().with_marker(TimingMarker::default())
    }
}

impl InventoryService for Warehouse {
    fn count(&self) -> usize {
        self.stock.lock().expect("warehouse lock").len()
    }

    fn stock(&self, sku: &str) -> Result<u32, InventoryError> {
        self.units(sku)
    }

    fn restock<'a>(&'a self, sku: &'a str, units: u32) -> BoxFuture<'a, ()> {
        let delay = self.next_delay();
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            let mut stock = self.stock.lock().expect("warehouse lock");
            let entry = stock.entry(sku.to_owned()).or_insert(0);
            *entry = entry.saturating_add(units);
        })
    }

    fn reserve<'a>(
        &'a self,
        sku: &'a str,
        units: u32,
    ) -> BoxFuture<'a, Result<u32, InventoryError>> {
        let delay = self.next_delay();
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            let mut stock = self.stock.lock().expect("warehouse lock");
            let available = stock
                .get_mut(sku)
                .ok_or_else(|| InventoryError::UnknownSku(sku.to_owned()))?;
            if *available < units {
                return Err(InventoryError::Insufficient {
                    sku: sku.to_owned(),
                    requested: units,
                    available: *available,
                });
            }
            *available -= units;
            Ok(*available)
        })
    }
}
