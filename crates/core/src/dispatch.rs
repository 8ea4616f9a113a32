//! Per-contract dispatch table.
//!
//! Built once at wrap time from the contract and implementation descriptions.
//! Every later call only performs a hash lookup by operation name.

use crate::error::WrapError;
use latency_proxy_domain::{
    ContractSpec, ImplementationSpec, InstrumentationPolicy, MarkerSource, OperationKey,
    ReturnShape,
};
use rustc_hash::FxHashMap;

/// The entry point a call came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// `call` / `try_call`: the value is returned directly.
    Sync,
    /// `call_async` / `try_call_async`: a future is returned.
    Async,
}

impl EntryPoint {
    /// Label used in shape-mismatch events.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Async => "async",
        }
    }

    const fn is_async(self) -> bool {
        matches!(self, Self::Async)
    }
}

/// One resolved row of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationEntry {
    /// Stable statistics key.
    pub key: OperationKey,
    /// Declared return shape.
    pub shape: ReturnShape,
    /// Whether the contract or the implementation marks this operation.
    pub marked: bool,
    /// Final per-call decision, resolved from the policy.
    pub measured: bool,
}

/// What the interceptor should do with one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Forward untouched.
    Forward,
    /// Forward and time.
    Measure {
        /// Statistics key.
        key: OperationKey,
        /// Shape reported with the timing event.
        shape: ReturnShape,
    },
    /// Entry point disagrees with the declared shape; forward untimed and warn.
    Mismatch {
        /// Statistics key.
        key: OperationKey,
        /// Shape the contract declared.
        declared: ReturnShape,
    },
}

/// Dispatch table for one wrapped instance.
#[derive(Debug, Clone)]
pub struct OperationTable {
    contract: Box<str>,
    implementation: Box<str>,
    policy: InstrumentationPolicy,
    marker_source: MarkerSource,
    entries: Vec<OperationEntry>,
    index: FxHashMap<Box<str>, usize>,
}

impl OperationTable {
    /// Build the table, resolving the policy and every per-operation decision.
    pub fn build(
        contract: &ContractSpec,
        implementation: &ImplementationSpec,
    ) -> Result<Self, WrapError> {
        let contract_name = contract.name().trim();
        if contract_name.is_empty() {
            return Err(WrapError::construction(
                contract.name(),
                "contract name is empty",
            ));
        }

        let (policy, marker_source) =
            InstrumentationPolicy::resolve_with_source(contract.marker(), implementation.marker());

        let mut entries: Vec<OperationEntry> = Vec::with_capacity(contract.operations().len());
        let mut index: FxHashMap<Box<str>, usize> = FxHashMap::default();

        for operation in contract.operations() {
            let name = operation.name().trim();
            if name.is_empty() {
                return Err(WrapError::construction(
                    contract_name,
                    "operation name is empty",
                ));
            }

            let marked = operation.is_marked() || implementation.marks(name);

            if let Some(existing) = index.get(name).and_then(|slot| entries.get_mut(*slot)) {
                // Same name, same shape: overloads share one key.
                if existing.shape != *operation.shape() {
                    return Err(WrapError::construction(
                        contract_name,
                        format!(
                            "operation `{name}` is declared as both {} and {}",
                            existing.shape,
                            operation.shape()
                        ),
                    ));
                }
                existing.marked |= marked;
                existing.measured = policy.should_measure(existing.marked);
                continue;
            }

            let declaring_type = operation.declaring_type().unwrap_or(contract_name);
            index.insert(Box::from(name), entries.len());
            entries.push(OperationEntry {
                key: OperationKey::new(declaring_type, name),
                shape: operation.shape().clone(),
                marked,
                measured: policy.should_measure(marked),
            });
        }

        Ok(Self {
            contract: contract_name.into(),
            implementation: implementation.type_name().into(),
            policy,
            marker_source,
            entries,
            index,
        })
    }

    /// Contract name.
    #[must_use]
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Implementation type name.
    #[must_use]
    pub fn implementation(&self) -> &str {
        &self.implementation
    }

    /// Resolved policy.
    #[must_use]
    pub const fn policy(&self) -> InstrumentationPolicy {
        self.policy
    }

    /// Which marker the policy came from.
    #[must_use]
    pub const fn marker_source(&self) -> MarkerSource {
        self.marker_source
    }

    /// Rows in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[OperationEntry] {
        &self.entries
    }

    /// Look up a row by operation name.
    #[must_use]
    pub fn lookup(&self, operation: &str) -> Option<&OperationEntry> {
        self.index
            .get(operation)
            .and_then(|slot| self.entries.get(*slot))
    }

    /// Decide what to do with one call.
    ///
    /// `inferred` supplies the shape for operations missing from the table.
    pub fn route(
        &self,
        operation: &str,
        entry_point: EntryPoint,
        inferred: impl FnOnce() -> ReturnShape,
    ) -> Route {
        match self.lookup(operation) {
            Some(entry) if entry.shape.is_async() != entry_point.is_async() => Route::Mismatch {
                key: entry.key.clone(),
                declared: entry.shape.clone(),
            },
            Some(entry) if entry.measured => Route::Measure {
                key: entry.key.clone(),
                shape: entry.shape.clone(),
            },
            Some(_) => Route::Forward,
            None if self.policy.measure_all_operations => Route::Measure {
                key: OperationKey::new(&self.contract, operation),
                shape: inferred(),
            },
            None => Route::Forward,
        }
    }
}
