//! Contract and implementation descriptions.
//!
//! These are the plain-data stand-ins for declarative metadata: the contract
//! lists its operations and their return shapes, the implementation lists the
//! operations it marks. Both are built by the registration layer and handed to
//! the engine when an instance is wrapped.

use crate::{ReturnShape, TimingMarker};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One operation declared by a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    name: Box<str>,
    shape: ReturnShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    declared_by: Option<Box<str>>,
    #[serde(default)]
    marked: bool,
}

impl OperationSpec {
    /// Declare an operation with an explicit return shape.
    pub fn new(name: impl Into<Box<str>>, shape: ReturnShape) -> Self {
        Self {
            name: name.into(),
            shape,
            declared_by: None,
            marked: false,
        }
    }

    /// Declare an operation that returns its value synchronously.
    pub fn sync(name: impl Into<Box<str>>) -> Self {
        Self::new(name, ReturnShape::Synchronous)
    }

    /// Declare an operation returning a deferred value without payload.
    pub fn async_void(name: impl Into<Box<str>>) -> Self {
        Self::new(name, ReturnShape::AsyncVoid)
    }

    /// Declare an operation returning a deferred `T`.
    pub fn async_typed<T: ?Sized>(name: impl Into<Box<str>>) -> Self {
        Self::new(name, ReturnShape::async_typed::<T>())
    }

    /// Attach a per-operation marker on the contract side.
    #[must_use]
    pub const fn marked(mut self) -> Self {
        self.marked = true;
        self
    }

    /// Record that the operation is inherited from another contract type.
    #[must_use]
    pub fn declared_by(mut self, type_name: impl Into<Box<str>>) -> Self {
        self.declared_by = Some(type_name.into());
        self
    }

    /// Operation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared return shape.
    #[must_use]
    pub const fn shape(&self) -> &ReturnShape {
        &self.shape
    }

    /// Declaring type override, when the operation is inherited.
    #[must_use]
    pub fn declaring_type(&self) -> Option<&str> {
        self.declared_by.as_deref()
    }

    /// Whether the contract marks this operation.
    #[must_use]
    pub const fn is_marked(&self) -> bool {
        self.marked
    }
}

/// A contract (capability set) and its declared operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSpec {
    name: Box<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    marker: Option<TimingMarker>,
    operations: Vec<OperationSpec>,
}

impl ContractSpec {
    /// Start describing the contract called `name`.
    pub fn new(name: impl Into<Box<str>>) -> Self {
        Self {
            name: name.into(),
            marker: None,
            operations: Vec::new(),
        }
    }

    /// Attach a class-level marker to the contract.
    #[must_use]
    pub const fn with_marker(mut self, marker: TimingMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Append an operation declaration.
    #[must_use]
    pub fn operation(mut self, operation: OperationSpec) -> Self {
        self.operations.push(operation);
        self
    }

    /// Contract name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class-level marker, if any.
    #[must_use]
    pub const fn marker(&self) -> Option<TimingMarker> {
        self.marker
    }

    /// Declared operations in declaration order.
    #[must_use]
    pub fn operations(&self) -> &[OperationSpec] {
        &self.operations
    }
}

/// The concrete type behind a contract and the markers it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationSpec {
    type_name: Box<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    marker: Option<TimingMarker>,
    #[serde(default)]
    marked_operations: BTreeSet<Box<str>>,
}

impl ImplementationSpec {
    /// Describe the implementation called `type_name`.
    pub fn new(type_name: impl Into<Box<str>>) -> Self {
        Self {
            type_name: type_name.into(),
            marker: None,
            marked_operations: BTreeSet::new(),
        }
    }

    /// Describe `T`, named by the last path segment of its type name.
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self::new(short_type_name(std::any::type_name::<T>()))
    }

    /// Attach a class-level marker to the implementation.
    #[must_use]
    pub const fn with_marker(mut self, marker: TimingMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Mark one operation on the implementation side.
    #[must_use]
    pub fn mark_operation(mut self, operation: impl Into<Box<str>>) -> Self {
        self.marked_operations.insert(operation.into());
        self
    }

    /// Implementation type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Class-level marker, if any.
    #[must_use]
    pub const fn marker(&self) -> Option<TimingMarker> {
        self.marker
    }

    /// Whether the implementation marks `operation`.
    #[must_use]
    pub fn marks(&self, operation: &str) -> bool {
        self.marked_operations.contains(operation)
    }
}

/// Types (usually `dyn Contract`) that can describe their own contract.
pub trait DescribeContract {
    /// Build the contract description.
    fn contract_spec() -> ContractSpec;
}

/// Concrete types that can describe their own markers.
pub trait DescribeImplementation {
    /// Build the implementation description.
    fn implementation_spec() -> ImplementationSpec;
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
