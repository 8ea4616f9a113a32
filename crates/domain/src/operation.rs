//! Operation identity and return shapes.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Stable identity of an operation: `<DeclaringType>.<Operation>`.
///
/// Identity is textual only, so overloads sharing a name collapse onto one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationKey(Arc<str>);

impl OperationKey {
    /// Build the key for `operation` declared on `declaring_type`.
    #[must_use]
    pub fn new(declaring_type: &str, operation: &str) -> Self {
        Self(Arc::from(format!("{declaring_type}.{operation}")))
    }

    /// Borrow the key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The operation part of the key (text after the last `.`).
    #[must_use]
    pub fn operation_name(&self) -> &str {
        self.0.rsplit_once('.').map_or(&*self.0, |(_, name)| name)
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl AsRef<str> for OperationKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Result type carried by an asynchronous operation, captured by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultKind(Cow<'static, str>);

impl ResultKind {
    /// Capture the result kind of `T` from its type name.
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self(Cow::Borrowed(std::any::type_name::<T>()))
    }

    /// Build a result kind from an explicit name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Borrow the captured type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.0
    }
}

/// How an operation hands its result back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "result")]
pub enum ReturnShape {
    /// The value is available when the call returns.
    Synchronous,
    /// A deferred value that completes without a payload.
    AsyncVoid,
    /// A deferred value that completes with a typed payload.
    AsyncTyped(ResultKind),
}

impl ReturnShape {
    /// Shorthand for [`ReturnShape::AsyncTyped`] with the kind of `T`.
    #[must_use]
    pub fn async_typed<T: ?Sized>() -> Self {
        Self::AsyncTyped(ResultKind::of::<T>())
    }

    /// Returns true for both asynchronous variants.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        matches!(self, Self::AsyncVoid | Self::AsyncTyped(_))
    }

    /// Short label used in events.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Synchronous => "sync",
            Self::AsyncVoid => "asyncVoid",
            Self::AsyncTyped(_) => "asyncTyped",
        }
    }
}

impl fmt::Display for ReturnShape {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AsyncTyped(kind) => write!(formatter, "asyncTyped<{}>", kind.type_name()),
            other => formatter.write_str(other.label()),
        }
    }
}
