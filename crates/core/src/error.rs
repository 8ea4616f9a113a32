//! Wrap-time errors.

use latency_proxy_shared::{ErrorCode, ErrorEnvelope};
use std::fmt;

/// Errors raised while building a timed proxy.
///
/// Both are fatal to the wrap call and surface to the registration layer
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrapError {
    /// No implementation instance was supplied.
    NullImplementation {
        /// Contract that was being wrapped.
        contract: Box<str>,
    },
    /// The contract description cannot be turned into a dispatch table.
    ProxyConstructionFailed {
        /// Contract that was being wrapped.
        contract: Box<str>,
        /// Why the table could not be built.
        reason: Box<str>,
    },
}

impl WrapError {
    pub(crate) fn construction(contract: &str, reason: impl Into<Box<str>>) -> Self {
        Self::ProxyConstructionFailed {
            contract: contract.into(),
            reason: reason.into(),
        }
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            Self::NullImplementation { .. } => ErrorCode::null_implementation(),
            Self::ProxyConstructionFailed { .. } => ErrorCode::proxy_construction_failed(),
        }
    }
}

impl fmt::Display for WrapError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullImplementation { contract } => {
                write!(formatter, "no implementation supplied for contract `{contract}`")
            },
            Self::ProxyConstructionFailed { contract, reason } => {
                write!(formatter, "cannot build a timed proxy for `{contract}`: {reason}")
            },
        }
    }
}

impl std::error::Error for WrapError {}

impl From<WrapError> for ErrorEnvelope {
    fn from(error: WrapError) -> Self {
        let code = error.error_code();
        let message = error.to_string();

        match error {
            WrapError::NullImplementation { contract } => {
                Self::expected(code, message).with_metadata("contract", contract)
            },
            WrapError::ProxyConstructionFailed { contract, reason } => {
                Self::invariant(code, message)
                    .with_metadata("contract", contract)
                    .with_metadata("reason", reason)
            },
        }
    }
}
