//! Event sink forwarding to the `tracing` ecosystem.

use latency_proxy_ports::{EventLevel, EventSinkPort, InstrumentationEvent};
use serde_json::Value;

/// `tracing` target used for every forwarded event.
pub const TRACING_TARGET: &str = "latency_proxy";

/// Event sink that forwards events to the installed `tracing` subscriber.
///
/// Filtering is left to the subscriber (for example an `EnvFilter`), except
/// for the optional minimum level applied here first.
#[derive(Debug, Clone, Copy)]
pub struct TracingEventSink {
    min_level: EventLevel,
}

impl Default for TracingEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingEventSink {
    /// Create a sink that forwards everything.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_level: EventLevel::Debug,
        }
    }

    /// Set the minimum level.
    #[must_use]
    pub const fn with_min_level(mut self, level: EventLevel) -> Self {
        self.min_level = level;
        self
    }
}

impl EventSinkPort for TracingEventSink {
    fn emit(&self, event: InstrumentationEvent) {
        let level = event.level();
        if !level.passes(self.min_level) {
            return;
        }

        let name = event.name();
        let implementation = event.implementation();
        let message = event.message();
        let fields = Value::Object(
            event
                .fields()
                .into_iter()
                .map(|(key, value)| (key.into_string(), value))
                .collect(),
        );

        match level {
            EventLevel::Debug => {
                tracing::debug!(target: TRACING_TARGET, event = name, implementation, %fields, "{message}");
            },
            EventLevel::Info => {
                tracing::info!(target: TRACING_TARGET, event = name, implementation, %fields, "{message}");
            },
            EventLevel::Warn => {
                tracing::warn!(target: TRACING_TARGET, event = name, implementation, %fields, "{message}");
            },
            EventLevel::Error => {
                tracing::error!(target: TRACING_TARGET, event = name, implementation, %fields, "{message}");
            },
        }
    }
}
