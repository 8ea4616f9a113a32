//! Sink that forwards every event to several sinks.

use latency_proxy_ports::{EventSinkPort, InstrumentationEvent};
use std::sync::Arc;

/// Fan-out sink. Sinks receive events in registration order.
#[derive(Clone, Default)]
pub struct FanoutEventSink {
    sinks: Vec<Arc<dyn EventSinkPort>>,
}

impl FanoutEventSink {
    /// Create a fan-out over the given sinks.
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn EventSinkPort>>) -> Self {
        Self { sinks }
    }

    /// Add one more sink.
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn EventSinkPort>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of downstream sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true when there are no downstream sinks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl std::fmt::Debug for FanoutEventSink {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FanoutEventSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl EventSinkPort for FanoutEventSink {
    fn emit(&self, event: InstrumentationEvent) {
        let Some((last, rest)) = self.sinks.split_last() else {
            return;
        };
        for sink in rest {
            sink.emit(event.clone());
        }
        last.emit(event);
    }
}
