//! In-memory event sinks.
//!
//! These implementations are intended for:
//! - Unit/integration tests asserting on emitted events
//! - Local experimentation without a log destination

use latency_proxy_ports::{CallOutcome, EventSinkPort, InstrumentationEvent};
use std::sync::Mutex;

/// A sink that discards every event.
#[derive(Debug, Default)]
pub struct NoopEventSink;

impl EventSinkPort for NoopEventSink {
    fn emit(&self, _event: InstrumentationEvent) {}
}

/// A sink that keeps every event in emission order.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<InstrumentationEvent>>,
}

impl RecordingEventSink {
    /// Snapshot of all recorded events.
    pub fn events(&self) -> Vec<InstrumentationEvent> {
        self.events.lock().expect("recording sink lock").clone()
    }

    /// Drain recorded events.
    pub fn take(&self) -> Vec<InstrumentationEvent> {
        std::mem::take(&mut *self.events.lock().expect("recording sink lock"))
    }

    /// Event names in emission order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(InstrumentationEvent::name).collect()
    }

    /// `(operation key, outcome)` for each per-call event.
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

    /// Number of events with the given name.
    pub fn count(&self, name: &str) -> usize {
        self.names().into_iter().filter(|seen| *seen == name).count()
    }
}

impl EventSinkPort for RecordingEventSink {
    fn emit(&self, event: InstrumentationEvent) {
        self.events.lock().expect("recording sink lock").push(event);
    }
}
