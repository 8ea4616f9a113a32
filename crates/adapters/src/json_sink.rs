//! JSON-lines event sink.

use crate::log_sink::{LogSink, StderrLogSink};
use latency_proxy_ports::{EventFields, EventLevel, EventSinkPort, InstrumentationEvent};
use serde_json::Value;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const SERIALIZE_FAILED_LINE: &str = "{\"timestampMs\":0,\"level\":\"error\",\"event\":\"sink.serialize_failed\",\"message\":\"event serialization failed\"}\n";

/// Event sink emitting one JSON object per line.
///
/// Each line carries `timestampMs`, `level`, `event`, `message`, and `fields`.
#[derive(Clone)]
pub struct JsonEventSink {
    sink: Arc<dyn LogSink>,
    base_fields: EventFields,
    min_level: EventLevel,
}

impl JsonEventSink {
    /// Create a JSON sink backed by the provided line sink.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            base_fields: EventFields::new(),
            min_level: EventLevel::Info,
        }
    }

    /// JSON sink writing to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Arc::new(StderrLogSink))
    }

    /// Set base fields merged under every event's own fields.
    #[must_use]
    pub fn with_base_fields(mut self, fields: EventFields) -> Self {
        self.base_fields = fields;
        self
    }

    /// Set the minimum level.
    #[must_use]
    pub const fn with_min_level(mut self, level: EventLevel) -> Self {
        self.min_level = level;
        self
    }

    fn render(&self, event: &InstrumentationEvent) -> String {
        let mut fields = self.base_fields.clone();
        fields.extend(event.fields());

        let mut payload = serde_json::Map::new();
        payload.insert("timestampMs".to_owned(), Value::from(now_epoch_ms()));
        payload.insert(
            "level".to_owned(),
            Value::String(event.level().as_str().to_owned()),
        );
        payload.insert("event".to_owned(), Value::String(event.name().to_owned()));
        payload.insert("message".to_owned(), Value::String(event.message()));
        payload.insert(
            "fields".to_owned(),
            Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key.into_string(), value))
                    .collect(),
            ),
        );

        serde_json::to_string(&Value::Object(payload)).map_or_else(
            |_| SERIALIZE_FAILED_LINE.to_owned(),
            |mut encoded| {
                encoded.push('\n');
                encoded
            },
        )
    }
}

impl std::fmt::Debug for JsonEventSink {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("JsonEventSink")
            .field("min_level", &self.min_level)
            .field("base_fields", &self.base_fields.len())
            .finish_non_exhaustive()
    }
}

impl EventSinkPort for JsonEventSink {
    fn emit(&self, event: InstrumentationEvent) {
        if !event.level().passes(self.min_level) {
            return;
        }
        self.sink.write_line(&self.render(&event));
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| u64::try_from(duration.as_millis()).ok())
        .unwrap_or_default()
}
