use crate::levels;
use crate::logger::StructuredLogger;
use crate::record::{ErrorInfo, ErrorLocation, LogRecord};
use crate::INTERNAL_TARGET;
use serde_json::{Map, Value};
use std::error::Error;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns events into [`LogRecord`]s and
/// logs them through a [`StructuredLogger`].
///
/// The event's `message` becomes the record message (so it may contain
/// `%{...}` splats), every other field becomes per-call data, and a field
/// recorded as an error (`error = &err as &dyn Error`) becomes the
/// record's error, located at the event's callsite. Events on the crate's
/// own diagnostics target are ignored.
pub struct StructuredLayer {
    logger: Arc<StructuredLogger>,
}

impl StructuredLayer {
    pub fn new(logger: Arc<StructuredLogger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<StructuredLogger> {
        &self.logger
    }
}

impl<S> Layer<S> for StructuredLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if meta.target().starts_with(INTERNAL_TARGET) {
            return;
        }

        let level = levels::from_tracing(meta.level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut fields = Map::new();
        let mut message: Option<String> = None;
        let mut error: Option<String> = None;

        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
            error: &mut error,
        };
        event.record(&mut visitor);

        let mut record = LogRecord::new(level, message.unwrap_or_default())
            .with_data(Value::Object(fields));
        if let Some(text) = error {
            record = record.with_error_info(ErrorInfo {
                text,
                location: meta.file().map(|file| ErrorLocation {
                    file: file.to_string(),
                    line: meta.line(),
                    column: None,
                }),
            });
        }

        if let Err(err) = self.logger.log(record) {
            tracing::warn!(target: INTERNAL_TARGET, error = %err, "dropping event that cannot be formatted");
        }
    }
}

/// Collects event fields as JSON values.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Map<String, Value>,
    pub message: &'a mut Option<String>,
    pub error: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_error(&mut self, _field: &Field, value: &(dyn Error + 'static)) {
        *self.error = Some(value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), Value::String(format!("{:?}", value)));
        }
    }
}
