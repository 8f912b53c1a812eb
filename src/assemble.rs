use crate::builder;
use crate::context::{ContextMap, ContextNode, DataContext, ValueProvider};
use crate::error::FormatError;
use crate::ids::UuidV4;
use crate::levels::FormatTable;
use crate::record::LogRecord;
use crate::splat;
use chrono::SecondsFormat;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// `calc.priority` of every event.
pub const PRIORITY: u64 = 1;

/// `calc.timeFormat` of every event.
pub const TIME_FORMAT: &str = "iso8061";

/// Formats [`LogRecord`]s into structured output objects.
///
/// The assembler owns the logger-wide, read-only parts of formatting: the
/// per-level format table, the shared data merged into every event and the
/// id provider. Each call to [`assemble`](Self::assemble) works on its own
/// [`DataContext`] built from clones of those.
#[derive(Clone)]
pub struct MessageAssembler {
    formats: FormatTable,
    shared: ContextMap,
    id_provider: Arc<dyn ValueProvider>,
}

impl MessageAssembler {
    pub fn new(formats: FormatTable, shared: ContextMap) -> Self {
        Self {
            formats,
            shared,
            id_provider: Arc::new(UuidV4),
        }
    }

    /// Replace the provider behind `calc.id`.
    pub fn with_id_provider(mut self, provider: Arc<dyn ValueProvider>) -> Self {
        self.id_provider = provider;
        self
    }

    /// Build the data context for `record`.
    ///
    /// Top-level keys are merged in this order, later sources replacing
    /// earlier ones: `calc`, `topics`, `log`, the record's data, then the
    /// shared data. Shared data therefore wins over per-call data.
    pub fn context_for(&self, record: &LogRecord) -> DataContext {
        let mut calc = ContextMap::new();
        calc.insert(
            "id".to_string(),
            ContextNode::Provider(Arc::clone(&self.id_provider)),
        );
        calc.insert("priority".to_string(), Value::from(PRIORITY).into());
        calc.insert("timeFormat".to_string(), Value::from(TIME_FORMAT).into());

        let mut log = ContextMap::new();
        log.insert("level".to_string(), Value::from(record.level.as_str()).into());
        log.insert("message".to_string(), Value::from(record.full_message()).into());
        log.insert(
            "timestamp".to_string(),
            Value::from(record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)).into(),
        );
        let location = record.error.as_ref().and_then(|error| error.location.as_ref());
        if let Some(Ok(context)) = location.map(serde_json::to_value) {
            log.insert("context".to_string(), context.into());
        }

        let mut root = ContextMap::new();
        root.insert("calc".to_string(), ContextNode::Map(calc));
        root.insert("topics".to_string(), Value::from(vec!["log"]).into());
        root.insert("log".to_string(), ContextNode::Map(log));

        let mut ctx = DataContext::new(root);
        ctx.merge(record.data.clone());
        ctx.merge(self.shared.clone());
        ctx
    }

    /// Format one record.
    ///
    /// Fails only when no format exists for the record's level. The format
    /// is selected before any data is resolved, so a misconfigured level
    /// never runs value providers.
    pub fn assemble(&self, record: &LogRecord) -> Result<Map<String, Value>, FormatError> {
        let spec = self.formats.select(&record.level)?;
        let mut ctx = self.context_for(record);

        let original = record.full_message();
        let splat = splat::substitute(&original, &ctx);
        if splat.had_template {
            ctx.set("log.template", Value::String(original));
            ctx.set("log.message", Value::String(splat.message));
        }

        Ok(builder::build_output(&spec, &ctx))
    }
}

impl fmt::Debug for MessageAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageAssembler")
            .field("formats", &self.formats)
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}
