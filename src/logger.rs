use crate::assemble::MessageAssembler;
use crate::config::LoggerConfig;
use crate::context::{insert_path, map_from_json, ContextNode, DataContext, ValueProvider};
use crate::dispatch::{DispatchStats, Dispatcher};
use crate::error::{ConfigError, FormatError, ProviderError};
use crate::levels::{self, FormatTable};
use crate::record::LogRecord;
use crate::sink::{LogLine, LogSink};
use crate::transport::{make_sinks, TransportConfig};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Structured logger: formats records and hands the JSON lines to its
/// transports.
///
/// Formatting happens synchronously on the calling thread; transport I/O
/// runs on a background Tokio task. Building a logger with at least one
/// transport therefore requires a running Tokio runtime.
pub struct StructuredLogger {
    threshold: String,
    assembler: MessageAssembler,
    dispatcher: Option<Dispatcher>,
}

/// Builder for [`StructuredLogger`], for the parts of the configuration
/// that cannot come from a config file: value providers and custom sinks.
pub struct LoggerBuilder {
    config: LoggerConfig,
    providers: Vec<(String, ContextNode)>,
    id_provider: Option<Arc<dyn ValueProvider>>,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl LoggerBuilder {
    /// Put a closure provider into the shared data at a dotted `path`.
    pub fn with_provider<F>(self, path: impl Into<String>, f: F) -> Self
    where
        F: Fn(&DataContext) -> Result<Value, ProviderError> + Send + Sync + 'static,
    {
        self.with_node(path, ContextNode::from_fn(f))
    }

    pub fn with_value_provider(
        self,
        path: impl Into<String>,
        provider: Arc<dyn ValueProvider>,
    ) -> Self {
        self.with_node(path, ContextNode::Provider(provider))
    }

    fn with_node(mut self, path: impl Into<String>, node: ContextNode) -> Self {
        self.providers.push((path.into(), node));
        self
    }

    /// Replace the default UUID v4 behind `calc.id`.
    pub fn with_id_provider(mut self, provider: Arc<dyn ValueProvider>) -> Self {
        self.id_provider = Some(provider);
        self
    }

    /// Attach a sink in addition to the configured transports. When no
    /// transport table is configured, attached sinks replace the default
    /// console transport.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn build(self) -> Result<StructuredLogger, ConfigError> {
        let flush_interval = self.config.flush_interval();
        let LoggerConfig {
            level,
            transport,
            shared_data,
            structured,
            channel_buffer,
            batch_size,
            ..
        } = self.config;
        levels::validate(&level)?;

        let mut shared = map_from_json(Value::Object(shared_data));
        for (path, node) in self.providers {
            insert_path(&mut shared, &path, node);
        }

        let mut assembler = MessageAssembler::new(FormatTable::new(structured), shared);
        if let Some(provider) = self.id_provider {
            assembler = assembler.with_id_provider(provider);
        }

        let mut sinks = match &transport {
            Some(table) => make_sinks(table)?,
            None if self.sinks.is_empty() => make_sinks(&[TransportConfig::console()])?,
            None => Vec::new(),
        };
        sinks.extend(self.sinks);

        let dispatcher = if sinks.is_empty() {
            None
        } else {
            let (dispatcher, _handle) =
                Dispatcher::spawn(sinks, channel_buffer, batch_size, flush_interval)?;
            Some(dispatcher)
        };

        Ok(StructuredLogger {
            threshold: level,
            assembler,
            dispatcher,
        })
    }
}

impl StructuredLogger {
    pub fn new(config: LoggerConfig) -> Result<Self, ConfigError> {
        Self::builder(config).build()
    }

    pub fn builder(config: LoggerConfig) -> LoggerBuilder {
        LoggerBuilder {
            config,
            providers: Vec::new(),
            id_provider: None,
            sinks: Vec::new(),
        }
    }

    pub fn threshold(&self) -> &str {
        &self.threshold
    }

    pub fn enabled(&self, level: &str) -> bool {
        levels::is_enabled(level, &self.threshold)
    }

    /// Format `record` without touching any transport or the threshold.
    pub fn format(&self, record: &LogRecord) -> Result<Map<String, Value>, FormatError> {
        self.assembler.assemble(record)
    }

    /// Format `record` and queue it for every transport.
    ///
    /// Records below the threshold are ignored. Data and templating
    /// problems never fail; the only error is a level without a format.
    pub fn log(&self, record: LogRecord) -> Result<(), FormatError> {
        if !self.enabled(&record.level) {
            return Ok(());
        }

        let output = self.assembler.assemble(&record)?;
        let json = serde_json::to_string(&output)?;
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.dispatch(LogLine {
                level: record.level,
                json,
            });
        }
        Ok(())
    }

    /// Log `message` at `level` with per-call `data`. Non-object data is
    /// ignored.
    pub fn log_at(
        &self,
        level: &str,
        message: impl Into<String>,
        data: Value,
    ) -> Result<(), FormatError> {
        self.log(LogRecord::new(level, message).with_data(data))
    }

    pub fn error(&self, message: impl Into<String>) -> Result<(), FormatError> {
        self.log(LogRecord::new("error", message))
    }

    pub fn error_with(&self, message: impl Into<String>, data: Value) -> Result<(), FormatError> {
        self.log_at("error", message, data)
    }

    pub fn warn(&self, message: impl Into<String>) -> Result<(), FormatError> {
        self.log(LogRecord::new("warn", message))
    }

    pub fn warn_with(&self, message: impl Into<String>, data: Value) -> Result<(), FormatError> {
        self.log_at("warn", message, data)
    }

    pub fn info(&self, message: impl Into<String>) -> Result<(), FormatError> {
        self.log(LogRecord::new("info", message))
    }

    pub fn info_with(&self, message: impl Into<String>, data: Value) -> Result<(), FormatError> {
        self.log_at("info", message, data)
    }

    pub fn http(&self, message: impl Into<String>) -> Result<(), FormatError> {
        self.log(LogRecord::new("http", message))
    }

    pub fn http_with(&self, message: impl Into<String>, data: Value) -> Result<(), FormatError> {
        self.log_at("http", message, data)
    }

    pub fn verbose(&self, message: impl Into<String>) -> Result<(), FormatError> {
        self.log(LogRecord::new("verbose", message))
    }

    pub fn verbose_with(&self, message: impl Into<String>, data: Value) -> Result<(), FormatError> {
        self.log_at("verbose", message, data)
    }

    pub fn debug(&self, message: impl Into<String>) -> Result<(), FormatError> {
        self.log(LogRecord::new("debug", message))
    }

    pub fn debug_with(&self, message: impl Into<String>, data: Value) -> Result<(), FormatError> {
        self.log_at("debug", message, data)
    }

    pub fn silly(&self, message: impl Into<String>) -> Result<(), FormatError> {
        self.log(LogRecord::new("silly", message))
    }

    pub fn silly_with(&self, message: impl Into<String>, data: Value) -> Result<(), FormatError> {
        self.log_at("silly", message, data)
    }

    /// Wait until every line logged so far was written and flushed.
    pub async fn flush(&self) {
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.flush().await;
        }
    }

    /// Dispatcher counters, when the logger has transports.
    pub fn stats(&self) -> Option<&DispatchStats> {
        self.dispatcher.as_ref().map(Dispatcher::stats)
    }
}
