use crate::console::{ConsoleOptions, ConsoleSink};
use crate::error::ConfigError;
use crate::file::{FileOptions, FileSink};
use crate::noop_sink::NoopSink;
use crate::sink::LogSink;
use crate::INTERNAL_TARGET;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Transport kinds that can be selected from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Console,
    File,
    Http,
    Noop,
}

impl TransportKind {
    /// Infer the kind from its configuration name. Unknown names yield
    /// `None` and are skipped by [`make_sinks`].
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "console" => Some(TransportKind::Console),
            "file" => Some(TransportKind::File),
            "http" => Some(TransportKind::Http),
            "noop" => Some(TransportKind::Noop),
            _ => None,
        }
    }
}

/// One entry of the `transport` table, e.g.
/// `{ "type": "file", "options": { "filename": "app.log", "level": "error" } }`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TransportConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub options: Value,
}

impl TransportConfig {
    pub fn new(kind: impl Into<String>, options: Value) -> Self {
        TransportConfig {
            kind: kind.into(),
            options,
        }
    }

    pub fn console() -> Self {
        Self::new("console", Value::Null)
    }

    fn options<T>(&self) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        if self.options.is_null() {
            return Ok(T::default());
        }
        self.required_options()
    }

    fn required_options<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        serde_json::from_value(self.options.clone()).map_err(|err| ConfigError::TransportOptions {
            kind: self.kind.clone(),
            message: err.to_string(),
        })
    }
}

/// Create the sink for one transport entry, or `None` for unknown kinds.
pub fn make_sink(cfg: &TransportConfig) -> Result<Option<Arc<dyn LogSink>>, ConfigError> {
    let Some(kind) = TransportKind::parse(&cfg.kind) else {
        tracing::warn!(target: INTERNAL_TARGET, kind = %cfg.kind, "skipping unknown transport kind");
        return Ok(None);
    };

    let sink: Arc<dyn LogSink> = match kind {
        TransportKind::Console => Arc::new(ConsoleSink::new(cfg.options::<ConsoleOptions>()?)),
        TransportKind::File => Arc::new(FileSink::open(cfg.required_options::<FileOptions>()?)?),
        TransportKind::Noop => Arc::new(NoopSink),
        TransportKind::Http => {
            #[cfg(feature = "http")]
            {
                use crate::http::{HttpOptions, HttpSink};
                Arc::new(HttpSink::new(cfg.required_options::<HttpOptions>()?))
            }

            #[cfg(not(feature = "http"))]
            {
                tracing::warn!(target: INTERNAL_TARGET, "http feature is not enabled, skipping transport");
                return Ok(None);
            }
        }
    };
    Ok(Some(sink))
}

/// Create sinks for a whole transport table, skipping unknown kinds.
pub fn make_sinks(table: &[TransportConfig]) -> Result<Vec<Arc<dyn LogSink>>, ConfigError> {
    let mut sinks = Vec::with_capacity(table.len());
    for cfg in table {
        if let Some(sink) = make_sink(cfg)? {
            sinks.push(sink);
        }
    }
    Ok(sinks)
}
