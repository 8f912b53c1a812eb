use crate::env;
use crate::error::ConfigError;
use crate::spec::FormatSpec;
use crate::transport::TransportConfig;
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tokio::time::Duration;

/// Construction configuration of a [`StructuredLogger`].
///
/// Deserializes from JSON with either snake_case or the camelCase names
/// used by JavaScript-style configs (`sharedData`).
///
/// **Fields**
/// - `level`: severity threshold; events below it are not formatted.
/// - `transport`: transport table. `None` means a single console
///   transport unless sinks are attached programmatically; an empty list
///   means no transport at all.
/// - `shared_data`: merged into every event, winning over per-call data.
/// - `structured`: per-level format overrides.
/// - `channel_buffer`, `batch_size`, `flush_interval_ms`: dispatcher
///   tuning, see [`Dispatcher::spawn`](crate::dispatch::Dispatcher::spawn).
///
/// [`StructuredLogger`]: crate::logger::StructuredLogger
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: String,
    pub transport: Option<Vec<TransportConfig>>,
    #[serde(alias = "sharedData")]
    pub shared_data: Map<String, Value>,
    #[serde(deserialize_with = "deserialize_formats")]
    pub structured: IndexMap<String, FormatSpec>,
    #[serde(alias = "channelBuffer")]
    pub channel_buffer: usize,
    #[serde(alias = "batchSize")]
    pub batch_size: usize,
    #[serde(alias = "flushIntervalMs")]
    pub flush_interval_ms: u64,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            transport: None,
            shared_data: Map::new(),
            structured: IndexMap::new(),
            channel_buffer: 1024,
            batch_size: 128,
            flush_interval_ms: 1000,
        }
    }
}

fn deserialize_formats<'de, D>(deserializer: D) -> Result<IndexMap<String, FormatSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    IndexMap::<String, Value>::deserialize(deserializer)?
        .into_iter()
        .map(|(level, value)| {
            let spec = FormatSpec::from_value(&level, &value).map_err(D::Error::custom)?;
            Ok((level, spec))
        })
        .collect()
}

impl LoggerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Apply `STRUCTURED_LOG_LEVEL` when it is set.
    pub fn with_env_overrides(mut self) -> Self {
        self.level = env::env_or(env::STRUCTURED_LOG_LEVEL_ENV, &self.level);
        self
    }

    /// Fill `env.NODE_ENV`, `env.CONFIG_COMPUTE`, `env.CONFIG_PLATFORM` and
    /// `process.pid` in the shared data from the running process, without
    /// replacing values that are already configured.
    pub fn with_process_context(mut self) -> Self {
        let env_entry = self
            .shared_data
            .entry("env")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(vars) = env_entry {
            for key in env::APP_CONTEXT_VARS {
                if let Ok(value) = std::env::var(key) {
                    vars.entry(key).or_insert(Value::String(value));
                }
            }
        }

        let process_entry = self
            .shared_data
            .entry("process")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(process) = process_entry {
            process
                .entry("pid")
                .or_insert_with(|| Value::from(std::process::id()));
        }
        self
    }
}
