use std::error::Error;
use std::path::PathBuf;

/// Error type returned by a [`ValueProvider`](crate::context::ValueProvider).
///
/// Provider failures never leave the resolver; they are only observed
/// through the internal diagnostics target.
pub type ProviderError = Box<dyn Error + Send + Sync>;

/// Error type returned while formatting a single event.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    /// No override and no built-in default exists for the level.
    #[error("no structured format configured for level `{level}`")]
    MissingFormat { level: String },

    #[error("failed to serialize structured output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Error type returned when building a logger from configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("structured format for `{key}` must be an object")]
    FormatNotObject { key: String },

    #[error("unknown severity level `{0}`")]
    UnknownLevel(String),

    #[error("invalid options for `{kind}` transport: {message}")]
    TransportOptions { kind: String, message: String },

    #[error("failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a Tokio runtime is required to run log transports")]
    NoRuntime,
}
