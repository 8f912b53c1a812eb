pub mod context;
pub mod resolve;
pub mod splat;
pub mod spec;
pub mod builder;
pub mod levels;
pub mod record;
pub mod assemble;
pub mod ids;
pub mod error;

pub mod config;
pub mod env;
pub mod logger;
pub mod dispatch;
pub mod layer;
pub mod init;

pub mod sink;
pub mod transport;
pub mod console;
pub mod file;
pub mod memory_sink;
pub mod noop_sink;

#[cfg(feature = "http")]
pub mod http;

/// Target of the crate's own diagnostics. [`layer::StructuredLayer`]
/// never formats events on this target.
pub const INTERNAL_TARGET: &str = "structured_log::internal";

pub use assemble::MessageAssembler;
pub use config::LoggerConfig;
pub use context::{ContextNode, DataContext, ValueProvider};
pub use error::{ConfigError, FormatError};
pub use logger::StructuredLogger;
pub use record::LogRecord;
pub use spec::FormatSpec;
