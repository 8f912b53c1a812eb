use crate::config::LoggerConfig;
use crate::error::ConfigError;
use crate::layer::StructuredLayer;
use crate::logger::StructuredLogger;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Error type returned by the `init_*` helpers.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to install global subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Install a global `tracing` subscriber that logs through `logger`.
///
/// **Parameters**
/// - `logger`: the [`StructuredLogger`] every event is formatted by.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt` layer is
///   added on top so events (including this crate's own diagnostics) are
///   also printed in human-readable form.
///
/// **Returns**
/// - the logger, so callers can `flush().await` it before shutdown.
pub fn init_tracing_with_logger(
    logger: StructuredLogger,
    enable_stdout: bool,
) -> Result<Arc<StructuredLogger>, InitError> {
    let logger = Arc::new(logger);
    let layer = StructuredLayer::new(Arc::clone(&logger));

    // The two subscriber shapes have different types, so each is
    // installed separately.
    if enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(logger)
}

/// Build a logger from `config` and install it as the global subscriber.
///
/// Must be called from within a Tokio runtime when the configuration has
/// transports.
pub fn init_tracing(config: LoggerConfig) -> Result<Arc<StructuredLogger>, InitError> {
    init_tracing_with_logger(StructuredLogger::new(config)?, false)
}
