use async_trait::async_trait;
use std::error::Error;

/// A formatted event ready for a transport: the compact JSON text and the
/// level it was logged at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: String,
    pub json: String,
}

/// Asynchronous destination for [`LogLine`]s produced by the logger.
///
/// Implementations are responsible for transporting lines to a concrete
/// destination (console, file, HTTP collector, etc). The logger calls `send`
/// from a background task and never awaits it on the application thread.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Send a single formatted line to the underlying destination.
    ///
    /// **Parameters**
    /// - `line`: compact JSON object for one event plus its level.
    ///
    /// **Returns**
    /// - `Ok(())` if the line was accepted (or deliberately skipped, e.g.
    ///   below the transport's own level).
    /// - `Err(..)` if the destination failed. The dispatcher treats this
    ///   as a transient failure and retries with backoff.
    async fn send(&self, line: &LogLine) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered lines, if the destination implements buffering.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
