use crate::sink::{LogLine, LogSink};
use async_trait::async_trait;
use std::error::Error;

/// A sink that simply drops all lines.
///
/// Useful for measuring formatting overhead without any I/O, and for
/// transport tables that should accept events but write nowhere.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl LogSink for NoopSink {
    async fn send(&self, _line: &LogLine) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
