use std::sync::Arc;

use async_trait::async_trait;
use structured_log::init::init_tracing_with_logger;
use structured_log::sink::{LogLine, LogSink};
use structured_log::{LoggerConfig, StructuredLogger};
use tracing::{error, info};

/// Example of integrating a completely custom destination by implementing
/// the `LogSink` trait directly. For the sake of example the lines are
/// just printed with a prefix.
struct PrefixedStdout;

#[async_trait]
impl LogSink for PrefixedStdout {
    async fn send(&self, line: &LogLine) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!("[{}] {}", line.level, line.json);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger = StructuredLogger::builder(LoggerConfig::default())
        .with_sink(Arc::new(PrefixedStdout))
        .build()?;
    let logger = init_tracing_with_logger(logger, false)?;

    info!(service = "billing", "custom sink example started for %{{service}}");
    error!(db = "my-custom-db", "simulated error sent via %{{db}}");

    logger.flush().await;
    Ok(())
}
