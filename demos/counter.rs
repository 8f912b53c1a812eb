use std::sync::Arc;

use structured_log::ids::Counter;
use structured_log::{LoggerConfig, StructuredLogger};

/// Every message carries its own sequence number through a stateful
/// value provider placed in the shared data.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger = StructuredLogger::builder(LoggerConfig::default())
        .with_value_provider("count", Arc::new(Counter::new()))
        .build()?;

    logger.info("This is log message number %{count}.")?;
    logger.info("This is log message number %{count}.")?;

    logger.flush().await;
    Ok(())
}
