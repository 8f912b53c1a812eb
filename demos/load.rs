use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use structured_log::noop_sink::NoopSink;
use structured_log::{LogRecord, LoggerConfig, StructuredLogger};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LoggerConfig {
        channel_buffer: 1 << 16,
        ..LoggerConfig::default()
    };
    let logger = StructuredLogger::builder(config)
        .with_sink(Arc::new(NoopSink))
        .build()?;

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        logger.log(
            LogRecord::new("info", "load test iteration %{iteration} for %{data.name}")
                .with_data(json!({ "iteration": i, "data": { "name": "Alan" } })),
        )?;
    }

    let elapsed = start.elapsed();
    println!(
        "formatted {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    logger.flush().await;
    if let Some(stats) = logger.stats() {
        println!("{:?}", stats);
    }
    Ok(())
}
