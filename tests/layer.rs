use serde_json::json;
use std::io;
use std::sync::Arc;
use structured_log::layer::StructuredLayer;
use structured_log::memory_sink::MemorySink;
use structured_log::{LoggerConfig, StructuredLogger, INTERNAL_TARGET};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

fn layer_logger(level: &str) -> (Arc<StructuredLogger>, MemorySink) {
    let memory = MemorySink::new();
    let config = LoggerConfig {
        level: level.to_string(),
        ..LoggerConfig::default()
    };
    let logger = StructuredLogger::builder(config)
        .with_sink(Arc::new(memory.clone()))
        .build()
        .unwrap();
    (Arc::new(logger), memory)
}

#[tokio::test]
async fn tracing_events_are_formatted_with_fields_as_data() {
    let (logger, memory) = layer_logger("info");
    let subscriber = Registry::default().with(StructuredLayer::new(Arc::clone(&logger)));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(user = "alan", attempts = 3u64, "login for %{{user}} after %{{attempts}} attempts");
        tracing::debug!("below the threshold");
    });
    logger.flush().await;

    let logged = memory.read_as_objects();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0]["level"], json!("info"));
    assert_eq!(logged[0]["message"], json!("login for alan after 3 attempts"));
    assert_eq!(
        logged[0]["template"],
        json!("login for %{user} after %{attempts} attempts")
    );
}

#[tokio::test]
async fn error_fields_fill_the_app_context() {
    let (logger, memory) = layer_logger("info");
    let subscriber = Registry::default().with(StructuredLayer::new(Arc::clone(&logger)));
    let err = io::Error::new(io::ErrorKind::Other, "connection reset");

    tracing::subscriber::with_default(subscriber, || {
        tracing::error!(error = &err as &dyn std::error::Error, "query failed:");
    });
    logger.flush().await;

    let first = &memory.read_as_objects()[0];
    assert_eq!(first["message"], json!("query failed: connection reset"));
    assert_eq!(first["context"]["app"]["file"], json!(file!()));
    assert!(first["context"]["app"]["line"].is_u64());
}

#[tokio::test]
async fn internal_diagnostics_are_not_formatted() {
    let (logger, memory) = layer_logger("silly");
    let subscriber = Registry::default().with(StructuredLayer::new(Arc::clone(&logger)));

    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!(target: INTERNAL_TARGET, "diagnostic");
        tracing::trace!("maps to silly");
    });
    logger.flush().await;

    let logged = memory.read_as_objects();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0]["level"], json!("silly"));
}
