use serde_json::json;
use structured_log::{LogRecord, LoggerConfig, StructuredLogger};

const CONFIG: &str = r#"{
    "level": "info",
    "transport": [
        { "type": "console", "options": { "stderrLevels": ["error"] } },
        { "type": "syslog", "options": { "ignored": true } }
    ],
    "sharedData": {
        "session": { "sessionId": "aba3b8fe-2c8b-48fe-8249-390f46ed4eec" }
    },
    "structured": {
        "error": {
            "level": "log.level",
            "message": "log.message",
            "session": "session.sessionId"
        }
    }
}"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LoggerConfig::from_json(CONFIG)?
        .with_env_overrides()
        .with_process_context();
    let logger = StructuredLogger::new(config)?;

    logger.info("Successfully setup logging for the %{env.NODE_ENV} environment.")?;
    logger.log(
        LogRecord::new("error", "Running SQL for %{data.name} failed")
            .with_data(json!({ "data": { "name": "Alan" } })),
    )?;

    logger.flush().await;
    Ok(())
}
