use crate::levels;
use crate::sink::{LogLine, LogSink};
use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error;
use tokio::io::{AsyncWriteExt, Stderr, Stdout};
use tokio::sync::Mutex;

/// Options of the `console` transport.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsoleOptions {
    /// Only lines at or above this level are written.
    pub level: Option<String>,
    /// Levels written to stderr instead of stdout.
    pub stderr_levels: Vec<String>,
}

/// Writes each line to stdout, or stderr for the configured levels.
///
/// Each stream has a single handle that is flushed after every line, so
/// lines reach the terminal in the order they were sent.
#[derive(Debug)]
pub struct ConsoleSink {
    options: ConsoleOptions,
    stdout: Mutex<Stdout>,
    stderr: Mutex<Stderr>,
}

impl ConsoleSink {
    pub fn new(options: ConsoleOptions) -> Self {
        Self {
            options,
            stdout: Mutex::new(tokio::io::stdout()),
            stderr: Mutex::new(tokio::io::stderr()),
        }
    }

    fn uses_stderr(&self, level: &str) -> bool {
        self.options.stderr_levels.iter().any(|l| l == level)
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(ConsoleOptions::default())
    }
}

#[async_trait]
impl LogSink for ConsoleSink {
    async fn send(&self, line: &LogLine) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(threshold) = &self.options.level {
            if !levels::is_enabled(&line.level, threshold) {
                return Ok(());
            }
        }

        let mut text = String::with_capacity(line.json.len() + 1);
        text.push_str(&line.json);
        text.push('\n');

        if self.uses_stderr(&line.level) {
            let mut stderr = self.stderr.lock().await;
            stderr.write_all(text.as_bytes()).await?;
            stderr.flush().await?;
        } else {
            let mut stdout = self.stdout.lock().await;
            stdout.write_all(text.as_bytes()).await?;
            stdout.flush().await?;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.stdout.lock().await.flush().await?;
        self.stderr.lock().await.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_configured_levels_to_stderr() {
        let sink = ConsoleSink::new(ConsoleOptions {
            level: None,
            stderr_levels: vec!["error".to_string()],
        });

        assert!(sink.uses_stderr("error"));
        assert!(!sink.uses_stderr("info"));
    }

    #[tokio::test]
    async fn writes_and_flushes_each_line() {
        let sink = ConsoleSink::default();

        for n in 0..3 {
            let line = LogLine {
                level: "info".to_string(),
                json: format!(r#"{{"n":{}}}"#, n),
            };
            sink.send(&line).await.unwrap();
        }
        sink.flush().await.unwrap();
    }

    #[tokio::test]
    async fn lines_below_the_transport_level_are_skipped() {
        let sink = ConsoleSink::new(ConsoleOptions {
            level: Some("error".to_string()),
            stderr_levels: Vec::new(),
        });
        let line = LogLine {
            level: "debug".to_string(),
            json: "{}".to_string(),
        };

        assert!(sink.send(&line).await.is_ok());
    }
}
