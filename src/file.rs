use crate::error::ConfigError;
use crate::levels;
use crate::sink::{LogLine, LogSink};
use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Options of the `file` transport.
#[derive(Debug, Clone, Deserialize)]
pub struct FileOptions {
    pub filename: PathBuf,
    /// Only lines at or above this level are written.
    #[serde(default)]
    pub level: Option<String>,
}

/// Appends one line per event to a file.
pub struct FileSink {
    file: Mutex<File>,
    level: Option<String>,
}

impl FileSink {
    /// Open (or create) the target file in append mode.
    pub fn open(options: FileOptions) -> Result<Self, ConfigError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&options.filename)
            .map_err(|source| ConfigError::OpenFile {
                path: options.filename.clone(),
                source,
            })?;

        Ok(FileSink {
            file: Mutex::new(File::from_std(file)),
            level: options.level,
        })
    }
}

#[async_trait]
impl LogSink for FileSink {
    async fn send(&self, line: &LogLine) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(threshold) = &self.level {
            if !levels::is_enabled(&line.level, threshold) {
                return Ok(());
            }
        }

        let mut file = self.file.lock().await;
        file.write_all(line.json.as_bytes()).await?;
        file.write_all(b"\n").await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut file = self.file.lock().await;
        file.flush().await?;
        Ok(())
    }
}
