use crate::sink::{LogLine, LogSink};
use async_trait::async_trait;
use serde_json::Value;
use std::error::Error;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Keeps every line in memory. Clones share the same buffer, so one clone
/// can be handed to the logger while another is read from.
#[derive(Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lines(&self) -> MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All lines, each terminated by a newline.
    pub fn read_as_string(&self) -> String {
        self.lines().iter().map(|line| format!("{}\n", line)).collect()
    }

    /// All lines parsed back into JSON values. Lines that fail to parse
    /// are skipped.
    pub fn read_as_objects(&self) -> Vec<Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    pub fn reset(&self) {
        self.lines().clear();
    }
}

#[async_trait]
impl LogSink for MemorySink {
    async fn send(&self, line: &LogLine) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.lines().push(line.json.clone());
        Ok(())
    }
}
