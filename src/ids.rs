//! Stock value providers.

use crate::context::{DataContext, ValueProvider};
use crate::error::ProviderError;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Random v4 UUID, the default `calc.id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4;

impl ValueProvider for UuidV4 {
    fn provide(&self, _root: &DataContext) -> Result<Value, ProviderError> {
        Ok(Value::String(Uuid::new_v4().to_string()))
    }
}

/// Monotonic message counter starting at 1.
///
/// The count advances once per event that actually resolves it.
#[derive(Debug, Default)]
pub struct Counter {
    current: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }
}

impl ValueProvider for Counter {
    fn provide(&self, _root: &DataContext) -> Result<Value, ProviderError> {
        Ok(Value::from(self.current.fetch_add(1, Ordering::Relaxed) + 1))
    }
}
