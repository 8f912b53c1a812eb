use crate::error::{ConfigError, FormatError};
use crate::spec::FormatSpec;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Standard severities, most severe first. A level's index is its priority.
pub const LEVELS: [&str; 7] = ["error", "warn", "info", "http", "verbose", "debug", "silly"];

pub fn priority(level: &str) -> Option<usize> {
    LEVELS.iter().position(|known| *known == level)
}

/// Whether an event at `level` passes a `threshold`.
///
/// Levels outside [`LEVELS`] always pass; whether they can be formatted is
/// decided by the [`FormatTable`].
pub fn is_enabled(level: &str, threshold: &str) -> bool {
    match (priority(level), priority(threshold)) {
        (Some(level), Some(threshold)) => level <= threshold,
        _ => true,
    }
}

pub fn validate(level: &str) -> Result<(), ConfigError> {
    priority(level)
        .map(|_| ())
        .ok_or_else(|| ConfigError::UnknownLevel(level.to_string()))
}

pub fn from_tracing(level: &tracing::Level) -> &'static str {
    match *level {
        tracing::Level::ERROR => "error",
        tracing::Level::WARN => "warn",
        tracing::Level::INFO => "info",
        tracing::Level::DEBUG => "debug",
        tracing::Level::TRACE => "silly",
    }
}

/// Per-level format selection.
///
/// Every standard level shares the built-in default schema. An override
/// replaces the default for its level as a whole; fields are never merged.
#[derive(Debug, Clone)]
pub struct FormatTable {
    default: Arc<FormatSpec>,
    overrides: HashMap<String, Arc<FormatSpec>>,
}

impl FormatTable {
    pub fn new(overrides: IndexMap<String, FormatSpec>) -> Self {
        Self::with_default(FormatSpec::default_schema(), overrides)
    }

    pub fn with_default(default: FormatSpec, overrides: IndexMap<String, FormatSpec>) -> Self {
        Self {
            default: Arc::new(default),
            overrides: overrides
                .into_iter()
                .map(|(level, spec)| (level, Arc::new(spec)))
                .collect(),
        }
    }

    pub fn select(&self, level: &str) -> Result<Arc<FormatSpec>, FormatError> {
        if let Some(spec) = self.overrides.get(level) {
            return Ok(Arc::clone(spec));
        }
        if priority(level).is_some() {
            return Ok(Arc::clone(&self.default));
        }
        Err(FormatError::MissingFormat {
            level: level.to_string(),
        })
    }
}

impl Default for FormatTable {
    fn default() -> Self {
        Self::new(IndexMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_filters_less_severe_levels() {
        assert!(is_enabled("error", "error"));
        assert!(!is_enabled("info", "error"));
        assert!(is_enabled("http", "silly"));
        assert!(!is_enabled("silly", "debug"));
        assert!(is_enabled("audit", "error"));
    }

    #[test]
    fn standard_levels_share_the_default() {
        let table = FormatTable::default();
        for level in LEVELS {
            assert_eq!(*table.select(level).unwrap(), FormatSpec::default_schema());
        }
    }

    #[test]
    fn override_replaces_default_wholesale() {
        let mut overrides = IndexMap::new();
        overrides.insert(
            "info".to_string(),
            FormatSpec::new().with_path("info_msg", "log.message"),
        );
        let table = FormatTable::new(overrides);

        let info = table.select("info").unwrap();
        assert_eq!(info.len(), 1);
        assert_eq!(*table.select("warn").unwrap(), FormatSpec::default_schema());
    }

    #[test]
    fn custom_levels_need_an_override() {
        let mut overrides = IndexMap::new();
        overrides.insert(
            "audit".to_string(),
            FormatSpec::new().with_path("msg", "log.message"),
        );
        let table = FormatTable::new(overrides);

        assert!(table.select("audit").is_ok());
        assert!(matches!(
            table.select("notice"),
            Err(FormatError::MissingFormat { level }) if level == "notice"
        ));
    }

    #[test]
    fn maps_tracing_levels() {
        assert_eq!(from_tracing(&tracing::Level::TRACE), "silly");
        assert_eq!(from_tracing(&tracing::Level::WARN), "warn");
        assert!(validate("verbose").is_ok());
        assert!(validate("loud").is_err());
    }
}
