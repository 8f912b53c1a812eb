use crate::context::{map_from_json, ContextMap, ContextNode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::panic::Location;

/// Where an error was raised or reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorLocation {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl ErrorLocation {
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }
}

impl From<&Location<'_>> for ErrorLocation {
    fn from(location: &Location<'_>) -> Self {
        Self {
            file: location.file().to_string(),
            line: Some(location.line()),
            column: Some(location.column()),
        }
    }
}

/// Error attached to a log call.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorInfo {
    pub text: String,
    pub location: Option<ErrorLocation>,
}

impl ErrorInfo {
    /// Capture `err` together with the location of the caller.
    #[track_caller]
    pub fn capture(err: &dyn Error) -> Self {
        Self {
            text: err.to_string(),
            location: Some(ErrorLocation::caller()),
        }
    }
}

/// A raw logging event, before any formatting.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: Option<String>,
    /// Per-call data, merged into the top level of the data context.
    pub data: ContextMap,
    pub error: Option<ErrorInfo>,
}

impl LogRecord {
    pub fn new(level: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level: level.into(),
            message: Some(message.into()),
            data: ContextMap::new(),
            error: None,
        }
    }

    /// A record whose message is the error itself.
    #[track_caller]
    pub fn from_error(level: impl Into<String>, err: &dyn Error) -> Self {
        Self {
            timestamp: Utc::now(),
            level: level.into(),
            message: None,
            data: ContextMap::new(),
            error: Some(ErrorInfo::capture(err)),
        }
    }

    /// Add the entries of a JSON object as per-call data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data.extend(map_from_json(data));
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, node: impl Into<ContextNode>) -> Self {
        self.data.insert(key.into(), node.into());
        self
    }

    #[track_caller]
    pub fn with_error(mut self, err: &dyn Error) -> Self {
        self.error = Some(ErrorInfo::capture(err));
        self
    }

    pub fn with_error_info(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Message text as logged: an attached error's text is appended after
    /// a space, and stands alone when there is no message.
    pub fn full_message(&self) -> String {
        match (&self.message, &self.error) {
            (Some(message), Some(error)) => format!("{} {}", message, error.text),
            (Some(message), None) => message.clone(),
            (None, Some(error)) => error.text.clone(),
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io;

    #[test]
    fn error_text_is_appended_to_message() {
        let err = io::Error::new(io::ErrorKind::Other, "A Good error");
        let record = LogRecord::new("error", "Had an error:").with_error(&err);

        assert_eq!(record.full_message(), "Had an error: A Good error");
        let location = record.error.unwrap().location.unwrap();
        assert_eq!(location.file, file!());
        assert!(location.line.is_some());
    }

    #[test]
    fn error_only_record_uses_error_text() {
        let err = io::Error::new(io::ErrorKind::Other, "boom");
        let record = LogRecord::from_error("error", &err);

        assert_eq!(record.full_message(), "boom");
    }

    #[test]
    fn with_data_ignores_non_objects() {
        let record = LogRecord::new("info", "m")
            .with_data(json!("just a string"))
            .with_data(json!({ "a": 1 }));

        assert_eq!(record.data.len(), 1);
    }
}
