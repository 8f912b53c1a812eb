use crate::error::ConfigError;
use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer, Error as _, Unexpected};
use serde_json::Value;

/// One entry of a [`FormatSpec`].
#[derive(Debug, Clone, PartialEq)]
pub enum SpecNode {
    /// Dotted key path resolved against the data context.
    Path(String),
    /// Number or boolean. Looked up as a literal key first and emitted
    /// unchanged when no such key exists.
    Literal(Value),
    Branch(FormatSpec),
    /// Null, arrays and anything else that is neither a leaf nor a branch.
    Ignored,
}

impl From<&Value> for SpecNode {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(path) => SpecNode::Path(path.clone()),
            Value::Number(_) | Value::Bool(_) => SpecNode::Literal(value.clone()),
            Value::Object(object) => SpecNode::Branch(FormatSpec {
                entries: object
                    .iter()
                    .map(|(key, value)| (key.clone(), SpecNode::from(value)))
                    .collect(),
            }),
            Value::Null | Value::Array(_) => SpecNode::Ignored,
        }
    }
}

/// Declarative shape of the structured output for one level.
///
/// Entry order is significant: the output object lists its keys in the
/// order they appear here, recursively.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormatSpec {
    entries: IndexMap<String, SpecNode>,
}

impl FormatSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the format configured for `level`. The root must be an object.
    pub fn from_value(level: &str, value: &Value) -> Result<Self, ConfigError> {
        match SpecNode::from(value) {
            SpecNode::Branch(spec) => Ok(spec),
            _ => Err(ConfigError::FormatNotObject {
                key: level.to_string(),
            }),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, node: SpecNode) {
        self.entries.insert(key.into(), node);
    }

    pub fn with_path(mut self, key: impl Into<String>, path: impl Into<String>) -> Self {
        self.insert(key, SpecNode::Path(path.into()));
        self
    }

    pub fn with_literal(mut self, key: impl Into<String>, literal: impl Into<Value>) -> Self {
        self.insert(key, SpecNode::Literal(literal.into()));
        self
    }

    pub fn with_branch(mut self, key: impl Into<String>, branch: FormatSpec) -> Self {
        self.insert(key, SpecNode::Branch(branch));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SpecNode)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The schema used for every standard level without an override.
    pub fn default_schema() -> Self {
        FormatSpec::new()
            .with_path("id", "calc.id")
            .with_path("level", "log.level")
            .with_path("message", "log.message")
            .with_path("topics", "topics")
            .with_path("priority", "calc.priority")
            .with_path("template", "log.template")
            .with_path("transactionId", "session.transactionId")
            .with_path("sessionId", "session.sessionId")
            .with_path("traceId", "session.traceId")
            .with_branch(
                "time",
                FormatSpec::new()
                    .with_path("format", "calc.timeFormat")
                    .with_path("created", "log.timestamp")
                    .with_path("expires", "expires"),
            )
            .with_path("pii", "pii")
            .with_path("dataSchema", "dataSchema")
            .with_path("data", "data")
            .with_branch(
                "context",
                FormatSpec::new()
                    .with_branch(
                        "app",
                        FormatSpec::new()
                            .with_path("env", "env.NODE_ENV")
                            .with_path("name", "env.CONFIG_COMPUTE")
                            .with_path("platform", "env.CONFIG_PLATFORM")
                            .with_path("file", "log.context.file")
                            .with_path("line", "log.context.line")
                            .with_path("column", "log.context.column"),
                    )
                    .with_branch(
                        "compute",
                        FormatSpec::new().with_path("processId", "process.pid"),
                    ),
            )
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

impl<'de> Deserialize<'de> for FormatSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match SpecNode::from(&value) {
            SpecNode::Branch(spec) => Ok(spec),
            _ => Err(D::Error::invalid_type(unexpected(&value), &"a format object")),
        }
    }
}
