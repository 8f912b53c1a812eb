use crate::error::ProviderError;
use indexmap::IndexMap;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Ordered mapping used for every level of the data tree.
pub type ContextMap = IndexMap<String, ContextNode>;

/// A value computed on first resolution within an event.
///
/// Providers receive the root [`DataContext`] of the event being formatted
/// and may resolve other keys through it. Any state a provider keeps (a
/// message counter, an id generator) is its own responsibility; the
/// formatter only guarantees that a provider is called at most once per
/// event.
pub trait ValueProvider: Send + Sync {
    fn provide(&self, root: &DataContext) -> Result<Value, ProviderError>;
}

impl<F> ValueProvider for F
where
    F: Fn(&DataContext) -> Result<Value, ProviderError> + Send + Sync,
{
    fn provide(&self, root: &DataContext) -> Result<Value, ProviderError> {
        self(root)
    }
}

/// One node of the data tree.
#[derive(Clone)]
pub enum ContextNode {
    /// Plain JSON data. Objects inside it are traversed like maps.
    Value(Value),
    /// A mapping that may contain providers further down.
    Map(ContextMap),
    Provider(Arc<dyn ValueProvider>),
}

impl ContextNode {
    pub fn provider<P>(provider: P) -> Self
    where
        P: ValueProvider + 'static,
    {
        ContextNode::Provider(Arc::new(provider))
    }

    /// Wrap a closure as a provider node.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&DataContext) -> Result<Value, ProviderError> + Send + Sync + 'static,
    {
        ContextNode::Provider(Arc::new(f))
    }
}

impl fmt::Debug for ContextNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextNode::Value(value) => f.debug_tuple("Value").field(value).finish(),
            ContextNode::Map(map) => f.debug_tuple("Map").field(map).finish(),
            ContextNode::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

impl From<Value> for ContextNode {
    fn from(value: Value) -> Self {
        ContextNode::Value(value)
    }
}

impl From<ContextMap> for ContextNode {
    fn from(map: ContextMap) -> Self {
        ContextNode::Map(map)
    }
}

/// Split a JSON object into top-level context entries.
///
/// Non-object values carry no keys and yield an empty map.
pub fn map_from_json(value: Value) -> ContextMap {
    match value {
        Value::Object(object) => object
            .into_iter()
            .map(|(key, value)| (key, ContextNode::Value(value)))
            .collect(),
        _ => ContextMap::new(),
    }
}

/// Insert `node` at a dotted `path`, creating intermediate maps.
///
/// Intermediate JSON objects are lifted into maps so their siblings are
/// kept; any other intermediate value is replaced.
pub fn insert_path(map: &mut ContextMap, path: &str, node: ContextNode) {
    let mut segments = path.split('.').peekable();
    let mut current = map;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), node);
            return;
        }

        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| ContextNode::Map(ContextMap::new()));
        if !matches!(entry, ContextNode::Map(_)) {
            let lifted = match std::mem::replace(entry, ContextNode::Map(ContextMap::new())) {
                ContextNode::Value(value @ Value::Object(_)) => map_from_json(value),
                _ => ContextMap::new(),
            };
            *entry = ContextNode::Map(lifted);
        }
        current = match entry {
            ContextNode::Map(inner) => inner,
            _ => return,
        };
    }
}

/// The event-scoped tree every key path is resolved against.
///
/// A context is built for exactly one event and owns its own copy of all
/// data. Provider results are memoized in a cache local to the context,
/// keyed by the provider's key path, so the shared tree a context was
/// cloned from is never written to.
pub struct DataContext {
    pub(crate) root: ContextMap,
    pub(crate) memo: RefCell<HashMap<Vec<String>, Option<Value>>>,
}

impl DataContext {
    pub fn new(root: ContextMap) -> Self {
        Self {
            root,
            memo: RefCell::new(HashMap::new()),
        }
    }

    /// Merge `entries` into the top level; colliding keys are replaced.
    pub fn merge(&mut self, entries: ContextMap) {
        for (key, node) in entries {
            self.root.insert(key, node);
        }
    }

    /// Set a value at a dotted path.
    pub fn set(&mut self, path: &str, node: impl Into<ContextNode>) {
        insert_path(&mut self.root, path, node.into());
    }

    pub fn root(&self) -> &ContextMap {
        &self.root
    }
}

impl fmt::Debug for DataContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataContext")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
