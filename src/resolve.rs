use crate::context::{ContextMap, ContextNode, DataContext, ValueProvider};
use crate::INTERNAL_TARGET;
use serde_json::{Map, Value};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// A key resolved against a [`DataContext`].
///
/// `Path` is split on `.` into segments; `Key` is a single literal key and
/// is never split. Keys coming from numbers and booleans in a format
/// specification are always literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPath {
    Path(String),
    Key(String),
}

impl KeyPath {
    pub fn literal(key: impl Into<String>) -> Self {
        KeyPath::Key(key.into())
    }

    fn segments(&self) -> Vec<&str> {
        match self {
            KeyPath::Path(path) => path.split('.').collect(),
            KeyPath::Key(key) => vec![key.as_str()],
        }
    }
}

impl From<&str> for KeyPath {
    fn from(path: &str) -> Self {
        KeyPath::Path(path.to_string())
    }
}

impl From<String> for KeyPath {
    fn from(path: String) -> Self {
        KeyPath::Path(path)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPath::Path(path) | KeyPath::Key(path) => f.write_str(path),
        }
    }
}

impl DataContext {
    /// Resolve `path` to a value, or `None` when it is absent.
    ///
    /// Traversal stops at the first missing segment, and at any node that
    /// cannot be descended into (null, a string, a number) while segments
    /// remain. Providers met on the way are invoked once per context and
    /// the result is reused by every later lookup. A failing provider is
    /// cached as absent and its error is never returned.
    pub fn resolve(&self, path: &KeyPath) -> Option<Value> {
        self.lookup(&path.segments())
    }

    fn lookup(&self, segments: &[&str]) -> Option<Value> {
        let mut map = &self.root;
        for (depth, segment) in segments.iter().enumerate() {
            let node = map.get(*segment)?;
            let consumed = &segments[..=depth];
            let rest = &segments[depth + 1..];
            match node {
                ContextNode::Map(inner) if !rest.is_empty() => map = inner,
                ContextNode::Map(inner) => return Some(self.materialize(inner, consumed)),
                ContextNode::Value(value) => return descend(value, rest).cloned(),
                ContextNode::Provider(provider) => {
                    let value = self.provide(consumed, provider.as_ref())?;
                    return descend(&value, rest).cloned();
                }
            }
        }
        None
    }

    fn provide(&self, path: &[&str], provider: &dyn ValueProvider) -> Option<Value> {
        let key: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        if let Some(cached) = self.memo.borrow().get(&key) {
            return cached.clone();
        }

        // A provider that resolves its own path while running sees it absent.
        self.memo.borrow_mut().insert(key.clone(), None);

        let value = match panic::catch_unwind(AssertUnwindSafe(|| provider.provide(self))) {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                tracing::debug!(target: INTERNAL_TARGET, path = %key.join("."), error = %err, "value provider failed");
                None
            }
            Err(_) => {
                tracing::debug!(target: INTERNAL_TARGET, path = %key.join("."), "value provider panicked");
                None
            }
        };

        self.memo.borrow_mut().insert(key, value.clone());
        value
    }

    /// Turn a map node into a JSON object, resolving nested providers.
    /// Providers that fail are left out.
    fn materialize(&self, map: &ContextMap, prefix: &[&str]) -> Value {
        let mut object = Map::new();
        for (key, node) in map {
            let mut path = prefix.to_vec();
            path.push(key.as_str());
            let value = match node {
                ContextNode::Value(value) => Some(value.clone()),
                ContextNode::Map(inner) => Some(self.materialize(inner, &path)),
                ContextNode::Provider(provider) => self.provide(&path, provider.as_ref()),
            };
            if let Some(value) = value {
                object.insert(key.clone(), value);
            }
        }
        Value::Object(object)
    }
}

fn descend<'v>(mut value: &'v Value, segments: &[&str]) -> Option<&'v Value> {
    for segment in segments {
        value = match value {
            Value::Object(object) => object.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{insert_path, map_from_json};
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn context(value: Value) -> DataContext {
        DataContext::new(map_from_json(value))
    }

    fn counting(calls: &Arc<AtomicU64>) -> ContextNode {
        let calls = Arc::clone(calls);
        ContextNode::from_fn(move |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(json!(n))
        })
    }

    #[test]
    fn resolves_dotted_paths() {
        let ctx = context(json!({ "user": { "name": "Alan", "tags": ["a", "b"] } }));

        assert_eq!(ctx.resolve(&"user.name".into()), Some(json!("Alan")));
        assert_eq!(ctx.resolve(&"user.tags.1".into()), Some(json!("b")));
        assert_eq!(ctx.resolve(&"user".into()), Some(json!({ "name": "Alan", "tags": ["a", "b"] })));
    }

    #[test]
    fn missing_segments_are_absent() {
        let ctx = context(json!({ "user": { "name": "Alan" }, "nothing": null }));

        assert_eq!(ctx.resolve(&"user.age".into()), None);
        assert_eq!(ctx.resolve(&"no.value".into()), None);
        assert_eq!(ctx.resolve(&"user.name.first".into()), None);
        assert_eq!(ctx.resolve(&"nothing.below".into()), None);
        assert_eq!(ctx.resolve(&"nothing".into()), Some(Value::Null));
    }

    #[test]
    fn literal_keys_are_not_split() {
        let ctx = context(json!({ "a.b": 1, "a": { "b": 2 } }));

        assert_eq!(ctx.resolve(&KeyPath::literal("a.b")), Some(json!(1)));
        assert_eq!(ctx.resolve(&"a.b".into()), Some(json!(2)));
    }

    #[test]
    fn provider_runs_once_per_context() {
        let calls = Arc::new(AtomicU64::new(0));
        let mut root = ContextMap::new();
        root.insert("count".to_string(), counting(&calls));
        let ctx = DataContext::new(root);

        let first = ctx.resolve(&"count".into());
        let second = ctx.resolve(&"count".into());

        assert_eq!(first, Some(json!(1)));
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn provider_results_are_scoped_to_one_context() {
        let calls = Arc::new(AtomicU64::new(0));
        let mut shared = ContextMap::new();
        shared.insert("count".to_string(), counting(&calls));

        let first = DataContext::new(shared.clone());
        let second = DataContext::new(shared);

        assert_eq!(first.resolve(&"count".into()), Some(json!(1)));
        assert_eq!(second.resolve(&"count".into()), Some(json!(2)));
        assert_eq!(first.resolve(&"count".into()), Some(json!(1)));
    }

    #[test]
    fn provider_result_is_descended_into() {
        let mut root = ContextMap::new();
        root.insert(
            "pair".to_string(),
            ContextNode::from_fn(|_| Ok(json!({ "value01": "one", "value02": "two" }))),
        );
        let ctx = DataContext::new(root);

        assert_eq!(ctx.resolve(&"pair.value02".into()), Some(json!("two")));
        assert_eq!(ctx.resolve(&"pair.value03".into()), None);
    }

    #[test]
    fn provider_receives_root_context() {
        let mut root = map_from_json(json!({ "name": "Alan" }));
        insert_path(
            &mut root,
            "greeting.text",
            ContextNode::from_fn(|ctx| {
                let name = ctx.resolve(&"name".into()).unwrap_or(Value::Null);
                Ok(json!(format!("hello {}", name.as_str().unwrap_or("?"))))
            }),
        );
        let ctx = DataContext::new(root);

        assert_eq!(ctx.resolve(&"greeting.text".into()), Some(json!("hello Alan")));
    }

    #[test]
    fn failing_provider_is_absent() {
        let mut root = ContextMap::new();
        root.insert(
            "broken".to_string(),
            ContextNode::from_fn(|_| Err("What do we do?".into())),
        );
        root.insert(
            "panicky".to_string(),
            ContextNode::from_fn(|_| panic!("provider bug")),
        );
        let ctx = DataContext::new(root);

        assert_eq!(ctx.resolve(&"broken".into()), None);
        assert_eq!(ctx.resolve(&"broken.deeper".into()), None);
        assert_eq!(ctx.resolve(&"panicky".into()), None);
    }

    #[test]
    fn self_referencing_provider_sees_itself_absent() {
        let mut root = ContextMap::new();
        root.insert(
            "me".to_string(),
            ContextNode::from_fn(|ctx| Ok(json!(ctx.resolve(&"me".into()).is_none()))),
        );
        let ctx = DataContext::new(root);

        assert_eq!(ctx.resolve(&"me".into()), Some(json!(true)));
    }

    #[test]
    fn materialized_maps_share_the_memo() {
        let calls = Arc::new(AtomicU64::new(0));
        let mut root = ContextMap::new();
        insert_path(&mut root, "calc.id", counting(&calls));
        insert_path(&mut root, "calc.priority", ContextNode::Value(json!(1)));
        insert_path(&mut root, "calc.broken", ContextNode::from_fn(|_| Err("x".into())));
        let ctx = DataContext::new(root);

        assert_eq!(ctx.resolve(&"calc".into()), Some(json!({ "id": 1, "priority": 1 })));
        assert_eq!(ctx.resolve(&"calc.id".into()), Some(json!(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
