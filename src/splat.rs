//! Named splat substitution: `%{key.path}` tokens in message text.

use crate::context::DataContext;
use crate::resolve::KeyPath;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%\{(\S*)\}").expect("placeholder pattern compiles"));

/// Outcome of [`substitute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splat {
    /// `true` when at least one `%{...}` token was found, whether or not
    /// any of them resolved.
    pub had_template: bool,
    pub message: String,
}

/// Replace every `%{key.path}` token in `message` with its value in `ctx`.
///
/// Tokens are matched once, left to right, over the original text. The
/// output is stitched from the original segments and the replacements, so
/// a replacement containing `%{...}` is never expanded again. Tokens whose
/// key is absent are copied verbatim. Strings are inserted raw; every other
/// value is inserted as compact JSON.
pub fn substitute(message: &str, ctx: &DataContext) -> Splat {
    let mut out = String::with_capacity(message.len());
    let mut had_template = false;
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(message) {
        let Some(token) = caps.get(0) else { continue };
        had_template = true;

        out.push_str(&message[last..token.start()]);
        let key = caps.get(1).map_or("", |m| m.as_str());
        match ctx.resolve(&KeyPath::from(key)) {
            Some(value) => push_value(&mut out, &value),
            None => out.push_str(token.as_str()),
        }
        last = token.end();
    }

    out.push_str(&message[last..]);
    Splat {
        had_template,
        message: out,
    }
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::String(text) => out.push_str(text),
        other => out.push_str(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{map_from_json, ContextMap, ContextNode};
    use serde_json::json;

    fn context(value: Value) -> DataContext {
        DataContext::new(map_from_json(value))
    }

    #[test]
    fn message_without_tokens_is_unchanged() {
        let ctx = context(json!({ "a": 1 }));
        let splat = substitute("This is a basic info message.", &ctx);

        assert!(!splat.had_template);
        assert_eq!(splat.message, "This is a basic info message.");
    }

    #[test]
    fn unresolved_tokens_stay_verbatim() {
        let ctx = context(json!({ "nullValue": null }));
        let splat = substitute(
            "Data is %{no.value} and %{novalue} but %{nullValue} is null.",
            &ctx,
        );

        assert!(splat.had_template);
        assert_eq!(
            splat.message,
            "Data is %{no.value} and %{novalue} but null is null."
        );
    }

    #[test]
    fn had_template_even_when_nothing_resolves() {
        let ctx = context(json!({}));
        let splat = substitute("Only %{missing} here", &ctx);

        assert!(splat.had_template);
        assert_eq!(splat.message, "Only %{missing} here");
    }

    #[test]
    fn renders_every_kind_of_value() {
        let ctx = context(json!({
            "level": "info",
            "topics": ["log", "info"],
            "priority": 1,
            "flag": false,
            "data": { "query": "SELECT * FROM types;", "name": "Alan" },
        }));
        let splat = substitute(
            "level: %{level}, topics: %{topics}, priority %{priority}, flag: %{flag}, data: %{data}",
            &ctx,
        );

        assert_eq!(
            splat.message,
            r#"level: info, topics: ["log","info"], priority 1, flag: false, data: {"query":"SELECT * FROM types;","name":"Alan"}"#
        );
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        let ctx = context(json!({ "loop": "%{loop}", "other": "x" }));
        let splat = substitute("%{loop} then %{other}", &ctx);

        assert_eq!(splat.message, "%{loop} then x");
    }

    #[test]
    fn failing_provider_leaves_token() {
        let mut root = ContextMap::new();
        root.insert(
            "willException".to_string(),
            ContextNode::from_fn(|_| Err("What do we do?".into())),
        );
        let ctx = DataContext::new(root);

        assert_eq!(
            substitute("This message %{willException}", &ctx).message,
            "This message %{willException}"
        );
    }

    #[test]
    fn whitespace_breaks_a_token() {
        let ctx = context(json!({ "a": 1 }));
        let splat = substitute("%{a b} and %{a}", &ctx);

        assert!(splat.had_template);
        assert_eq!(splat.message, "%{a b} and 1");
    }
}
