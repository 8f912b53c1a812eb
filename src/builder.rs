use crate::context::DataContext;
use crate::resolve::KeyPath;
use crate::spec::{FormatSpec, SpecNode};
use serde_json::{Map, Value};

/// Fill `acc` from `spec`, resolving every leaf against `ctx`.
///
/// Keys are written in spec order. Absent values, empty objects and
/// branches that end up empty are left out; `null`, `false`, `0` and empty
/// arrays are kept.
pub fn build<'a>(
    acc: &'a mut Map<String, Value>,
    spec: &FormatSpec,
    ctx: &DataContext,
) -> &'a mut Map<String, Value> {
    for (key, node) in spec.iter() {
        match node {
            SpecNode::Path(path) => {
                if let Some(value) = ctx.resolve(&KeyPath::from(path.as_str())).and_then(admit) {
                    acc.insert(key.clone(), value);
                }
            }
            SpecNode::Literal(literal) => {
                let value = ctx
                    .resolve(&KeyPath::literal(literal_key(literal)))
                    .unwrap_or_else(|| literal.clone());
                if let Some(value) = admit(value) {
                    acc.insert(key.clone(), value);
                }
            }
            SpecNode::Branch(branch) => {
                let mut nested = Map::new();
                build(&mut nested, branch, ctx);
                if !nested.is_empty() {
                    acc.insert(key.clone(), Value::Object(nested));
                }
            }
            SpecNode::Ignored => {}
        }
    }
    acc
}

/// Build a fresh output object for `spec`.
pub fn build_output(spec: &FormatSpec, ctx: &DataContext) -> Map<String, Value> {
    let mut out = Map::new();
    build(&mut out, spec, ctx);
    out
}

fn admit(value: Value) -> Option<Value> {
    match &value {
        Value::Object(object) if object.is_empty() => None,
        _ => Some(value),
    }
}

fn literal_key(literal: &Value) -> String {
    match literal {
        Value::String(key) => key.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{map_from_json, ContextMap, ContextNode};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn context(value: Value) -> DataContext {
        DataContext::new(map_from_json(value))
    }

    #[test]
    fn output_follows_spec_order() {
        let ctx = context(json!({ "log": { "level": "info", "message": "This is an info message." } }));

        let a = FormatSpec::new()
            .with_path("level", "log.level")
            .with_path("message", "log.message");
        let b = FormatSpec::new()
            .with_path("message", "log.message")
            .with_path("level", "log.level");

        assert_eq!(
            Value::Object(build_output(&a, &ctx)).to_string(),
            r#"{"level":"info","message":"This is an info message."}"#
        );
        assert_eq!(
            Value::Object(build_output(&b, &ctx)).to_string(),
            r#"{"message":"This is an info message.","level":"info"}"#
        );
    }

    #[test]
    fn empty_branches_are_pruned() {
        let ctx = context(json!({ "pathToEmptyObject": {} }));
        let spec = FormatSpec::new().with_branch(
            "nested",
            FormatSpec::new().with_path("emptyObj", "pathToEmptyObject"),
        );

        assert!(build_output(&spec, &ctx).is_empty());
    }

    #[test]
    fn literals_pass_through_when_unrelated_to_data() {
        let ctx = context(json!({ "unrelated": 1 }));
        let spec = FormatSpec::new()
            .with_literal("8", 8)
            .with_literal("false", false);

        assert_eq!(
            Value::Object(build_output(&spec, &ctx)),
            json!({ "8": 8, "false": false })
        );
    }

    #[test]
    fn literals_resolve_as_literal_keys() {
        let ctx = context(json!({ "5": "five", "5.0": "nope" }));
        let spec = FormatSpec::new().with_literal("5", 5);

        assert_eq!(Value::Object(build_output(&spec, &ctx)), json!({ "5": "five" }));
    }

    #[test]
    fn keeps_falsy_values_and_drops_absent_ones() {
        let mut root = map_from_json(json!({
            "expires": "2020-12-20T09:00:34+07:00",
            "typeConstant": "iso8061",
            "emptyObject": {},
            "nullRoot": null,
            "edgeCases": {
                "true": true,
                "5": "five",
                "nullValue": null,
                "trueValue": true,
                "falseValue": false,
                "arrValue": ["1", 2, { "an": "obj" }],
                "emptyArr": [],
                "embeded": {},
            },
        }));
        let mut funcs = ContextMap::new();
        funcs.insert(
            "func01Value".to_string(),
            ContextNode::from_fn(|_| Ok(json!("Function one"))),
        );
        funcs.insert(
            "func02Value".to_string(),
            ContextNode::from_fn(|_| Ok(json!({ "value01": "one", "value02": "two" }))),
        );
        root.insert("funcs".to_string(), ContextNode::Map(funcs));
        let ctx = DataContext::new(root);

        let spec: FormatSpec = serde_json::from_value(json!({
            "tm": { "type": "typeConstant", "exp": "expires" },
            "nullRoot": "nullRoot",
            "edges": {
                "true": "edgeCases.true",
                "emptyObj": "emptyObject",
                "noSuchProp": "edgeCases.noSuchProperty",
                "nullValue": "edgeCases.nullValue",
                "trueValue": "edgeCases.trueValue",
                "falseValue": "edgeCases.falseValue",
                "arrValue": "edgeCases.arrValue",
                "emptyArr": "edgeCases.emptyArr",
                "embeded": "edgeCases.embeded",
                "funcOne": "funcs.func01Value",
                "funcTwo": "funcs.func02Value.value02",
                "5": "edgeCases.5",
                "skipped": null,
            },
        }))
        .unwrap();

        assert_eq!(
            Value::Object(build_output(&spec, &ctx)),
            json!({
                "tm": { "type": "iso8061", "exp": "2020-12-20T09:00:34+07:00" },
                "nullRoot": null,
                "edges": {
                    "true": true,
                    "nullValue": null,
                    "trueValue": true,
                    "falseValue": false,
                    "arrValue": ["1", 2, { "an": "obj" }],
                    "emptyArr": [],
                    "funcOne": "Function one",
                    "funcTwo": "two",
                    "5": "five",
                },
            })
        );
    }

    #[test]
    fn build_extends_an_existing_accumulator() {
        let ctx = context(json!({ "a": 1 }));
        let mut acc = Map::new();
        acc.insert("seed".to_string(), json!(true));

        let out = build(&mut acc, &FormatSpec::new().with_path("a", "a"), &ctx);

        assert_eq!(Value::Object(out.clone()), json!({ "seed": true, "a": 1 }));
    }
}
