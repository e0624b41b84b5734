//! Mapping applicator
//!
//! Walks a [`CompiledMapping`] against one input value. The walk only reads
//! the tree and the input; every output value is freshly built.
//!
//! Suppression rules:
//! - a field whose result is null or the empty string is not written;
//!   `0`, `false` and empty arrays or objects are written
//! - a level with no written fields gets no constants either
//! - an empty nested object becomes null, so its parent field is dropped
//! - empty nested array elements are dropped, survivors keep their order
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use crate::compiled::{CompiledMapping, SourceBinding, Strategy, StrategyNode};
use crate::Result;
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Field injected into every surviving nested array element
pub const DATA_ORIGIN_KEY: &str = "dataOrigin";

/// Apply one compiled level to `input`
pub fn apply_mapping(
    input: &Value,
    mapping: &CompiledMapping,
    origin: &str,
) -> Result<Map<String, Value>> {
    let mut output = Map::new();

    for node in &mapping.strategies {
        let result = apply_strategy(input, node, origin)?;
        if is_suppressed(&result) {
            trace!(field = %node.target_name, "suppressed empty result");
            continue;
        }
        output.insert(node.target_name.clone(), result);
    }

    if !output.is_empty() {
        for (key, value) in &mapping.constants {
            output.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }

    Ok(output)
}

/// Evaluate a single node against `input`
pub fn apply_strategy(input: &Value, node: &StrategyNode, origin: &str) -> Result<Value> {
    trace!(field = %node.target_name, strategy = %node.kind(), "applying strategy");

    match &node.strategy {
        Strategy::Copy { source } => Ok(read_trimmed(input, source)),
        Strategy::Lookup { source, transform } | Strategy::FunctionVal { source, transform } => {
            transform.call(&read_trimmed(input, source))
        }
        Strategy::FunctionFull { transform } => transform.call(input),
        Strategy::NestedObject(child) => {
            let output = apply_mapping(input, child, origin)?;
            if output.is_empty() {
                debug!(field = %node.target_name, "nested object empty, suppressed");
                Ok(Value::Null)
            } else {
                Ok(Value::Object(output))
            }
        }
        Strategy::NestedArray(children) => {
            let mut elements = Vec::with_capacity(children.len());
            for (index, child) in children.iter().enumerate() {
                let mut element = apply_mapping(input, child, origin)?;
                if element.is_empty() {
                    debug!(field = %node.target_name, index, "nested array element empty, dropped");
                    continue;
                }
                element.insert(DATA_ORIGIN_KEY.to_string(), Value::String(origin.to_string()));
                elements.push(Value::Object(element));
            }
            Ok(Value::Array(elements))
        }
    }
}

/// Whether a result is left out of its parent object
pub fn is_suppressed(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Read the source field, trimming text; missing fields read as null
fn read_trimmed(input: &Value, source: &SourceBinding) -> Value {
    match input.get(&source.name) {
        Some(Value::String(s)) => Value::String(s.trim_matches(is_text_space).to_string()),
        Some(value) => value.clone(),
        None => Value::Null,
    }
}

/// Whitespace stripped from source text: Unicode `White_Space` plus the
/// byte order mark, without NEL (U+0085)
fn is_text_space(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{FEFF}'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaFragment;
    use crate::transform::Transform;
    use crate::Error;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn source(name: &str) -> SourceBinding {
        SourceBinding {
            name: name.to_string(),
            field: SchemaFragment::default(),
        }
    }

    fn node(target: &str, strategy: Strategy) -> StrategyNode {
        StrategyNode {
            target_name: target.to_string(),
            target_field: SchemaFragment::default(),
            strategy,
        }
    }

    fn copy(target: &str, from: &str) -> StrategyNode {
        node(target, Strategy::Copy { source: source(from) })
    }

    fn mapping(constants: Value, strategies: Vec<StrategyNode>) -> CompiledMapping {
        CompiledMapping {
            constants: constants.as_object().cloned().unwrap_or_default(),
            strategies,
        }
    }

    /// Transform recording the last argument it saw
    fn recorder() -> (Transform, Arc<Mutex<Option<Value>>>) {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let transform = Transform::infallible("record", move |v| {
            *sink.lock().unwrap() = Some(v.clone());
            json!(1)
        });
        (transform, seen)
    }

    #[test]
    fn test_copy_trims_text() {
        let out = apply_strategy(&json!({ "someProperty": " foo" }), &copy("output", "someProperty"), "mapper")
            .unwrap();
        assert_eq!(out, json!("foo"));

        let out = apply_strategy(&json!({ "someProperty": 0 }), &copy("output", "someProperty"), "mapper")
            .unwrap();
        assert_eq!(out, json!(0));
    }

    #[test]
    fn test_trim_matches_text_whitespace() {
        let node = copy("output", "someProperty");
        let out = apply_strategy(&json!({ "someProperty": "\u{FEFF}\u{3000} foo\t\n" }), &node, "mapper").unwrap();
        assert_eq!(out, json!("foo"));

        let out = apply_strategy(&json!({ "someProperty": "\u{85}foo\u{85}" }), &node, "mapper").unwrap();
        assert_eq!(out, json!("\u{85}foo\u{85}"));
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_suppressed_nested_levels_are_logged() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();

        let object = node("details", Strategy::NestedObject(mapping(json!({}), vec![copy("a", "missing")])));
        let array = node(
            "items",
            Strategy::NestedArray(vec![
                mapping(json!({}), vec![copy("a", "missing")]),
                mapping(json!({}), vec![copy("a", "present")]),
            ]),
        );

        tracing::subscriber::with_default(subscriber, || {
            assert_eq!(apply_strategy(&json!({ "present": "x" }), &object, "mapper").unwrap(), Value::Null);
            let items = apply_strategy(&json!({ "present": "x" }), &array, "mapper").unwrap();
            assert_eq!(items, json!([{ "a": "x", "dataOrigin": "mapper" }]));
        });

        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("nested object empty, suppressed"));
        assert!(text.contains("field=details"));
        assert!(text.contains("nested array element empty, dropped"));
        assert!(text.contains("field=items"));
        assert!(text.contains("index=0"));
    }

    #[test]
    fn test_value_and_full_strategies_arguments() {
        let input = json!({ "someProperty": " foo ", "other": true });

        let (transform, seen) = recorder();
        let lookup = node("output", Strategy::Lookup { source: source("someProperty"), transform });
        assert_eq!(apply_strategy(&input, &lookup, "mapper").unwrap(), json!(1));
        assert_eq!(seen.lock().unwrap().take(), Some(json!("foo")));

        let (transform, seen) = recorder();
        let value = node("output", Strategy::FunctionVal { source: source("someProperty"), transform });
        assert_eq!(apply_strategy(&input, &value, "mapper").unwrap(), json!(1));
        assert_eq!(seen.lock().unwrap().take(), Some(json!("foo")));

        let (transform, seen) = recorder();
        let full = node("output", Strategy::FunctionFull { transform });
        assert_eq!(apply_strategy(&input, &full, "mapper").unwrap(), json!(1));
        assert_eq!(seen.lock().unwrap().take(), Some(input.clone()));
    }

    #[test]
    fn test_nested_object() {
        let nested = node("container", Strategy::NestedObject(mapping(json!({}), vec![copy("output", "someProperty")])));
        let out = apply_strategy(&json!({ "someProperty": "foo" }), &nested, "mapper").unwrap();
        assert_eq!(out, json!({ "output": "foo" }));
    }

    #[test]
    fn test_nested_object_suppressed_when_empty() {
        let nested = node("container", Strategy::NestedObject(mapping(json!({ "kind": "x" }), vec![])));
        let out = apply_strategy(&json!({ "someProperty": "foo" }), &nested, "mapper").unwrap();
        assert_eq!(out, Value::Null);
    }

    #[test]
    fn test_nested_array_drops_empty_elements_and_stamps_origin() {
        let nested = node(
            "container",
            Strategy::NestedArray(vec![
                mapping(json!({ "category": "first" }), vec![copy("output", "a")]),
                mapping(json!({ "category": "missing" }), vec![copy("output", "absent")]),
                mapping(json!({ "category": "last" }), vec![copy("output", "b")]),
            ]),
        );
        let out = apply_strategy(&json!({ "a": 1, "b": 2 }), &nested, "example").unwrap();
        assert_eq!(
            out,
            json!([
                { "output": 1, "category": "first", "dataOrigin": "example" },
                { "output": 2, "category": "last", "dataOrigin": "example" }
            ])
        );
    }

    #[test]
    fn test_empty_mapping() {
        let out = apply_mapping(&json!({ "someProperty": "foo" }), &mapping(json!({}), vec![]), "mapper").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_suppress_null_and_empty_text() {
        let level = mapping(json!({}), vec![copy("a", "nil"), copy("b", "blank"), copy("c", "missing")]);
        let out = apply_mapping(&json!({ "nil": null, "blank": "   " }), &level, "mapper").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_keep_falsy_values() {
        let level = mapping(
            json!({}),
            vec![copy("zero", "zero"), copy("no", "no"), copy("list", "list"), copy("obj", "obj")],
        );
        let input = json!({ "zero": 0, "no": false, "list": [], "obj": {} });
        let out = apply_mapping(&input, &level, "mapper").unwrap();
        assert_eq!(Value::Object(out), input);
    }

    #[test]
    fn test_constants_only_with_output() {
        let level = mapping(json!({ "bar": "baz" }), vec![copy("output", "someProperty")]);

        let out = apply_mapping(&json!({ "someProperty": "foo" }), &level, "mapper").unwrap();
        assert_eq!(Value::Object(out), json!({ "output": "foo", "bar": "baz" }));

        let out = apply_mapping(&json!({ "someProperty": null }), &level, "mapper").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_transform_failure_propagates() {
        let failing = Transform::new("explode", |_| Err(Error::transform("explode", "nope")));
        let level = mapping(json!({}), vec![node("output", Strategy::FunctionFull { transform: failing })]);
        let err = apply_mapping(&json!({}), &level, "mapper").unwrap_err();
        assert_eq!(err.to_string(), "transform `explode` failed: nope");
    }
}
