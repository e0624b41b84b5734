//! Property-based tests for the mapping engine
//!
//! These tests verify invariants that should hold for all inputs: apply is
//! deterministic, text is trimmed before reaching value strategies, empty
//! results never reach the output and constants only accompany real output.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use shapemap_core::{FunctionRegistry, Mapper, Transform};
use std::sync::{Arc, Mutex};

/// Strategy for scalar JSON values, including empty and padded text
fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[ ]{0,3}[a-zA-Z0-9]{0,8}[ ]{0,3}".prop_map(Value::String),
    ]
}

/// Strategy for flat input records over the fields `a`, `b` and `c`
fn record_strategy() -> impl Strategy<Value = Value> {
    (scalar_strategy(), scalar_strategy(), scalar_strategy()).prop_map(|(a, b, c)| {
        json!({ "a": a, "b": b, "c": c })
    })
}

fn input_schema() -> Value {
    json!({ "properties": {
        "a": { "type": "string" },
        "b": { "type": "string" },
        "c": { "type": "string" }
    } })
}

fn output_schema() -> Value {
    json!({ "properties": {
        "first": { "type": "string" },
        "second": { "type": "string" },
        "nested": { "type": "object", "properties": { "third": { "type": "string" } } },
        "list": { "type": "array", "items": { "properties": {
            "value": { "type": "string" },
            "kind": { "type": "string" }
        } } }
    } })
}

fn mapper() -> Mapper {
    let mut mapper = Mapper::builder()
        .origin("prop")
        .function_resolver(FunctionRegistry::with_builtins())
        .build();
    mapper
        .compile(
            &json!({
                "$constant": { "version": 1 },
                "first": { "source": "a" },
                "second": { "source": "b", "function": "toString" },
                "nested": { "$nested": { "$constant": { "kind": "n" }, "third": { "source": "c" } } },
                "list": { "$nested": [
                    { "$constant": { "kind": "a" }, "value": { "source": "a" } },
                    { "$constant": { "kind": "c" }, "value": { "source": "c" } }
                ] }
            }),
            &input_schema(),
            &output_schema(),
        )
        .expect("definition compiles");
    mapper
}

fn trimmed(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other.clone(),
    }
}

fn kept(value: &Value) -> bool {
    !matches!(trimmed(value), Value::Null) && trimmed(value) != json!("")
}

proptest! {
    #[test]
    fn prop_apply_is_deterministic(record in record_strategy()) {
        let mapper = mapper();
        let first = mapper.apply_to(&record).unwrap();
        let second = mapper.apply_to(&record).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_copy_matches_trimmed_source(record in record_strategy()) {
        let output = mapper().apply_to(&record).unwrap();
        let a = &record["a"];
        if kept(a) {
            prop_assert_eq!(&output["first"], &trimmed(a));
        } else {
            prop_assert!(output.get("first").is_none());
        }
    }

    #[test]
    fn prop_no_empty_text_or_null_fields(record in record_strategy()) {
        fn check(value: &Value) -> bool {
            match value {
                Value::Object(map) => map.values().all(|v| {
                    !v.is_null() && v != &json!("") && check(v)
                }),
                Value::Array(items) => items.iter().all(check),
                _ => true,
            }
        }
        let output = mapper().apply_to(&record).unwrap();
        prop_assert!(check(&output));
    }

    #[test]
    fn prop_constants_follow_output(record in record_strategy()) {
        let output = mapper().apply_to(&record).unwrap();
        let object = output.as_object().unwrap();
        let strategy_fields = object.keys().filter(|k| k.as_str() != "version").count();
        prop_assert_eq!(object.contains_key("version"), strategy_fields > 0);

        match object.get("nested") {
            Some(nested) => {
                prop_assert_eq!(&nested["kind"], &json!("n"));
            }
            None => {
                prop_assert!(!kept(&record["c"]));
            }
        }
    }

    #[test]
    fn prop_array_survivors_keep_order(record in record_strategy()) {
        let output = mapper().apply_to(&record).unwrap();
        let kinds: Vec<Value> = output["list"]
            .as_array()
            .map(|items| items.iter().map(|item| item["kind"].clone()).collect())
            .unwrap_or_default();

        let mut expected = Vec::new();
        if kept(&record["a"]) { expected.push(json!("a")); }
        if kept(&record["c"]) { expected.push(json!("c")); }
        prop_assert_eq!(kinds, expected);

        for item in output["list"].as_array().into_iter().flatten() {
            prop_assert_eq!(&item["dataOrigin"], &json!("prop"));
        }
    }

    #[test]
    fn prop_value_function_sees_trimmed_text(text in "[ ]{0,4}[a-z]{1,6}[ ]{0,4}") {
        let seen = Arc::new(Mutex::new(Vec::<Value>::new()));
        let sink = Arc::clone(&seen);
        let registry = FunctionRegistry::new().register("record", move |v: &Value| {
            sink.lock().unwrap().push(v.clone());
            Ok(v.clone())
        });
        let mut mapper = Mapper::builder().function_resolver(registry).build();
        mapper.compile(
            &json!({
                "first": { "source": "a", "function": "record" },
                "second": { "function": "record" }
            }),
            &input_schema(),
            &output_schema(),
        ).unwrap();

        let record = json!({ "a": text.clone() });
        mapper.apply_to(&record).unwrap();

        let seen = seen.lock().unwrap();
        prop_assert_eq!(&seen[0], &json!(text.trim()));
        prop_assert_eq!(&seen[1], &record);
    }
}

#[test]
fn test_trimming_helpers() {
    assert_eq!(trimmed(&json!("  x ")), json!("x"));
    assert!(!kept(&json!("   ")));
    assert!(kept(&json!(0)));
    let identity = Transform::infallible("id", |v| v.clone());
    assert_eq!(identity.call(&Value::Object(Map::new())).unwrap(), json!({}));
}
