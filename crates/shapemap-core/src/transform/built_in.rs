//! Named function registry and built-in transforms
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use super::{Resolve, Transform};
use crate::{Error, Result};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// Name → transform map usable as a function resolver
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Transform>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in transform
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert(Transform::new("increment", increment));
        registry.insert(Transform::infallible("concat", concat));
        registry.insert(Transform::new("uppercase", |v| map_str("uppercase", v, str::to_uppercase)));
        registry.insert(Transform::new("lowercase", |v| map_str("lowercase", v, str::to_lowercase)));
        registry.insert(Transform::infallible("toString", to_string));
        registry.insert(Transform::new("toNumber", to_number));
        registry.insert(Transform::new("length", length));
        registry
    }

    /// Register a fallible function under `name`
    pub fn register<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.insert(Transform::new(name, func));
        self
    }

    /// Insert an already built transform, replacing any previous one
    pub fn insert(&mut self, transform: Transform) {
        self.functions.insert(transform.name().to_string(), transform);
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Resolve for FunctionRegistry {
    fn resolve(&self, name: &str) -> Option<Transform> {
        self.functions.get(name).cloned()
    }
}

/// Add one to a number; integers stay integers, null passes through
fn increment(value: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    if let Some(i) = value.as_i64() {
        return Ok(Value::from(i + 1));
    }
    value
        .as_f64()
        .and_then(|f| Number::from_f64(f + 1.0))
        .map(Value::Number)
        .ok_or_else(|| Error::transform("increment", format!("expected a number, found {}", value)))
}

/// Join `key:value` pairs of an object with `|`; strings are written bare
fn concat(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::String(
            map.iter()
                .map(|(k, v)| format!("{}:{}", k, plain_text(v)))
                .collect::<Vec<_>>()
                .join("|"),
        ),
        Value::Array(items) => Value::String(
            items.iter().map(plain_text).collect::<Vec<_>>().join("|"),
        ),
        other => Value::String(plain_text(other)),
    }
}

fn map_str(name: &str, value: &Value, f: impl Fn(&str) -> String) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(f(s))),
        Value::Null => Ok(Value::Null),
        other => Err(Error::transform(name, format!("expected a string, found {}", other))),
    }
}

fn to_string(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        other => Value::String(plain_text(other)),
    }
}

fn to_number(value: &Value) -> Result<Value> {
    match value {
        Value::Number(_) | Value::Null => Ok(value.clone()),
        Value::String(s) => {
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Value::from(i));
            }
            s.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| Error::transform("toNumber", format!("`{}` is not a number", s)))
        }
        other => Err(Error::transform("toNumber", format!("cannot convert {} to a number", other))),
    }
}

fn length(value: &Value) -> Result<Value> {
    let len = match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => return Err(Error::transform("length", format!("{} has no length", other))),
    };
    Ok(Value::from(len))
}

/// Text form of a value: strings without quotes, everything else as JSON
///
/// Numbers are written the way JavaScript writes them, so an integral float
/// such as `1.0` reads as `1`.
pub(crate) fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        other => other.to_string(),
    }
}

fn number_text(n: &Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            // f64's Display drops a zero fraction and never uses an exponent
            return f.to_string();
        }
    }
    n.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, value: Value) -> Result<Value> {
        FunctionRegistry::with_builtins()
            .resolve(name)
            .expect("built-in registered")
            .call(&value)
    }

    #[test]
    fn test_increment() {
        assert_eq!(call("increment", json!(0)).unwrap(), json!(1));
        assert_eq!(call("increment", json!(1.5)).unwrap(), json!(2.5));
        assert!(call("increment", json!("one")).is_err());
        assert_eq!(call("increment", Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_concat_keeps_key_order() {
        let out = call("concat", json!({ "index": 0, "name": " Foo ", "value": 3 })).unwrap();
        assert_eq!(out, json!("index:0|name: Foo |value:3"));
    }

    #[test]
    fn test_integral_floats_read_as_integers() {
        assert_eq!(plain_text(&json!(1.0)), "1");
        assert_eq!(plain_text(&json!(-3.0)), "-3");
        assert_eq!(plain_text(&json!(2.5)), "2.5");
        assert_eq!(plain_text(&json!(7)), "7");
        let out = call("concat", json!({ "price": 10.0, "ratio": 0.25 })).unwrap();
        assert_eq!(out, json!("price:10|ratio:0.25"));
        assert_eq!(call("toString", json!(4.0)).unwrap(), json!("4"));
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(call("uppercase", json!("abc")).unwrap(), json!("ABC"));
        assert_eq!(call("lowercase", json!("ABC")).unwrap(), json!("abc"));
        assert_eq!(call("toString", json!(12)).unwrap(), json!("12"));
        assert_eq!(call("toNumber", json!("12")).unwrap(), json!(12));
        assert_eq!(call("toNumber", json!("0.5")).unwrap(), json!(0.5));
        assert!(call("toNumber", json!("twelve")).is_err());
        assert_eq!(call("length", json!("héllo")).unwrap(), json!(5));
        assert_eq!(call("length", json!([1, 2])).unwrap(), json!(2));
    }

    #[test]
    fn test_register_custom() {
        let registry = FunctionRegistry::new().register("negate", |v| {
            Ok(json!(!v.as_bool().unwrap_or(false)))
        });
        assert!(registry.contains("negate"));
        assert!(!registry.contains("increment"));
        assert_eq!(registry.resolve("negate").unwrap().call(&json!(true)).unwrap(), json!(false));
        assert!(FunctionRegistry::with_builtins().names().contains(&"concat"));
    }
}
