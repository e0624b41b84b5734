//! Schema fragments consulted by the compiler
//!
//! Only the parts of a JSON Schema the compiler needs are modelled: the
//! `type` tag, object `properties` and array `items`. Any other keyword
//! (`title`, `required`, ...) is accepted and ignored. `type` and `items`
//! are kept raw and only interpreted when a nested strategy needs them, so
//! union types and tuple or boolean `items` never block a value strategy.
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One level of a value's declared shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaFragment {
    /// Raw `type` tag, absent for untyped fragments
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,

    /// Object properties by name
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,

    /// Raw element shape for arrays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
}

/// Type category of a schema fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
    /// A tag this crate does not interpret, including union types
    Other(String),
    /// No `type` tag at all
    Untyped,
}

impl SchemaFragment {
    /// Parse a fragment from a JSON value, rejecting anything but an object
    pub fn from_value(argument: &str, value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::invalid_argument(
                argument,
                format!("expected an object, found {}", value_kind(value)),
            ));
        }
        serde_json::from_value(value.clone())
            .map_err(|e| Error::invalid_argument(argument, e.to_string()))
    }

    /// Type category of this fragment
    pub fn schema_type(&self) -> SchemaType {
        let tag = match &self.kind {
            None | Some(Value::Null) => return SchemaType::Untyped,
            Some(Value::String(tag)) => tag.as_str(),
            Some(other) => return SchemaType::Other(other.to_string()),
        };
        match tag {
            "object" => SchemaType::Object,
            "array" => SchemaType::Array,
            "string" => SchemaType::String,
            "number" => SchemaType::Number,
            "integer" => SchemaType::Integer,
            "boolean" => SchemaType::Boolean,
            "null" => SchemaType::Null,
            other => SchemaType::Other(other.to_string()),
        }
    }

    /// Resolve a child property, `None` if it is not declared
    ///
    /// Properties are kept as raw values so that unusual schema keywords do
    /// not break parsing of the levels that are never consulted.
    pub fn property(&self, name: &str) -> Result<Option<SchemaFragment>> {
        match self.properties.get(name) {
            None => Ok(None),
            Some(value) => {
                let argument = format!("schema for property `{}`", name);
                SchemaFragment::from_value(&argument, value).map(Some)
            }
        }
    }

    /// Element fragment of an array
    ///
    /// Empty when `items` is missing or is not a single schema object
    /// (tuple or boolean forms), so nested fields then fail to resolve.
    pub fn items_or_empty(&self) -> Result<SchemaFragment> {
        match &self.items {
            Some(items @ Value::Object(_)) => SchemaFragment::from_value("schema for `items`", items),
            _ => Ok(SchemaFragment::default()),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaType::Object => write!(f, "object"),
            SchemaType::Array => write!(f, "array"),
            SchemaType::String => write!(f, "string"),
            SchemaType::Number => write!(f, "number"),
            SchemaType::Integer => write!(f, "integer"),
            SchemaType::Boolean => write!(f, "boolean"),
            SchemaType::Null => write!(f, "null"),
            SchemaType::Other(tag) => write!(f, "{}", tag),
            SchemaType::Untyped => write!(f, "<none>"),
        }
    }
}

/// Short name of a JSON value's kind, used in error messages
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
