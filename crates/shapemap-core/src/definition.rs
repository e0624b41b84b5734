//! Mapping definitions and field specs
//!
//! A definition arrives as loosely-typed JSON. It is parsed once, here, into
//! closed variants so the compiler can match exhaustively instead of probing
//! which keys happen to be set. Checks that need no schema (mutually
//! exclusive keys, a missing strategy, duplicate constants) are raised while
//! parsing; checks that need a schema are left to the compiler.
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use crate::schema::value_kind;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Reserved key holding literal fields merged into an output level
pub const CONSTANT_KEY: &str = "$constant";

/// Reserved key delegating a field to nested definitions
pub const NESTED_KEY: &str = "$nested";

/// One level of a caller-authored mapping
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "Value")]
pub struct MappingDefinition {
    /// Literal fields for this level, from `$constant`
    pub constants: Map<String, Value>,
    /// Field specs in declaration order
    pub fields: Vec<(String, FieldSpec)>,
}

/// The rule producing one output field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSpec {
    /// `{ source }`
    Copy { source: String },
    /// `{ source, lookup }`
    Lookup { source: String, table: LookupSpec },
    /// `{ source?, function }`; without a source the whole input is passed
    Function {
        source: Option<String>,
        function: String,
    },
    /// `{ $nested }`
    Nested(NestedSpec),
}

/// Where a lookup table comes from
#[derive(Debug, Clone, PartialEq)]
pub enum LookupSpec {
    /// Table written directly in the definition
    Inline(Map<String, Value>),
    /// Table resolved by name through the lookup resolver
    Named(String),
}

/// Body of a `$nested` field spec
#[derive(Debug, Clone, PartialEq)]
pub enum NestedSpec {
    /// A single definition, valid for object and array targets
    Single(Box<MappingDefinition>),
    /// A sequence of definitions, valid for array targets only
    Many(Vec<MappingDefinition>),
}

impl MappingDefinition {
    /// Parse a definition level, recursing into `$nested` bodies
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::invalid_argument(
                "definition",
                format!("expected an object, found {}", value_kind(value)),
            )
        })?;

        let constants = match object.get(CONSTANT_KEY) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(constants)) => constants.clone(),
            Some(other) => {
                return Err(Error::invalid_field_spec(
                    CONSTANT_KEY,
                    format!("expected an object, found {}", value_kind(other)),
                ))
            }
        };

        let mut fields = Vec::with_capacity(object.len());
        for (key, spec) in object {
            if key == CONSTANT_KEY {
                continue;
            }
            if constants.contains_key(key) {
                return Err(Error::DuplicateField { field: key.clone() });
            }
            fields.push((key.clone(), FieldSpec::from_value(key, spec)?));
        }

        Ok(Self { constants, fields })
    }

    /// Whether the level declares no fields and no constants
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty() && self.fields.is_empty()
    }
}

impl FieldSpec {
    /// Parse the field spec declared for target `key`
    pub fn from_value(key: &str, value: &Value) -> Result<Self> {
        let spec = value.as_object().ok_or_else(|| {
            Error::invalid_field_spec(key, format!("expected an object, found {}", value_kind(value)))
        })?;

        let source = optional_string(key, spec, "source")?;
        let function = optional_string(key, spec, "function")?;
        let lookup = present(spec, "lookup");

        if let Some(nested) = present(spec, NESTED_KEY) {
            if source.is_some() || function.is_some() || lookup.is_some() {
                return Err(Error::incompatible(
                    key,
                    "`$nested` cannot be combined with source, lookup or function",
                ));
            }
            return NestedSpec::from_value(key, nested).map(FieldSpec::Nested);
        }

        if let Some(lookup) = lookup {
            let Some(source) = source else {
                return Err(Error::LookupWithoutSource { field: key.to_string() });
            };
            if function.is_some() {
                return Err(Error::incompatible(key, "lookup cannot be combined with function"));
            }
            let table = match lookup {
                Value::String(name) => LookupSpec::Named(name.clone()),
                Value::Object(table) => LookupSpec::Inline(table.clone()),
                other => {
                    return Err(Error::invalid_field_spec(
                        key,
                        format!("`lookup` must be an object or a name, found {}", value_kind(other)),
                    ))
                }
            };
            return Ok(FieldSpec::Lookup { source, table });
        }

        match (source, function) {
            (source, Some(function)) => Ok(FieldSpec::Function { source, function }),
            (Some(source), None) => Ok(FieldSpec::Copy { source }),
            (None, None) => Err(Error::NoStrategy { field: key.to_string() }),
        }
    }
}

impl NestedSpec {
    fn from_value(key: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Array(entries) => entries
                .iter()
                .map(MappingDefinition::from_value)
                .collect::<Result<Vec<_>>>()
                .map(NestedSpec::Many),
            Value::Object(_) => MappingDefinition::from_value(value)
                .map(|definition| NestedSpec::Single(Box::new(definition))),
            other => Err(Error::invalid_field_spec(
                key,
                format!("`$nested` must be an object or an array, found {}", value_kind(other)),
            )),
        }
    }

    /// Normalize to a sequence, wrapping a single definition
    pub fn into_many(self) -> Vec<MappingDefinition> {
        match self {
            NestedSpec::Single(definition) => vec![*definition],
            NestedSpec::Many(definitions) => definitions,
        }
    }
}

impl TryFrom<Value> for MappingDefinition {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        MappingDefinition::from_value(&value)
    }
}

impl TryFrom<&Value> for MappingDefinition {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        MappingDefinition::from_value(value)
    }
}

/// A key counts as declared unless it is missing or null
fn present<'a>(spec: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    spec.get(name).filter(|value| !value.is_null())
}

fn optional_string(key: &str, spec: &Map<String, Value>, name: &str) -> Result<Option<String>> {
    match present(spec, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::invalid_field_spec(
            key,
            format!("`{}` must be a string, found {}", name, value_kind(other)),
        )),
    }
}
