//! Lookup tables
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use super::built_in::plain_text;
use super::{Resolve, Transform};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Build a key-validating callable over `table`
///
/// The input value is matched by its text form, since table keys are text.
/// A value with no entry (or whose entry is null) fails the call with an
/// error naming `target`.
pub fn lookup_table(target: impl Into<String>, table: Map<String, Value>) -> Transform {
    let target = target.into();
    let name = format!("lookup:{}", target);
    Transform::new(name, move |value| find(&table, value, &target))
}

fn find(table: &Map<String, Value>, value: &Value, target: &str) -> Result<Value> {
    let key = plain_text(value);
    match table.get(&key) {
        Some(found) if !found.is_null() => Ok(found.clone()),
        _ => Err(Error::UnknownLookupValue {
            value: key,
            target: target.to_string(),
        }),
    }
}

/// Named lookup tables usable as a lookup resolver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupTables {
    tables: HashMap<String, Map<String, Value>>,
}

impl LookupTables {
    /// Create an empty set of tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table under `name`
    pub fn with_table(mut self, name: impl Into<String>, table: Map<String, Value>) -> Self {
        self.tables.insert(name.into(), table);
        self
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no tables are defined
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Resolve for LookupTables {
    fn resolve(&self, name: &str) -> Option<Transform> {
        // the compiler renames failures after the target field
        self.tables
            .get(name)
            .map(|table| lookup_table(name, table.clone()))
    }
}
