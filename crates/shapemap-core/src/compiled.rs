//! Compiled mapping tree
//!
//! The executable form of a definition. Each level owns its strategy nodes
//! and each nested node owns its child levels, so the tree is acyclic and
//! can be shared read-only between any number of concurrent applications.
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use crate::schema::SchemaFragment;
use crate::transform::Transform;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One compiled definition level
#[derive(Debug, Clone, Default)]
pub struct CompiledMapping {
    /// Literal fields merged into a non-empty output of this level
    pub constants: Map<String, Value>,
    /// Nodes in declaration order
    pub strategies: Vec<StrategyNode>,
}

/// The resolved form of one field spec
#[derive(Debug, Clone)]
pub struct StrategyNode {
    /// Output field name
    pub target_name: String,
    /// Output schema fragment for the field
    pub target_field: SchemaFragment,
    /// What to do
    pub strategy: Strategy,
}

/// Input field a value strategy reads from
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBinding {
    pub name: String,
    pub field: SchemaFragment,
}

/// Executable strategy, with everything it needs already resolved
#[derive(Debug, Clone)]
pub enum Strategy {
    Copy {
        source: SourceBinding,
    },
    Lookup {
        source: SourceBinding,
        transform: Transform,
    },
    FunctionVal {
        source: SourceBinding,
        transform: Transform,
    },
    FunctionFull {
        transform: Transform,
    },
    NestedObject(CompiledMapping),
    NestedArray(Vec<CompiledMapping>),
}

/// Strategy tag, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyKind {
    Copy,
    Lookup,
    FunctionVal,
    FunctionFull,
    NestedObject,
    NestedArray,
}

impl CompiledMapping {
    /// Apply this mapping to `input`, stamping `origin` on array elements
    pub fn apply(&self, input: &Value, origin: &str) -> Result<Value> {
        crate::apply::apply_mapping(input, self, origin).map(Value::Object)
    }

    /// Number of nodes in this level and every nested level
    pub fn node_count(&self) -> usize {
        self.strategies
            .iter()
            .map(|node| {
                1 + match &node.strategy {
                    Strategy::NestedObject(child) => child.node_count(),
                    Strategy::NestedArray(children) => {
                        children.iter().map(CompiledMapping::node_count).sum()
                    }
                    _ => 0,
                }
            })
            .sum()
    }

    /// Look up a node of this level by target name
    pub fn node(&self, target_name: &str) -> Option<&StrategyNode> {
        self.strategies.iter().find(|node| node.target_name == target_name)
    }
}

impl StrategyNode {
    /// Strategy tag of this node
    pub fn kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Source field name for value strategies
    pub fn source_name(&self) -> Option<&str> {
        self.strategy.source().map(|source| source.name.as_str())
    }

    /// Resolved callable, if the strategy has one
    pub fn transform(&self) -> Option<&Transform> {
        match &self.strategy {
            Strategy::Lookup { transform, .. }
            | Strategy::FunctionVal { transform, .. }
            | Strategy::FunctionFull { transform } => Some(transform),
            _ => None,
        }
    }
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Copy { .. } => StrategyKind::Copy,
            Strategy::Lookup { .. } => StrategyKind::Lookup,
            Strategy::FunctionVal { .. } => StrategyKind::FunctionVal,
            Strategy::FunctionFull { .. } => StrategyKind::FunctionFull,
            Strategy::NestedObject(_) => StrategyKind::NestedObject,
            Strategy::NestedArray(_) => StrategyKind::NestedArray,
        }
    }

    pub fn source(&self) -> Option<&SourceBinding> {
        match self {
            Strategy::Copy { source }
            | Strategy::Lookup { source, .. }
            | Strategy::FunctionVal { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Copy => write!(f, "copy"),
            StrategyKind::Lookup => write!(f, "lookup"),
            StrategyKind::FunctionVal => write!(f, "functionVal"),
            StrategyKind::FunctionFull => write!(f, "functionFull"),
            StrategyKind::NestedObject => write!(f, "nestedObject"),
            StrategyKind::NestedArray => write!(f, "nestedArray"),
        }
    }
}
