//! Definition compiler
//!
//! Resolves every field spec of a parsed [`MappingDefinition`] against the
//! input and output schema fragments, turning names into callables through
//! the configured resolvers. Compilation is fail-fast: the first invalid
//! field aborts the whole definition.
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use crate::compiled::{CompiledMapping, SourceBinding, Strategy, StrategyNode};
use crate::definition::{FieldSpec, LookupSpec, MappingDefinition, NestedSpec};
use crate::error::ResolverKind;
use crate::schema::{SchemaFragment, SchemaType};
use crate::transform::{lookup_table, Resolve, Transform};
use crate::{Error, Result};
use tracing::{debug, trace};

/// Compiler bound to a pair of resolvers
pub struct Compiler<'a> {
    functions: &'a dyn Resolve,
    lookups: &'a dyn Resolve,
}

impl<'a> Compiler<'a> {
    /// Create a compiler using `functions` for named functions and `lookups`
    /// for named lookup tables
    pub fn new(functions: &'a dyn Resolve, lookups: &'a dyn Resolve) -> Self {
        Self { functions, lookups }
    }

    /// Compile one definition level against its schema fragments
    pub fn compile_definition(
        &self,
        definition: &MappingDefinition,
        input_schema: &SchemaFragment,
        output_schema: &SchemaFragment,
    ) -> Result<CompiledMapping> {
        let strategies = definition
            .fields
            .iter()
            .map(|(key, spec)| {
                if definition.constants.contains_key(key) {
                    return Err(Error::DuplicateField { field: key.clone() });
                }
                self.compile_strategy(key, spec, input_schema, output_schema)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CompiledMapping {
            constants: definition.constants.clone(),
            strategies,
        })
    }

    /// Compile the field spec declared for target `key`
    pub fn compile_strategy(
        &self,
        key: &str,
        spec: &FieldSpec,
        input_schema: &SchemaFragment,
        output_schema: &SchemaFragment,
    ) -> Result<StrategyNode> {
        let target_field = output_schema
            .property(key)?
            .ok_or_else(|| Error::TargetUnresolved { field: key.to_string() })?;

        let strategy = match spec {
            FieldSpec::Nested(nested) => {
                self.compile_nested(key, nested, input_schema, &target_field)?
            }
            FieldSpec::Copy { source } => Strategy::Copy {
                source: bind_source(key, source, input_schema)?,
            },
            FieldSpec::Lookup { source, table } => {
                let source = bind_source(key, source, input_schema)?;
                let transform = match table {
                    LookupSpec::Inline(table) => lookup_table(key, table.clone()),
                    LookupSpec::Named(name) => {
                        for_target(key, resolve(self.lookups, ResolverKind::Lookup, name)?)
                    }
                };
                Strategy::Lookup { source, transform }
            }
            FieldSpec::Function { source: Some(source), function } => Strategy::FunctionVal {
                source: bind_source(key, source, input_schema)?,
                transform: resolve(self.functions, ResolverKind::Function, function)?,
            },
            FieldSpec::Function { source: None, function } => Strategy::FunctionFull {
                transform: resolve(self.functions, ResolverKind::Function, function)?,
            },
        };

        debug!(field = key, strategy = %strategy.kind(), "compiled field");

        Ok(StrategyNode {
            target_name: key.to_string(),
            target_field,
            strategy,
        })
    }

    fn compile_nested(
        &self,
        key: &str,
        nested: &NestedSpec,
        input_schema: &SchemaFragment,
        target_field: &SchemaFragment,
    ) -> Result<Strategy> {
        match target_field.schema_type() {
            SchemaType::Array => {
                let items = target_field.items_or_empty()?;
                let definitions: Vec<&MappingDefinition> = match nested {
                    NestedSpec::Single(definition) => vec![definition.as_ref()],
                    NestedSpec::Many(definitions) => definitions.iter().collect(),
                };
                trace!(field = key, entries = definitions.len(), "compiling nested array");
                definitions
                    .into_iter()
                    .map(|definition| self.compile_definition(definition, input_schema, &items))
                    .collect::<Result<Vec<_>>>()
                    .map(Strategy::NestedArray)
            }
            SchemaType::Object => match nested {
                NestedSpec::Many(_) => Err(Error::NestedArrayForObject { field: key.to_string() }),
                NestedSpec::Single(definition) => self
                    .compile_definition(definition, input_schema, target_field)
                    .map(Strategy::NestedObject),
            },
            other => Err(Error::NestedTargetType {
                field: key.to_string(),
                found: other.to_string(),
            }),
        }
    }
}

fn bind_source(key: &str, source: &str, input_schema: &SchemaFragment) -> Result<SourceBinding> {
    let field = input_schema
        .property(source)?
        .ok_or_else(|| Error::SourceUnresolved {
            field: key.to_string(),
            source_name: source.to_string(),
        })?;
    Ok(SourceBinding {
        name: source.to_string(),
        field,
    })
}

fn resolve(resolver: &dyn Resolve, kind: ResolverKind, name: &str) -> Result<Transform> {
    resolver.resolve(name).ok_or_else(|| Error::Unresolved {
        kind,
        name: name.to_string(),
    })
}

/// Report unknown values of a named table against the target field
fn for_target(key: &str, table: Transform) -> Transform {
    let target = key.to_string();
    let name = table.name().to_string();
    Transform::new(name, move |value| {
        table.call(value).map_err(|err| match err {
            Error::UnknownLookupValue { value, .. } => Error::UnknownLookupValue {
                value,
                target: target.clone(),
            },
            other => other,
        })
    })
}
