//! The mapper: configuration, compile and apply
//!
//! A [`Mapper`] holds its configuration, its two resolvers and, once
//! [`Mapper::compile`] has succeeded, the compiled plan. Compiling replaces
//! the plan wholesale and takes `&mut self`; applying takes `&self`, so a
//! compiled mapper can be shared across threads and applied concurrently.
//!
//! # Example
//!
//! ```
//! use shapemap_core::{FunctionRegistry, Mapper};
//! use serde_json::json;
//!
//! # fn example() -> shapemap_core::Result<()> {
//! let mut mapper = Mapper::builder()
//!     .origin("example")
//!     .function_resolver(FunctionRegistry::with_builtins())
//!     .build();
//!
//! mapper.compile(
//!     &json!({ "idx": { "source": "index", "function": "increment" } }),
//!     &json!({ "properties": { "index": { "type": "number" } } }),
//!     &json!({ "properties": { "idx": { "type": "number" } } }),
//! )?;
//!
//! assert_eq!(mapper.apply_to(&json!({ "index": 0 }))?, json!({ "idx": 1 }));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use crate::compiled::CompiledMapping;
use crate::compiler::Compiler;
use crate::definition::MappingDefinition;
use crate::schema::SchemaFragment;
use crate::transform::{Resolve, Unconfigured};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Default origin label
pub const DEFAULT_ORIGIN: &str = "mapper";

/// Plain configuration of a mapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Label stamped onto nested array elements as `dataOrigin`
    pub origin: String,
    /// Reserved; schema validation of data is not performed
    pub validate: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            validate: false,
        }
    }
}

/// Everything kept from the last successful compile
#[derive(Debug, Clone)]
pub struct CompiledState {
    pub definition: MappingDefinition,
    pub input_schema: SchemaFragment,
    pub output_schema: SchemaFragment,
    pub mapping: Arc<CompiledMapping>,
}

/// Schema-aware object mapper
pub struct Mapper {
    config: MapperConfig,
    function_resolver: Arc<dyn Resolve>,
    lookup_resolver: Arc<dyn Resolve>,
    compiled: Option<CompiledState>,
}

impl Mapper {
    /// Create a mapper with default configuration and no resolvers
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a mapper
    pub fn builder() -> MapperBuilder {
        MapperBuilder::new()
    }

    /// Create a mapper from a plain configuration, without resolvers
    pub fn from_config(config: MapperConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Origin label stamped onto nested array elements
    pub fn origin(&self) -> &str {
        &self.config.origin
    }

    /// Value of the reserved validate flag
    pub fn validate(&self) -> bool {
        self.config.validate
    }

    /// State kept from the last successful compile
    pub fn compiled(&self) -> Option<&CompiledState> {
        self.compiled.as_ref()
    }

    /// The compiled plan, shareable independently of the mapper
    pub fn mapping(&self) -> Option<Arc<CompiledMapping>> {
        self.compiled.as_ref().map(|state| Arc::clone(&state.mapping))
    }

    /// Validate `definition` against both schemas and keep the compiled plan
    ///
    /// On failure the previously compiled plan, if any, is left untouched.
    pub fn compile(
        &mut self,
        definition: &Value,
        input_schema: &Value,
        output_schema: &Value,
    ) -> Result<()> {
        let definition = MappingDefinition::from_value(definition)?;
        let input_schema = SchemaFragment::from_value("input schema", input_schema)?;
        let output_schema = SchemaFragment::from_value("output schema", output_schema)?;
        self.compile_parsed(definition, input_schema, output_schema)
    }

    /// Same as [`Mapper::compile`] for already parsed arguments
    pub fn compile_parsed(
        &mut self,
        definition: MappingDefinition,
        input_schema: SchemaFragment,
        output_schema: SchemaFragment,
    ) -> Result<()> {
        if self.config.validate {
            debug!("validate flag set; data is not checked against schemas");
        }

        let compiler = Compiler::new(self.function_resolver.as_ref(), self.lookup_resolver.as_ref());
        let mapping = compiler.compile_definition(&definition, &input_schema, &output_schema)?;

        info!(
            fields = mapping.strategies.len(),
            nodes = mapping.node_count(),
            "mapping compiled"
        );

        self.compiled = Some(CompiledState {
            definition,
            input_schema,
            output_schema,
            mapping: Arc::new(mapping),
        });
        Ok(())
    }

    /// Apply the compiled plan to `data`
    pub fn apply_to(&self, data: &Value) -> Result<Value> {
        let state = self.compiled.as_ref().ok_or(Error::CompileRequired)?;
        state.mapping.apply(data, &self.config.origin)
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("config", &self.config)
            .field("compiled", &self.compiled.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Mapper`]
pub struct MapperBuilder {
    config: MapperConfig,
    function_resolver: Option<Arc<dyn Resolve>>,
    lookup_resolver: Option<Arc<dyn Resolve>>,
}

impl MapperBuilder {
    pub fn new() -> Self {
        Self {
            config: MapperConfig::default(),
            function_resolver: None,
            lookup_resolver: None,
        }
    }

    /// Replace the whole plain configuration
    pub fn config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the origin label
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.config.origin = origin.into();
        self
    }

    /// Set the reserved validate flag
    pub fn validate(mut self, validate: bool) -> Self {
        self.config.validate = validate;
        self
    }

    /// Set the resolver for named functions
    pub fn function_resolver(mut self, resolver: impl Resolve + 'static) -> Self {
        self.function_resolver = Some(Arc::new(resolver));
        self
    }

    /// Set the resolver for named lookup tables
    pub fn lookup_resolver(mut self, resolver: impl Resolve + 'static) -> Self {
        self.lookup_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn build(self) -> Mapper {
        Mapper {
            config: self.config,
            function_resolver: self.function_resolver.unwrap_or_else(unconfigured),
            lookup_resolver: self.lookup_resolver.unwrap_or_else(unconfigured),
            compiled: None,
        }
    }
}

fn unconfigured() -> Arc<dyn Resolve> {
    Arc::new(Unconfigured)
}

impl Default for MapperBuilder {
    fn default() -> Self {
        Self::new()
    }
}
