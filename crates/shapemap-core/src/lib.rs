//! Shapemap Core - declarative, schema-aware object mapping
//!
//! This crate turns a compact mapping definition into an immutable executable
//! plan, checked against an input schema and an output schema, and applies
//! that plan to JSON values.
//!
//! # Main Components
//!
//! - **Definitions**: [`MappingDefinition`] and [`FieldSpec`], parsed once from JSON
//! - **Compiler**: [`Compiler`] resolves field specs into a [`CompiledMapping`]
//! - **Applicator**: [`apply_mapping`] walks a compiled mapping over input data
//! - **Mapper**: [`Mapper`] ties configuration, resolvers, compile and apply together
//! - **Transforms**: [`Transform`] callables, resolved through [`Resolve`]
//!   implementations such as [`FunctionRegistry`] and [`LookupTables`]
//!
//! # Example
//!
//! ```
//! use shapemap_core::{FunctionRegistry, Mapper, Result};
//! use serde_json::json;
//!
//! fn example() -> Result<()> {
//!     let mut mapper = Mapper::builder()
//!         .origin("example")
//!         .function_resolver(FunctionRegistry::with_builtins())
//!         .build();
//!
//!     mapper.compile(
//!         &json!({
//!             "name": { "source": "name" },
//!             "tags": { "$nested": [{ "$constant": { "kind": "first" }, "value": { "source": "name" } }] }
//!         }),
//!         &json!({ "properties": { "name": { "type": "string" } } }),
//!         &json!({ "properties": {
//!             "name": { "type": "string" },
//!             "tags": { "type": "array", "items": { "properties": { "value": { "type": "string" } } } }
//!         } }),
//!     )?;
//!
//!     let output = mapper.apply_to(&json!({ "name": " Foo " }))?;
//!     assert_eq!(output, json!({
//!         "name": "Foo",
//!         "tags": [{ "value": "Foo", "kind": "first", "dataOrigin": "example" }]
//!     }));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

pub mod apply;
pub mod compiled;
pub mod compiler;
pub mod definition;
pub mod error;
pub mod mapper;
pub mod schema;
pub mod transform;

// Re-export main types for convenience
pub use apply::{apply_mapping, apply_strategy, is_suppressed, DATA_ORIGIN_KEY};
pub use compiled::{CompiledMapping, SourceBinding, Strategy, StrategyKind, StrategyNode};
pub use compiler::Compiler;
pub use definition::{FieldSpec, LookupSpec, MappingDefinition, NestedSpec};
pub use error::{Error, Phase, ResolverKind, Result};
pub use mapper::{CompiledState, Mapper, MapperBuilder, MapperConfig, DEFAULT_ORIGIN};
pub use schema::{SchemaFragment, SchemaType};
pub use transform::{lookup_table, FunctionRegistry, LookupTables, Resolve, Transform};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
