//! Shared utilities for command handlers

use crate::cli::MappingArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use serde_json::Value;
use shapemap_core::{FunctionRegistry, Mapper};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Whether a path names a YAML document
pub fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false)
}

/// Read a JSON or YAML document, choosing the parser by extension
pub fn load_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = content.len(), "document read");

    if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "YAML".to_string(),
            message: e.to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
            message: e.to_string(),
        })
    }
}

/// Build a mapper from the configuration and compile the given documents
///
/// Functions resolve through the built-in registry, named lookups through
/// the configuration's lookup tables.
pub fn compile_mapper(args: &MappingArgs, config: &Config, origin: Option<&str>) -> Result<Mapper> {
    let definition = load_document(&args.definition)?;
    let input_schema = load_document(&args.input_schema)?;
    let output_schema = load_document(&args.output_schema)?;

    let mut mapper = Mapper::builder()
        .config(config.mapper_config(origin))
        .function_resolver(FunctionRegistry::with_builtins())
        .lookup_resolver(config.lookups.clone())
        .build();

    let _timer = Timer::with_details("compile", &args.definition.display().to_string());
    mapper.compile(&definition, &input_schema, &output_schema)?;
    Ok(mapper)
}
