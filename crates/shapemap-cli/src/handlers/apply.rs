//! Apply command handler

use crate::cli::ApplyArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use serde_json::Value;
use shapemap_core::Mapper;
use std::path::Path;
use tracing::{debug, info, instrument};

use super::utils::{compile_mapper, load_document};

/// Handle the apply command
#[instrument(skip_all, fields(definition = %args.mapping.definition.display(), files = args.data.len()))]
pub fn handle_apply(args: ApplyArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::new("apply_command");
    output.info(&format!("Compiling {}", args.mapping.definition.display()))?;

    let mapper = compile_mapper(&args.mapping, config, args.origin.as_deref())?;
    info!(origin = mapper.origin(), "definition compiled");

    let mut records = 0;
    for path in &args.data {
        let mapped = map_file(&mapper, path)?;
        records += match &mapped {
            Value::Array(items) => items.len(),
            _ => 1,
        };

        output.section(&path.display().to_string())?;
        output.data(&mapped)?;
    }

    output.success(&format!("✓ Mapped {} record(s) from {} file(s)", records, args.data.len()))?;
    Ok(())
}

/// Map one data file; an array document is mapped element by element
pub fn map_file(mapper: &Mapper, path: &Path) -> Result<Value> {
    let _timer = Timer::with_details("map_file", &path.display().to_string());
    let document = load_document(path)?;

    match document {
        Value::Array(items) => {
            debug!(path = %path.display(), records = items.len(), "mapping record array");
            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    mapper.apply_to(item).map_err(|source| Error::Record {
                        path: path.to_path_buf(),
                        index,
                        source,
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        record => Ok(mapper.apply_to(&record)?),
    }
}
