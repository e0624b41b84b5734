//! Check command handler

use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use tracing::{info, instrument};

use super::utils::compile_mapper;

/// Handle the check command
#[instrument(skip_all, fields(definition = %args.mapping.definition.display()))]
pub fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::new("check_command");
    output.info(&format!("Checking {}", args.mapping.definition.display()))?;

    let mapper = compile_mapper(&args.mapping, config, None)?;
    let mapping = mapper
        .mapping()
        .ok_or_else(|| Error::other("compile succeeded without a plan"))?;
    info!(nodes = mapping.node_count(), "definition is valid");

    output.success(&format!("✓ Definition is valid ({} node(s))", mapping.node_count()))?;
    output.section("Strategy tree")?;
    output.strategy_tree(&mapping)
}
