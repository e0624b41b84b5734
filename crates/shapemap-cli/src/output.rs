//! Output formatting and writing utilities
//!
//! This module formats mapped records and compiled strategy trees as
//! human-readable text, JSON or YAML.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use serde::Serialize;
use shapemap_core::{CompiledMapping, Strategy, StrategyKind};
use std::io::{self, Write};
use tracing::trace;

/// Trait for formatting serializable values in an output format
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a compiled strategy tree
    fn format_strategy_tree(&self, tree: &[TreeNode], use_color: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty | OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }

    fn format_strategy_tree(&self, tree: &[TreeNode], use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_strategy_tree_human(tree, use_color)),
            _ => self.format(&tree),
        }
    }
}

/// Serializable view of one compiled node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub target: String,
    pub strategy: StrategyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    /// Constant field names of each nested level
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<Vec<String>>,
    /// Child nodes of each nested level
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<Vec<TreeNode>>,
}

/// Build the serializable view of a compiled mapping level
pub fn strategy_tree(mapping: &CompiledMapping) -> Vec<TreeNode> {
    mapping
        .strategies
        .iter()
        .map(|node| {
            let children: Vec<&CompiledMapping> = match &node.strategy {
                Strategy::NestedObject(child) => vec![child],
                Strategy::NestedArray(children) => children.iter().collect(),
                _ => Vec::new(),
            };
            TreeNode {
                target: node.target_name.clone(),
                strategy: node.kind(),
                source: node.source_name().map(str::to_string),
                transform: node.transform().map(|t| t.name().to_string()),
                constants: children
                    .iter()
                    .map(|child| child.constants.keys().cloned().collect())
                    .collect(),
                levels: children.into_iter().map(strategy_tree).collect(),
            }
        })
        .collect()
}

fn format_strategy_tree_human(tree: &[TreeNode], use_color: bool) -> String {
    let mut lines = Vec::new();
    push_level(&mut lines, tree, 0, use_color);
    lines.join("\n")
}

fn push_level(lines: &mut Vec<String>, nodes: &[TreeNode], depth: usize, use_color: bool) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        let target = if use_color {
            node.target.bold().to_string()
        } else {
            node.target.clone()
        };
        let strategy = if use_color {
            node.strategy.to_string().cyan().to_string()
        } else {
            node.strategy.to_string()
        };

        let mut line = format!("{}{} [{}]", indent, target, strategy);
        if let Some(source) = &node.source {
            line.push_str(&format!(" <- {}", source));
        }
        if let Some(transform) = &node.transform {
            line.push_str(&format!(" via {}", transform));
        }
        lines.push(line);

        let many = node.strategy == StrategyKind::NestedArray;
        for (index, level) in node.levels.iter().enumerate() {
            let constants = node.constants.get(index).filter(|c| !c.is_empty());
            if many || constants.is_some() {
                let mut header = format!("{}  ", indent);
                if many {
                    header.push_str(&format!("[{}]", index));
                }
                if let Some(constants) = constants {
                    if many {
                        header.push(' ');
                    }
                    header.push_str(&format!("constants: {}", constants.join(", ")));
                }
                lines.push(header);
            }
            let child_depth = if many { depth + 2 } else { depth + 1 };
            push_level(lines, level, child_depth, use_color);
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "writing data");
        self.writeln(formatted.trim_end())
    }

    /// Write a compiled strategy tree
    pub fn strategy_tree(&mut self, mapping: &CompiledMapping) -> Result<()> {
        let tree = strategy_tree(mapping);
        let formatted = self.format.format_strategy_tree(&tree, self.use_color)?;
        self.writeln(formatted.trim_end())
    }
}

#[cfg(test)]
mod tests;
