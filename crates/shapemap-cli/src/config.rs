//! Configuration management for the CLI
//!
//! Configuration is layered, later layers winning:
//! - Default values
//! - A configuration file (TOML, YAML or JSON, chosen by extension)
//! - Environment variables
//! - Command-line arguments

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use shapemap_core::{LookupTables, MapperConfig};
use std::path::Path;
use tracing::debug;

/// Environment variable overriding the origin label
pub const ORIGIN_ENV: &str = "SHAPEMAP_ORIGIN";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mapper settings (origin label, validate flag)
    pub mapper: MapperConfig,

    /// Named lookup tables available to definitions
    pub lookups: LookupTables,

    /// Logging settings
    pub logging: LoggingSection,
}

/// Logging settings from the configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

impl Config {
    /// Load configuration from a file, choosing the parser by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => toml::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?,
        };

        debug!(path = %path.display(), "configuration file loaded");
        Ok(config)
    }

    /// Load defaults, then the optional file, then environment overrides
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.merge_with_env();
        Ok(config)
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        self.override_origin(std::env::var(ORIGIN_ENV).ok());
    }

    fn override_origin(&mut self, origin: Option<String>) {
        if let Some(origin) = origin.filter(|o| !o.is_empty()) {
            self.mapper.origin = origin;
        }
    }

    /// Mapper configuration with an optional command-line origin applied
    pub fn mapper_config(&self, origin: Option<&str>) -> MapperConfig {
        let mut mapper = self.mapper.clone();
        if let Some(origin) = origin {
            mapper.origin = origin.to_string();
        }
        mapper
    }
}
