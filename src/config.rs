//! Configuration management for the datamodel tools
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (datamodel.toml)
//! - Environment variables (DATAMODEL__*)
//!
//! ## Example config file (datamodel.toml):
//! ```toml
//! [import]
//! validate = true
//!
//! [export]
//! output_format = "pretty"
//! validate = true
//!
//! [render]
//! indent = 2
//!
//! [check]
//! extension = "avsc"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::render::DEFAULT_INDENT;

/// Main configuration for the datamodel tools
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub check: CheckConfig,
}

/// Import settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Validate input documents with apache-avro before importing
    #[serde(default = "default_true")]
    pub validate: bool,
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Validate exported documents with apache-avro
    #[serde(default = "default_true")]
    pub validate: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    pub fn write(&self, value: &serde_json::Value) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

/// Rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Spaces per nesting level
    #[serde(default = "default_indent")]
    pub indent: usize,
}

/// Settings of the `check` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Extension of the schema files to scan
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_true() -> bool {
    true
}

fn default_indent() -> usize {
    DEFAULT_INDENT
}

fn default_extension() -> String {
    "avsc".to_string()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self { validate: true }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::default(),
            validate: true,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
        }
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

impl ModelConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for location in ["datamodel.toml", ".datamodel.toml", "config/datamodel.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "familiar", "datamodel") {
            let xdg_config = dirs.config_dir().join("datamodel.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // DATAMODEL__EXPORT__OUTPUT_FORMAT=compact
        builder = builder.add_source(
            Environment::with_prefix("DATAMODEL")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
