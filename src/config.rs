//! Configuration for the documentation generators
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (resdoc.toml)
//! - Environment variables (RESDOC_*)
//!
//! ## Example config file (resdoc.toml):
//! ```toml
//! [output]
//! directory = "./docs"
//! rst_filename = "api.rst"
//! diagram_format = "dot"
//!
//! [api]
//! item_cache = 120
//! id_field = "_id"
//! login_resource = "accounts"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for documentation output
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocConfig {
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// API-level documentation settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory documentation files are written to
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// Filename of the endpoint documentation
    #[serde(default = "default_rst_filename")]
    pub rst_filename: String,

    /// Filename of the class diagram (without extension)
    #[serde(default = "default_diagram_filename")]
    pub diagram_filename: String,

    /// Diagram output format (dot or svg)
    #[serde(default)]
    pub diagram_format: DiagramFormat,
}

/// Diagram output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagramFormat {
    #[default]
    Dot,
    Svg,
}

/// API-level settings shown in endpoint documentation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Cache max-age for item endpoints, in seconds
    #[serde(default = "default_item_cache")]
    pub item_cache: u32,

    /// Name of the identifier field
    #[serde(default = "default_id_field")]
    pub id_field: String,

    /// Name of the last-updated timestamp field
    #[serde(default = "default_last_updated")]
    pub last_updated: String,

    /// Name of the creation timestamp field
    #[serde(default = "default_date_created")]
    pub date_created: String,

    /// Name of the per-document metadata field
    #[serde(default = "default_meta_field")]
    pub meta_field: String,

    /// Whether endpoint URLs carry a database prefix segment
    #[serde(default = "default_true")]
    pub database_prefix: bool,

    /// Resource whose section also documents a POST /login endpoint
    #[serde(default)]
    pub login_resource: Option<String>,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_rst_filename() -> String {
    "api.rst".to_string()
}

fn default_diagram_filename() -> String {
    "diagram".to_string()
}

fn default_item_cache() -> u32 {
    120
}

fn default_id_field() -> String {
    "_id".to_string()
}

fn default_last_updated() -> String {
    "_updated".to_string()
}

fn default_date_created() -> String {
    "_created".to_string()
}

fn default_meta_field() -> String {
    "_m".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            rst_filename: default_rst_filename(),
            diagram_filename: default_diagram_filename(),
            diagram_format: DiagramFormat::Dot,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            item_cache: default_item_cache(),
            id_field: default_id_field(),
            last_updated: default_last_updated(),
            date_created: default_date_created(),
            meta_field: default_meta_field(),
            database_prefix: true,
            login_resource: None,
        }
    }
}

impl DocConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["resdoc.toml", ".resdoc.toml", "config/resdoc.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("RESDOC")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
