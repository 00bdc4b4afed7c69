//! Error types for the documentation engine

use thiserror::Error;

/// Result type for documentation operations
pub type Result<T> = std::result::Result<T, DocError>;

/// Documentation engine errors
#[derive(Error, Debug)]
pub enum DocError {
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Malformed schema for field '{field}': {detail}")]
    MalformedSchema { field: String, detail: String },

    #[error("Malformed resource definition '{name}': {detail}")]
    MalformedResource { name: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
