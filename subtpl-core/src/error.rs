//! Error types for template processing

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TemplateError>;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to parse template: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("Template root must be a mapping")]
    NotAMapping,

    #[error("Failed to serialize template: {0}")]
    Emit(#[source] serde_yaml::Error),

    #[error("Invalid proxy inventory: {0}")]
    Inventory(String),

    #[error("Failed to load config from {path}: {source}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] subtpl_filter::FilterError),
}
