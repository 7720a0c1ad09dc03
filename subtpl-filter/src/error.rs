//! Error types for filtering and catalog validation

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Catalog validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid filter pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Cycle detected in group references: {path}")]
    CycleDetected { path: String },

    #[error("Region name must not be empty (entry #{index})")]
    EmptyRegionName { index: usize },

    #[error("Duplicate region name: {name}")]
    DuplicateRegion { name: String },

    #[error("Invalid region filter in {region}: {pattern}")]
    InvalidPattern { region: String, pattern: String },
}
