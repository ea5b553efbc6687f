//! Error types for MathQuest core

use thiserror::Error;

/// Token parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Unknown grade tag: {0}")]
    UnknownGradeTag(String),

    #[error("Unknown difficulty tier: {0}")]
    UnknownTier(String),
}

/// Level catalog loading and validation errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),

    #[error("Level {0} not found")]
    LevelNotFound(u32),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias
pub type CoreResult<T> = Result<T, CoreError>;
