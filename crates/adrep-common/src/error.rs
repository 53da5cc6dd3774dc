//! Error types for AdRep

use thiserror::Error;

/// Result type alias for AdRep operations
pub type Result<T> = std::result::Result<T, AdrepError>;

/// Main error type for AdRep
#[derive(Error, Debug)]
pub enum AdrepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Row format error at row {row}: {detail}")]
    RowFormat { row: u64, detail: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl AdrepError {
    /// True when the error identifies a malformed data row rather than a
    /// stream or setup problem.
    pub fn is_row_format(&self) -> bool {
        matches!(self, AdrepError::RowFormat { .. })
    }
}
