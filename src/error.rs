// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read source {path}: {message}")]
    SourceRead { path: PathBuf, message: String },

    #[error("Enrichment lookup for {ip} failed: {message}")]
    EnrichmentLookup { ip: String, message: String },

    #[error("No indicators found in any source")]
    EmptyResult,

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PipelineError {
    pub fn source_read(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        PipelineError::SourceRead {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Fatal errors abort the run, everything else is isolated to one source or lookup.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PipelineError::SourceRead { .. } | PipelineError::EnrichmentLookup { .. }
        )
    }
}
