//! Error types for the record matching engine.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`LoadError`] - Dataset loading and writing errors
//! - [`MergeError`] - Errors raised by the merge operations
//! - [`ConfigError`] - Configuration file and environment errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Loading Errors
// =============================================================================

/// Errors while reading or writing a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read or write a file.
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    /// Content could not be decoded with the detected encoding.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Invalid CSV content.
    #[error("Invalid CSV at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Invalid JSON content.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Valid input that the record model cannot represent.
    #[error("Unsupported input: {0}")]
    Unsupported(String),

    /// Input without a header row.
    #[error("Input is empty")]
    EmptyFile,
}

impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        LoadError::Parse {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Merge Errors
// =============================================================================

/// Errors raised by the merge operations.
///
/// Neither variant is retryable: the same call always fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// A caller-supplied argument is outside the accepted set.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The first records of both datasets carry different field sets.
    #[error("Schema mismatch: left has {left:?}, right has {right:?}")]
    SchemaMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading match options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for the options schema.
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An override has a value that cannot be interpreted.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::matching::pipeline::match_datasets`]
/// and by the CLI's match command, which loads both inputs and resolves
/// options before matching. It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Dataset loading error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Merge error.
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Both datasets are empty.
    #[error("No records to match")]
    EmptyInput,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
