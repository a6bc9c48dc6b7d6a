//! Error types for the msgload pipeline.
//!
//! One error family per stage:
//!
//! - [`LoadError`] - reading and parsing the delimited sources
//! - [`CleanError`] - category schema inference and decoding
//! - [`StoreError`] - SQLite persistence
//! - [`PipelineError`] - top-level orchestration
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across stage boundaries.

use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while reading a delimited source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited text.
    #[error("Invalid delimited text: {0}")]
    Csv(#[from] csv::Error),

    /// File has no content beyond whitespace.
    #[error("'{0}' is empty")]
    EmptyFile(String),

    /// A required column is missing from a source.
    #[error("'{file}' has no '{column}' column")]
    MissingColumn { file: String, column: String },
}

// =============================================================================
// Clean Errors
// =============================================================================

/// Errors while decoding the categories column.
#[derive(Debug, Error)]
pub enum CleanError {
    /// The joined table has no encoded column to decode.
    #[error("Joined table has no '{0}' column")]
    MissingColumn(String),

    /// Nothing to infer category names from.
    #[error("No rows to infer category names from")]
    NoRows,

    /// Token without the `name-flag` shape.
    #[error("Row {row}: malformed category token '{token}'")]
    BadToken { row: usize, token: String },

    /// Row with a different number of tokens than the schema.
    #[error("Row {row}: expected {expected} category tokens, found {found}")]
    TokenCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Row naming a different category at some position.
    #[error("Row {row}: category {position} is '{found}', expected '{expected}'")]
    NameMismatch {
        row: usize,
        position: usize,
        expected: String,
        found: String,
    },

    /// Flag character that is not a decimal digit.
    #[error("Row {row}, category '{category}': flag '{value}' is not a digit")]
    BadFlag {
        row: usize,
        category: String,
        value: String,
    },
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors while persisting into SQLite.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Destination table already exists.
    #[error("Table '{0}' already exists in the database")]
    TableExists(String),

    /// SQLite failure (unwritable path, bad schema, ...).
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run`].
/// It wraps the per-stage errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading or joining a source failed.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Category decoding failed.
    #[error("Clean error: {0}")]
    Clean(#[from] CleanError),

    /// Writing to the database failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for clean operations.
pub type CleanResult<T> = Result<T, CleanError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
