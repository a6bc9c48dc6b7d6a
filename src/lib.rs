//! # msgload - categorized message ETL
//!
//! msgload loads a message dataset and its encoded category labels, joins
//! them on `id`, expands the encoding into one integer column per category,
//! drops duplicate rows, and writes the result into a SQLite table.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐     ┌─────────────┐     ┌───────────────┐     ┌─────────────┐
//! │ messages.csv   │────▶│   Parser    │────▶│   Transform   │────▶│   SQLite    │
//! │ categories.csv │     │ (auto-enc)  │     │ (decode+dedup)│     │   table     │
//! └────────────────┘     └─────────────┘     └───────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use msgload::{run, RunOptions};
//!
//! let summary = run(
//!     Path::new("messages.csv"),
//!     Path::new("categories.csv"),
//!     Path::new("messages.db"),
//!     &RunOptions::default(),
//! )?;
//! println!("Wrote {} rows", summary.rows_written);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - per-stage error types
//! - [`models`] - the in-memory [`Table`]
//! - [`parser`] - delimited-text parsing with auto-detection
//! - [`transform`] - category decoding and pipeline orchestration
//! - [`store`] - SQLite persistence

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Persistence
pub mod store;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{CleanError, LoadError, PipelineError, StoreError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Row, Table};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{detect_delimiter, detect_encoding, read_table, ParseResult};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    clean_data, load_data, run, save_data, CategorySchema, RunOptions, RunSummary,
    CATEGORIES_COLUMN, JOIN_COLUMN,
};

// =============================================================================
// Re-exports - Store
// =============================================================================

pub use store::{save_table, IfExists};
