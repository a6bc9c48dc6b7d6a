//! Stage orchestration: load, clean, save.
//!
//! The three stages mirror the program's contract: [`load_data`] reads and
//! joins the two sources, [`clean_data`] decodes the category encoding and
//! drops duplicate rows, [`save_data`] persists the result. [`run`] chains
//! them and reports a [`RunSummary`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CleanResult, LoadError, LoadResult, PipelineResult, StoreResult};
use crate::models::Table;
use crate::parser::{self, ParseResult};
use crate::store::{self, IfExists};
use crate::transform::categories::{self, CategorySchema};

/// Join key shared by the two sources.
pub const JOIN_COLUMN: &str = "id";

/// Options for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    /// Destination table name.
    pub table_name: String,

    /// What to do when the destination table already exists.
    pub if_exists: IfExists,

    /// Delimiter override; auto-detected per source when `None`.
    pub delimiter: Option<char>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            table_name: "messages".to_string(),
            if_exists: IfExists::Fail,
            delimiter: None,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Rows in the joined table before cleaning.
    pub rows_loaded: usize,
    /// Exact-duplicate rows removed.
    pub duplicates_removed: usize,
    /// Rows written to the database.
    pub rows_written: usize,
    /// Decoded category names, in column order.
    pub categories: Vec<String>,
}

/// Load both sources and inner-join them on [`JOIN_COLUMN`].
///
/// Rows whose id appears in only one source are dropped. That is a
/// deliberate policy: the label file decides which messages are usable.
pub fn load_data(
    messages_path: &Path,
    categories_path: &Path,
    delimiter: Option<char>,
) -> LoadResult<Table> {
    let messages = read_source(messages_path, delimiter)?;
    let categories = read_source(categories_path, delimiter)?;

    messages
        .table
        .inner_join(&categories.table, JOIN_COLUMN)
        // Unreachable: read_source checked the key on both sides.
        .ok_or_else(|| missing_join_column(messages_path))
}

/// Parse one source and check it carries the join column.
fn read_source(path: &Path, delimiter: Option<char>) -> LoadResult<ParseResult> {
    let parsed = parser::read_table(path, delimiter)?;
    if parsed.table.column_index(JOIN_COLUMN).is_none() {
        return Err(missing_join_column(path));
    }
    Ok(parsed)
}

fn missing_join_column(path: &Path) -> LoadError {
    LoadError::MissingColumn {
        file: path.display().to_string(),
        column: JOIN_COLUMN.to_string(),
    }
}

/// Decode the categories column and drop duplicate rows.
///
/// Returns the inferred schema and the number of duplicates removed.
pub fn clean_data(table: &mut Table) -> CleanResult<(CategorySchema, usize)> {
    let schema = CategorySchema::infer(table)?;
    categories::expand(table, &schema)?;
    let removed = table.dedup_rows();
    Ok((schema, removed))
}

/// Persist the cleaned table into the SQLite database.
pub fn save_data(
    table: &Table,
    database: &Path,
    name: &str,
    if_exists: IfExists,
) -> StoreResult<usize> {
    store::save_table(table, database, name, if_exists)
}

/// Run the whole pipeline: load, clean, save.
pub fn run(
    messages: &Path,
    categories: &Path,
    database: &Path,
    options: &RunOptions,
) -> PipelineResult<RunSummary> {
    let mut table = load_data(messages, categories, options.delimiter)?;
    let rows_loaded = table.len();

    let (schema, duplicates_removed) = clean_data(&mut table)?;

    let rows_written = save_data(&table, database, &options.table_name, options.if_exists)?;

    Ok(RunSummary {
        rows_loaded,
        duplicates_removed,
        rows_written,
        categories: schema.names().to_vec(),
    })
}
