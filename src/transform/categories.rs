//! Category schema inference and decoding.
//!
//! The `categories` column packs every label into one string:
//! `related-1;request-0;offer-0;...`. Each token names a category and
//! carries a single decimal digit as its final character. Decoding replaces
//! that column with one integer column per category.

use serde_json::Value;

use crate::error::{CleanError, CleanResult};
use crate::models::Table;

/// Name of the encoded column this module consumes.
pub const CATEGORIES_COLUMN: &str = "categories";

/// The ordered category names shared by every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySchema {
    names: Vec<String>,
}

impl CategorySchema {
    /// Infer the schema from a table's `categories` column.
    ///
    /// Names come from the first data row; every other row is then
    /// validated against them (same token count, same names, same order),
    /// so a layout mismatch fails here instead of producing misaligned
    /// columns downstream. Row numbers in errors are 1-based.
    pub fn infer(table: &Table) -> CleanResult<Self> {
        let column = table
            .column_index(CATEGORIES_COLUMN)
            .ok_or_else(|| CleanError::MissingColumn(CATEGORIES_COLUMN.to_string()))?;

        if table.is_empty() {
            return Err(CleanError::NoRows);
        }

        let names = split_tokens(&table.rows[0][column], 1)?
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect();

        let schema = Self { names };
        for (idx, row) in table.rows.iter().enumerate().skip(1) {
            schema.check_row(&row[column], idx + 1)?;
        }
        Ok(schema)
    }

    /// Validate one encoded cell against the schema.
    fn check_row(&self, cell: &Value, row: usize) -> CleanResult<()> {
        let tokens = split_tokens(cell, row)?;
        if tokens.len() != self.names.len() {
            return Err(CleanError::TokenCount {
                row,
                expected: self.names.len(),
                found: tokens.len(),
            });
        }
        for (position, ((name, _), expected)) in tokens.iter().zip(&self.names).enumerate() {
            if *name != expected.as_str() {
                return Err(CleanError::NameMismatch {
                    row,
                    position,
                    expected: expected.clone(),
                    found: (*name).to_string(),
                });
            }
        }
        Ok(())
    }

    /// Category names, in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if the schema has no categories.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Decode the `categories` column into one integer column per category.
///
/// Decoded columns are appended to each row in place, in schema order, and
/// the original encoded column is removed. Row order never changes, so
/// alignment with the rest of the row is positional by construction.
pub fn expand(table: &mut Table, schema: &CategorySchema) -> CleanResult<()> {
    let column = table
        .column_index(CATEGORIES_COLUMN)
        .ok_or_else(|| CleanError::MissingColumn(CATEGORIES_COLUMN.to_string()))?;

    let mut decoded: Vec<Vec<Value>> = (0..schema.len())
        .map(|_| Vec::with_capacity(table.len()))
        .collect();

    for (idx, row) in table.rows.iter().enumerate() {
        let tokens = split_tokens(&row[column], idx + 1)?;
        if tokens.len() != schema.len() {
            return Err(CleanError::TokenCount {
                row: idx + 1,
                expected: schema.len(),
                found: tokens.len(),
            });
        }
        for (position, &(_, flag)) in tokens.iter().enumerate() {
            let digit = flag.to_digit(10).ok_or_else(|| CleanError::BadFlag {
                row: idx + 1,
                category: schema.names()[position].clone(),
                value: flag.to_string(),
            })?;
            decoded[position].push(Value::from(i64::from(digit)));
        }
    }

    table.drop_column(column);
    table.append_columns(schema.names().to_vec(), decoded);
    Ok(())
}

/// Split one encoded cell into `(name, flag)` tokens.
///
/// The flag is the token's final character; whether it is a digit is
/// checked at decode time, not here.
fn split_tokens(cell: &Value, row: usize) -> CleanResult<Vec<(&str, char)>> {
    let Some(text) = cell.as_str() else {
        return Err(CleanError::BadToken {
            row,
            token: cell.to_string(),
        });
    };

    text.split(';')
        .map(|token| {
            let bad = || CleanError::BadToken {
                row,
                token: token.to_string(),
            };
            let (name, flag) = token.rsplit_once('-').ok_or_else(bad)?;
            if name.is_empty() {
                return Err(bad());
            }
            let flag = flag.chars().last().ok_or_else(bad)?;
            Ok((name, flag))
        })
        .collect()
}
