//! Tabular data structures shared by all pipeline stages.
//!
//! [`Table`] is the single in-memory representation: an ordered header list
//! plus rows of dynamically typed cells. Cells are [`serde_json::Value`]s so
//! a column can hold nulls, integers, floats, or text without declaring a
//! schema up front.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

/// One parsed row: one cell per header, in header order.
pub type Row = Vec<Value>;

/// An in-memory table with named, ordered columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column names, in file order.
    pub headers: Vec<String>,
    /// Data rows. Every row has `headers.len()` cells.
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a table from headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Inner join with `other` on the named key column.
    ///
    /// Output columns are all of `self`'s followed by all of `other`'s
    /// except the key, which is kept once. Rows whose key appears on only
    /// one side are dropped. `self`'s row order is preserved, and a key
    /// matching several rows of `other` yields one output row per match.
    ///
    /// Returns `None` if either side lacks the key column.
    pub fn inner_join(&self, other: &Table, key: &str) -> Option<Table> {
        let left_key = self.column_index(key)?;
        let right_key = other.column_index(key)?;

        // Index the right side: key cell -> row positions, in row order.
        let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in other.rows.iter().enumerate() {
            by_key
                .entry(row[right_key].to_string())
                .or_default()
                .push(i);
        }

        let mut headers = self.headers.clone();
        headers.extend(
            other
                .headers
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != right_key)
                .map(|(_, h)| h.clone()),
        );

        let mut rows = Vec::new();
        for row in &self.rows {
            let Some(matches) = by_key.get(&row[left_key].to_string()) else {
                continue;
            };
            for &j in matches {
                let mut joined = row.clone();
                joined.extend(
                    other.rows[j]
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != right_key)
                        .map(|(_, cell)| cell.clone()),
                );
                rows.push(joined);
            }
        }

        Some(Table { headers, rows })
    }

    /// Remove the column at `index` from the headers and every row.
    pub fn drop_column(&mut self, index: usize) {
        self.headers.remove(index);
        for row in &mut self.rows {
            row.remove(index);
        }
    }

    /// Append new columns, aligned by row position.
    ///
    /// `columns[i]` must hold one cell per existing row.
    pub fn append_columns(&mut self, names: Vec<String>, columns: Vec<Vec<Value>>) {
        debug_assert_eq!(names.len(), columns.len());
        self.headers.extend(names);
        for (i, row) in self.rows.iter_mut().enumerate() {
            for column in &columns {
                row.push(column[i].clone());
            }
        }
    }

    /// Drop rows that are fully identical to an earlier row.
    ///
    /// First occurrence wins and surviving rows keep their relative order.
    /// Returns the number of rows removed.
    pub fn dedup_rows(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = HashSet::new();
        self.rows.retain(|row| {
            // Cells render as JSON, so the separator cannot collide.
            let key = row
                .iter()
                .map(|cell| cell.to_string())
                .collect::<Vec<_>>()
                .join("\u{1f}");
            seen.insert(key)
        });
        before - self.rows.len()
    }
}
