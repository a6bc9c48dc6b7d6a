//! SQLite persistence for cleaned tables.
//!
//! Writes a [`Table`] as a named SQLite table. Column types are derived
//! from the cells (INTEGER / REAL / TEXT) and all rows are inserted under
//! a single transaction, so a failed run leaves no partial table behind.

use std::path::Path;

use clap::ValueEnum;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::models::Table;

/// Policy for a destination table that already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IfExists {
    /// Refuse to write; the existing table is left untouched.
    #[default]
    Fail,
    /// Drop the existing table and write a fresh one.
    Replace,
    /// Insert into the existing table.
    Append,
}

/// Save a table into the database at `path` under `name`.
///
/// Returns the number of rows written.
pub fn save_table(
    table: &Table,
    path: &Path,
    name: &str,
    if_exists: IfExists,
) -> StoreResult<usize> {
    let mut conn = Connection::open(path)?;
    let tx = conn.transaction()?;

    let exists = table_exists(&tx, name)?;
    if exists {
        match if_exists {
            IfExists::Fail => return Err(StoreError::TableExists(name.to_string())),
            IfExists::Replace => {
                tx.execute(&format!("DROP TABLE {}", quote_ident(name)), [])?;
            }
            IfExists::Append => {}
        }
    }

    if !exists || if_exists == IfExists::Replace {
        tx.execute(&create_table_sql(table, name), [])?;
    }

    let insert = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(name),
        table
            .headers
            .iter()
            .map(|h| quote_ident(h))
            .collect::<Vec<_>>()
            .join(", "),
        vec!["?"; table.headers.len()].join(", "),
    );
    {
        let mut stmt = tx.prepare(&insert)?;
        for row in &table.rows {
            stmt.execute(rusqlite::params_from_iter(row.iter().map(to_sql_value)))?;
        }
    }

    tx.commit()?;
    Ok(table.rows.len())
}

/// Check `sqlite_master` for a table of the given name.
fn table_exists(conn: &Connection, name: &str) -> StoreResult<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Quote an identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Affinity {
    Integer,
    Real,
    Text,
}

impl Affinity {
    fn sql(self) -> &'static str {
        match self {
            Affinity::Integer => "INTEGER",
            Affinity::Real => "REAL",
            Affinity::Text => "TEXT",
        }
    }
}

/// Derive a column's type from its cells: INTEGER if every non-null cell is
/// an integer, REAL if numeric with at least one float, TEXT otherwise
/// (including all-null columns).
fn column_affinity(table: &Table, column: usize) -> Affinity {
    let mut affinity = Affinity::Integer;
    let mut saw_value = false;
    for row in &table.rows {
        match &row[column] {
            Value::Null => {}
            Value::Number(n) if n.is_i64() => saw_value = true,
            Value::Number(_) => {
                saw_value = true;
                affinity = Affinity::Real;
            }
            _ => return Affinity::Text,
        }
    }
    if saw_value {
        affinity
    } else {
        Affinity::Text
    }
}

fn create_table_sql(table: &Table, name: &str) -> String {
    let columns: Vec<String> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{} {}", quote_ident(h), column_affinity(table, i).sql()))
        .collect();
    format!("CREATE TABLE {} ({})", quote_ident(name), columns.join(", "))
}

/// Map a cell to a SQLite value.
fn to_sql_value(cell: &Value) -> rusqlite::types::Value {
    match cell {
        Value::Null => rusqlite::types::Value::Null,
        Value::Number(n) if n.is_i64() => {
            rusqlite::types::Value::Integer(n.as_i64().unwrap_or_default())
        }
        Value::Number(n) => rusqlite::types::Value::Real(n.as_f64().unwrap_or_default()),
        Value::String(s) => rusqlite::types::Value::Text(s.clone()),
        Value::Bool(b) => rusqlite::types::Value::Integer(i64::from(*b)),
        other => rusqlite::types::Value::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Table {
        Table::new(
            vec!["id".into(), "message".into(), "score".into()],
            vec![
                vec![json!(1), json!("help"), json!(0.5)],
                vec![json!(2), json!("ok"), json!(1)],
            ],
        )
    }

    #[test]
    fn test_save_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("out.db");

        let written = save_table(&sample(), &db, "messages", IfExists::Fail).unwrap();
        assert_eq!(written, 2);

        let conn = Connection::open(&db).unwrap();
        let (id, message, score): (i64, String, f64) = conn
            .query_row(
                "SELECT id, message, score FROM messages WHERE id = 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(message, "help");
        assert!((score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_conflict_leaves_existing_table_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("out.db");

        save_table(&sample(), &db, "messages", IfExists::Fail).unwrap();

        let other = Table::new(vec!["x".into()], vec![vec![json!(9)]]);
        let err = save_table(&other, &db, "messages", IfExists::Fail).unwrap_err();
        assert!(matches!(err, StoreError::TableExists(_)));

        let conn = Connection::open(&db).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_append_creates_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("out.db");

        save_table(&sample(), &db, "messages", IfExists::Append).unwrap();
        save_table(&sample(), &db, "messages", IfExists::Append).unwrap();

        let conn = Connection::open(&db).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_column_affinity() {
        let t = Table::new(
            vec!["i".into(), "r".into(), "t".into(), "n".into()],
            vec![
                vec![json!(1), json!(1), json!("a"), Value::Null],
                vec![json!(2), json!(2.5), json!(3), Value::Null],
            ],
        );
        assert_eq!(column_affinity(&t, 0), Affinity::Integer);
        assert_eq!(column_affinity(&t, 1), Affinity::Real);
        assert_eq!(column_affinity(&t, 2), Affinity::Text);
        assert_eq!(column_affinity(&t, 3), Affinity::Text);
    }

    #[test]
    fn test_create_table_sql_quotes_identifiers() {
        let t = Table::new(vec!["select".into()], vec![vec![json!(1)]]);
        let sql = create_table_sql(&t, "messages");
        assert_eq!(sql, "CREATE TABLE \"messages\" (\"select\" INTEGER)");
    }

    #[test]
    fn test_quote_ident_doubles_quotes() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_nulls_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("out.db");

        let t = Table::new(
            vec!["id".into(), "note".into()],
            vec![
                vec![json!(1), Value::Null],
                vec![json!(2), json!("hi")],
            ],
        );
        save_table(&t, &db, "notes", IfExists::Fail).unwrap();

        let conn = Connection::open(&db).unwrap();
        let note: Option<String> = conn
            .query_row("SELECT note FROM notes WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert!(note.is_none());
    }
}
