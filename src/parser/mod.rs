//! Delimited-text parsing with encoding and delimiter auto-detection.
//!
//! Turns a CSV-like file into a [`Table`]. No category-specific logic here.

use std::path::Path;

use serde_json::Value;

use crate::error::{LoadError, LoadResult};
use crate::models::{Row, Table};

/// Result of parsing one source, with detection metadata.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The parsed table.
    pub table: Table,
    /// Detected encoding.
    pub encoding: String,
    /// Detected or supplied delimiter.
    pub delimiter: char,
}

/// Detect the text encoding of raw bytes.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode raw bytes into a string using the detected encoding.
///
/// Unknown encodings fall back to lossy UTF-8.
pub fn decode_bytes(bytes: &[u8], encoding: &str) -> String {
    match encoding {
        "iso-8859-1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Pick the delimiter by counting candidates in the header line.
///
/// Only the header line is inspected: data rows of the categories source
/// legitimately contain semicolons inside the encoded field.
pub fn detect_delimiter(content: &str) -> char {
    let header = content.lines().next().unwrap_or("");

    let candidates = [',', ';', '\t', '|'];
    let mut best = ',';
    let mut best_count = 0;

    for &sep in &candidates {
        let count = header.matches(sep).count();
        if count > best_count {
            best_count = count;
            best = sep;
        }
    }

    best
}

/// Coerce one raw field into a typed cell.
///
/// Empty fields become null, integer- and float-looking fields become
/// numbers, everything else stays text.
fn coerce_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        // NaN and infinities have no JSON form; keep them as text.
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}

/// Parse a delimited file into a table, auto-detecting encoding and
/// delimiter. Pass `Some(delimiter)` to skip delimiter detection.
pub fn read_table(path: &Path, delimiter: Option<char>) -> LoadResult<ParseResult> {
    let bytes = std::fs::read(path)?;
    let encoding = detect_encoding(&bytes);
    let content = decode_bytes(&bytes, &encoding);

    if content.trim().is_empty() {
        return Err(LoadError::EmptyFile(path.display().to_string()));
    }

    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let table = parse_str(&content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Parse delimited text with an explicit delimiter.
///
/// The first record is the header row; rows with a different field count
/// than the header are a parse error.
pub fn parse_str(content: &str, delimiter: char) -> LoadResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows: Vec<Row> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(coerce_cell).collect());
    }

    Ok(Table::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_simple() {
        let table = parse_str("id,message\n1,help\n2,ok", ',').unwrap();
        assert_eq!(table.headers, vec!["id", "message"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], vec![json!(1), json!("help")]);
        assert_eq!(table.rows[1], vec![json!(2), json!("ok")]);
    }

    #[test]
    fn test_cell_coercion() {
        let table = parse_str("a,b,c,d\n42,3.5,,text", ',').unwrap();
        assert_eq!(table.rows[0][0], json!(42));
        assert_eq!(table.rows[0][1], json!(3.5));
        assert_eq!(table.rows[0][2], Value::Null);
        assert_eq!(table.rows[0][3], json!("text"));
    }

    #[test]
    fn test_nan_stays_text() {
        let table = parse_str("a\nNaN", ',').unwrap();
        assert_eq!(table.rows[0][0], json!("NaN"));
    }

    #[test]
    fn test_quoted_field_keeps_delimiter() {
        let table = parse_str("id,message\n1,\"hello, world\"", ',').unwrap();
        assert_eq!(table.rows[0][1], json!("hello, world"));
    }

    #[test]
    fn test_ragged_row_is_error() {
        let result = parse_str("a,b\n1", ',');
        assert!(matches!(result, Err(LoadError::Csv(_))));
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("id,categories\n1,related-1;offer-0"), ',');
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
    }

    #[test]
    fn test_detect_delimiter_pipe() {
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_detect_delimiter_single_column() {
        assert_eq!(detect_delimiter("id\n1\n2"), ',');
    }

    #[test]
    fn test_detect_encoding_ascii_is_utf8() {
        assert_eq!(detect_encoding(b"id,message\n1,help"), "utf-8");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_bytes(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_read_table_missing_file() {
        let result = read_table(Path::new("/nonexistent/messages.csv"), None);
        assert!(matches!(result, Err(LoadError::Io(_))));
    }

    #[test]
    fn test_read_table_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::File::create(&path).unwrap();

        let result = read_table(&path, None);
        assert!(matches!(result, Err(LoadError::EmptyFile(_))));
    }

    #[test]
    fn test_read_table_auto() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "id;name").unwrap();
        writeln!(f, "1;Alice").unwrap();
        drop(f);

        let parsed = read_table(&path, None).unwrap();
        assert_eq!(parsed.delimiter, ';');
        assert_eq!(parsed.encoding, "utf-8");
        assert_eq!(parsed.table.rows[0], vec![json!(1), json!("Alice")]);
    }
}
