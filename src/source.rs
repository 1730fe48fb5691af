//! Delimited text record source.
//!
//! Import files are semicolon-separated, single-quote-enclosed, with the
//! first row naming the columns. Every data row becomes a [`ContentRecord`]
//! keyed by those column names. The whole file is decoded up front so a
//! malformed row aborts the run before anything is written.

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashSet;
use std::path::Path;

pub const DELIMITER: u8 = b';';
pub const ENCLOSURE: u8 = b'\'';

/// One decoded data row: column name to value, in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    fields: Vec<(String, String)>,
}

impl ContentRecord {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Value of the named column, if the header has it.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Decode every data row of the file at `path`.
pub fn read_records(path: &Path) -> Result<Vec<ContentRecord>> {
    let content = std::fs::read(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;

    parse_records(&content)
        .with_context(|| format!("Failed to decode import file: {}", path.display()))
}

/// Decode records from raw file bytes.
pub fn parse_records(content: &[u8]) -> Result<Vec<ContentRecord>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .quote(ENCLOSURE)
        .has_headers(true)
        .from_reader(content);

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut seen = HashSet::new();
    for name in &headers {
        if !seen.insert(name.as_str()) {
            bail!("Duplicate column '{}' in header row", name);
        }
    }

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row: StringRecord =
            result.with_context(|| format!("Failed to decode row {}", index + 1))?;
        let fields = headers
            .iter()
            .cloned()
            .zip(row.iter().map(str::to_string))
            .collect();
        records.push(ContentRecord::new(fields));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_semicolon_separated_rows_by_header() {
        let input = b"identifier;locale;title;content\nwelcome;de_DE;Welcome;Hello\n";
        let records = parse_records(input).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("identifier"), Some("welcome"));
        assert_eq!(records[0].get("locale"), Some("de_DE"));
        assert_eq!(records[0].get("title"), Some("Welcome"));
        assert_eq!(records[0].get("content"), Some("Hello"));
        assert_eq!(records[0].get("missing"), None);
    }

    #[test]
    fn single_quotes_enclose_delimiters_and_markup() {
        let input = b"identifier;content\nfooter;'<p class=\"a\">x; y</p>'\n";
        let records = parse_records(input).unwrap();

        assert_eq!(records[0].get("content"), Some("<p class=\"a\">x; y</p>"));
    }

    #[test]
    fn header_only_file_yields_no_records() {
        let records = parse_records(b"identifier;locale;title;content\n").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn ragged_row_is_a_decode_error() {
        let input = b"identifier;locale;title;content\nwelcome;de_DE\n";
        let err = parse_records(input).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to decode row 1"));
    }

    #[test]
    fn duplicate_header_column_is_rejected() {
        let input = b"identifier;locale;title;title;content\nwelcome;de_DE;A;B;Hello\n";
        let err = parse_records(input).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate column 'title' in header row");
    }

    #[test]
    fn invalid_utf8_row_is_a_decode_error() {
        let input = b"identifier;locale;title;content\nwelcome;de_DE;Caf\xff;Hello\n";
        let err = parse_records(input).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to decode row 1"));
    }

    #[test]
    fn invalid_utf8_file_is_reported_with_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("blocks.csv");
        std::fs::write(
            &path,
            b"identifier;locale;title;content\nwelcome;de_DE;\xff;Hello\n",
        )
        .unwrap();

        let err = read_records(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to decode import file: "));
        assert!(err.to_string().contains("blocks.csv"));
        assert!(format!("{:#}", err).contains("Failed to decode row 1"));
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = read_records(Path::new("/nonexistent/import.csv")).unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to read import file: /nonexistent/import.csv"));
    }
}
