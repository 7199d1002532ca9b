//! Source formats and metadata of loaded tables.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dataset::Table;
use crate::error::{AnalysisError, Result};

/// Extensions of formats that need a dedicated decoder.
const UNSUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xls", "parquet", "sqlite", "db", "xml", "sql"];

/// Closed set of formats a table can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "delimiter", rename_all = "snake_case")]
pub enum SourceFormat {
    /// Delimited text with a header row.
    Delimited(u8),
    /// JSON array of flat objects, one per row.
    JsonRecords,
}

impl SourceFormat {
    /// Choose a format from the file name, falling back to sniffing the content.
    ///
    /// `explicit_delimiter` overrides delimiter detection for text sources.
    pub fn detect(name: &str, bytes: &[u8], explicit_delimiter: Option<u8>) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if UNSUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AnalysisError::UnsupportedFormat(format!(
                "'{name}': .{extension} files must be converted to CSV or JSON first"
            )));
        }

        let looks_like_json = bytes
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|&b| b == b'[');
        if extension == "json" || (extension.is_empty() && looks_like_json) {
            return Ok(SourceFormat::JsonRecords);
        }

        if let Some(delimiter) = explicit_delimiter {
            return Ok(SourceFormat::Delimited(delimiter));
        }
        match extension.as_str() {
            "tsv" | "tab" => Ok(SourceFormat::Delimited(b'\t')),
            "psv" => Ok(SourceFormat::Delimited(b'|')),
            _ => Ok(SourceFormat::Delimited(super::loader::detect_delimiter(bytes)?)),
        }
    }

    /// Short label used in metadata.
    pub fn label(&self) -> &'static str {
        match self {
            SourceFormat::Delimited(b'\t') => "tsv",
            SourceFormat::Delimited(b',') => "csv",
            SourceFormat::Delimited(b';') => "csv-semicolon",
            SourceFormat::Delimited(b'|') => "psv",
            SourceFormat::Delimited(_) => "delimited",
            SourceFormat::JsonRecords => "json",
        }
    }
}

/// Metadata about the source a table was loaded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Name of the resulting table.
    pub table: String,
    /// Path of the source file, when loaded from disk.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<PathBuf>,
    /// SHA-256 hash of the raw bytes.
    pub hash: String,
    pub size_bytes: u64,
    pub format: SourceFormat,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    pub column_count: usize,
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Describe a table that has just been loaded.
    pub fn new(
        table: &Table,
        path: Option<PathBuf>,
        hash: String,
        size_bytes: u64,
        format: SourceFormat,
    ) -> Self {
        Self {
            table: table.name.clone(),
            path,
            hash,
            size_bytes,
            format,
            row_count: table.row_count(),
            column_count: table.column_count(),
            loaded_at: Utc::now(),
        }
    }
}

/// A table together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub source: SourceMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(
            SourceFormat::detect("a.tsv", b"x,y\n1,2", None).unwrap(),
            SourceFormat::Delimited(b'\t')
        );
        assert_eq!(
            SourceFormat::detect("a.json", b"[]", None).unwrap(),
            SourceFormat::JsonRecords
        );
    }

    #[test]
    fn test_detect_by_content() {
        assert_eq!(
            SourceFormat::detect("upload", b"  [{\"a\": 1}]", None).unwrap(),
            SourceFormat::JsonRecords
        );
        assert_eq!(
            SourceFormat::detect("data.csv", b"a;b;c\n1;2;3\n", None).unwrap(),
            SourceFormat::Delimited(b';')
        );
        assert_eq!(
            SourceFormat::detect("data.csv", b"a;b;c\n1;2;3\n", Some(b',')).unwrap(),
            SourceFormat::Delimited(b',')
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let result = SourceFormat::detect("book.xlsx", b"PK", None);
        assert!(matches!(result, Err(AnalysisError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_labels() {
        assert_eq!(SourceFormat::Delimited(b',').label(), "csv");
        assert_eq!(SourceFormat::JsonRecords.label(), "json");
    }
}
