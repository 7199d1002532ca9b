//! Loads delimited text and JSON records into tables.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::dataset::{CellValue, Column, Table};
use crate::error::{AnalysisError, Result};

use super::source::{LoadedTable, SourceFormat, SourceMetadata};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Loader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether delimited sources have a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Turns raw bytes into tables. The analysis engine never sees the format.
pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    /// Create a new loader with default configuration.
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    /// Create a loader with custom configuration.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load a file; the table is named after the file stem.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<LoadedTable> {
        let path = path.as_ref();
        let io_error = |source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(io_error)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(io_error)?;

        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let format = SourceFormat::detect(&file_name, &contents, self.config.delimiter)?;
        let table_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());

        let mut loaded = self.load_with_format(&table_name, &contents, format)?;
        loaded.source.path = Some(path.to_path_buf());
        Ok(loaded)
    }

    /// Load raw bytes, detecting the format from `name` and the content.
    ///
    /// The table takes `name` without its extension.
    pub fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<LoadedTable> {
        let format = SourceFormat::detect(name, bytes, self.config.delimiter)?;
        let table_name = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        self.load_with_format(&table_name, bytes, format)
    }

    /// Load raw bytes in a known format.
    pub fn load_with_format(
        &self,
        name: &str,
        bytes: &[u8],
        format: SourceFormat,
    ) -> Result<LoadedTable> {
        let table = match format {
            SourceFormat::Delimited(delimiter) => self.parse_delimited(name, bytes, delimiter)?,
            SourceFormat::JsonRecords => self.parse_json_records(name, bytes)?,
        };

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = format!("sha256:{:x}", hasher.finalize());

        tracing::debug!(
            table = %table.name,
            format = format.label(),
            rows = table.row_count(),
            columns = table.column_count(),
            "loaded table"
        );

        let source = SourceMetadata::new(&table, None, hash, bytes.len() as u64, format);
        Ok(LoadedTable { table, source })
    }

    fn parse_delimited(&self, name: &str, bytes: &[u8], delimiter: u8) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records = reader.records();
        let headers: Vec<String> = if self.config.has_header {
            match records.next() {
                Some(record) => record?.iter().map(|s| s.trim().to_string()).collect(),
                None => return Err(AnalysisError::EmptyData(format!("'{name}' has no header row"))),
            }
        } else {
            Vec::new()
        };

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in records {
            if self.config.max_rows.is_some_and(|max| rows.len() >= max) {
                break;
            }
            rows.push(record?.iter().map(str::to_string).collect());
        }

        let headers = if self.config.has_header {
            headers
        } else {
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            (0..width).map(|i| format!("column_{}", i + 1)).collect()
        };

        if headers.is_empty() {
            return Err(AnalysisError::EmptyData(format!("'{name}' has no columns")));
        }

        Ok(Table::from_rows(name, headers, rows))
    }

    fn parse_json_records(&self, name: &str, bytes: &[u8]) -> Result<Table> {
        let records: Vec<IndexMap<String, serde_json::Value>> = serde_json::from_slice(bytes)?;

        let mut columns: IndexMap<String, Vec<CellValue>> = IndexMap::new();
        let limit = self.config.max_rows.unwrap_or(usize::MAX);
        let mut row_count = 0;
        for (row, record) in records.into_iter().take(limit).enumerate() {
            for (key, value) in record {
                let column = columns
                    .entry(key)
                    .or_insert_with(|| vec![CellValue::Null; row]);
                column.resize(row, CellValue::Null);
                column.push(json_cell(value));
            }
            row_count = row + 1;
        }

        if columns.is_empty() {
            return Err(AnalysisError::EmptyData(format!("'{name}' has no records")));
        }
        // Keys missing from trailing records read as null.
        for values in columns.values_mut() {
            values.resize(row_count, CellValue::Null);
        }

        Ok(Table::new(
            name,
            columns
                .into_iter()
                .map(|(name, values)| Column::new(name, values))
                .collect(),
        ))
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

fn json_cell(value: serde_json::Value) -> CellValue {
    use serde_json::Value;
    match value {
        Value::Null => CellValue::Null,
        Value::Bool(b) => CellValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => CellValue::Int(i),
            None => n.as_f64().map_or(CellValue::Null, CellValue::Float),
        },
        Value::String(s) => CellValue::Text(s),
        nested => CellValue::Text(nested.to_string()),
    }
}

/// Detect the delimiter by analyzing the first few lines.
pub(crate) fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(AnalysisError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
        let variance =
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64;

        // Consistent counts win; tabs get a small bonus.
        let score = if consistent {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
