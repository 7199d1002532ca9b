//! Columns, tables and datasets handed to the engine.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::value::CellValue;

static NULL_CELL: CellValue = CellValue::Null;

/// A named column of raw cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Cells in row order.
    pub values: Vec<CellValue>,
}

impl Column {
    /// Create a column from any iterator of cell-convertible values.
    pub fn new<V: Into<CellValue>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of cells (including nulls).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of null cells.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Whether any null value was observed.
    pub fn nullable(&self) -> bool {
        self.values.iter().any(CellValue::is_null)
    }

    /// Non-null cells together with their row index.
    pub fn non_null(&self) -> impl Iterator<Item = (usize, &CellValue)> {
        self.values.iter().enumerate().filter(|(_, v)| !v.is_null())
    }

    /// Get a cell; rows past the end read as null.
    pub fn get(&self, row: usize) -> &CellValue {
        self.values.get(row).unwrap_or(&NULL_CELL)
    }
}

/// A named table of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name, unique within a dataset.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a new table.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Build a table from row-major text data.
    ///
    /// Short rows are padded with nulls, long rows are truncated.
    pub fn from_rows(
        name: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|h| Column {
                name: h,
                values: Vec::with_capacity(rows.len()),
            })
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for column in &mut columns {
                let cell = cells.next().map_or(CellValue::Null, CellValue::Text);
                column.values.push(cell);
            }
        }

        Self::new(name, columns)
    }

    /// Number of rows; the longest column decides.
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(Column::len).max().unwrap_or(0)
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Total number of cells (rows x columns).
    pub fn cell_count(&self) -> usize {
        self.row_count() * self.column_count()
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get a specific cell value.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.columns
            .get(col)
            .map_or(&NULL_CELL, |c| c.get(row))
    }

    /// Number of rows that repeat an earlier row exactly.
    pub fn duplicate_row_count(&self) -> usize {
        let mut seen = HashSet::new();
        (0..self.row_count())
            .filter(|&row| {
                let key: Vec<String> = (0..self.column_count())
                    .map(|col| {
                        let cell = self.cell(row, col);
                        if cell.is_null() { String::new() } else { cell.key() }
                    })
                    .collect();
                !seen.insert(key)
            })
            .count()
    }
}

/// Reference to a column of a table within a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// An ordered collection of tables analysed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Session-scoped identifier.
    pub id: String,
    /// Tables in upload order.
    pub tables: Vec<Table>,
}

impl Dataset {
    /// Create a new dataset.
    pub fn new(id: impl Into<String>, tables: Vec<Table>) -> Self {
        Self {
            id: id.into(),
            tables,
        }
    }

    /// Get a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Total number of cells across all tables.
    pub fn cell_count(&self) -> usize {
        self.tables.iter().map(Table::cell_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_table(headers: Vec<&str>, rows: Vec<Vec<&str>>) -> Table {
        Table::from_rows(
            "t",
            headers.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let table = make_table(vec!["a", "b"], vec![vec!["1", "2"], vec!["3"]]);

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, 1), &CellValue::Null);
        assert_eq!(table.cell(1, 0), &CellValue::Text("3".to_string()));
        assert!(table.columns[1].nullable());
    }

    #[test]
    fn test_ragged_columns_read_as_null() {
        let table = Table::new(
            "t",
            vec![Column::new("a", [1i64, 2, 3]), Column::new("b", [1i64])],
        );

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.cell_count(), 6);
        assert!(table.cell(2, 1).is_null());
    }

    #[test]
    fn test_duplicate_rows() {
        let table = make_table(
            vec!["a", "b"],
            vec![vec!["1", "x"], vec!["1", "x"], vec!["2", "x"], vec!["1.0", "x"], vec!["1.5", "x"]],
        );
        // `1.0` repeats `1`.
        assert_eq!(table.duplicate_row_count(), 2);
    }
}
