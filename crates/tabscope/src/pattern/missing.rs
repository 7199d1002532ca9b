//! Co-occurrence of missing values across the columns of a table.

use serde::{Deserialize, Serialize};

use crate::dataset::Table;
use crate::stats;

/// Two columns whose missing values tend to appear in the same rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingCorrelation {
    pub left: String,
    pub right: String,
    /// Pearson coefficient of the two null indicators.
    pub coefficient: f64,
}

/// How missing values are spread over a table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MissingSummary {
    /// Column pairs with `|r| > threshold`, in column order.
    pub correlated: Vec<MissingCorrelation>,
    /// Rows with more than one missing cell.
    pub rows_with_multiple_missing: usize,
}

/// Correlate the null indicators of every column pair of `table`.
///
/// Columns that are never or always missing have no variance and pair with nothing.
pub fn missing_patterns(table: &Table, threshold: f64) -> MissingSummary {
    let rows = table.row_count();
    let indicators: Vec<Vec<f64>> = (0..table.column_count())
        .map(|col| {
            (0..rows)
                .map(|row| if table.cell(row, col).is_null() { 1.0 } else { 0.0 })
                .collect()
        })
        .collect();

    let rows_with_multiple_missing = (0..rows)
        .filter(|&row| indicators.iter().filter(|column| column[row] > 0.0).count() > 1)
        .count();

    let mut correlated = Vec::new();
    for i in 0..indicators.len() {
        for j in (i + 1)..indicators.len() {
            let Some(r) = stats::pearson(&indicators[i], &indicators[j]) else {
                continue;
            };
            if r.abs() > threshold {
                correlated.push(MissingCorrelation {
                    left: table.columns[i].name.clone(),
                    right: table.columns[j].name.clone(),
                    coefficient: r,
                });
            }
        }
    }

    MissingSummary {
        correlated,
        rows_with_multiple_missing,
    }
}
