//! Pairwise correlation between numeric columns.

use serde::{Deserialize, Serialize};

use crate::dataset::{Column, ColumnRef};
use crate::stats;

/// Correlation coefficient used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    /// Pearson over ranks; robust to monotonic non-linear relations.
    Spearman,
}

/// Qualitative strength of a coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    pub fn from_coefficient(coefficient: f64) -> Self {
        match coefficient.abs() {
            r if r > 0.9 => CorrelationStrength::VeryStrong,
            r if r > 0.7 => CorrelationStrength::Strong,
            r if r > 0.5 => CorrelationStrength::Moderate,
            _ => CorrelationStrength::Weak,
        }
    }
}

/// Correlation between an unordered pair of numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub left: ColumnRef,
    pub right: ColumnRef,
    pub coefficient: f64,
    pub method: CorrelationMethod,
    /// Rows where both columns were numeric.
    pub sample_size: usize,
    pub strength: CorrelationStrength,
}

impl CorrelationEntry {
    /// Whether this entry is about the given pair, in either order.
    pub fn involves(&self, a: &ColumnRef, b: &ColumnRef) -> bool {
        (&self.left == a && &self.right == b) || (&self.left == b && &self.right == a)
    }
}

/// Correlation of two columns over rows where both are numeric.
///
/// Returns `None` with fewer than `min_samples` co-present values or when
/// either side has no variance.
pub fn correlate(
    a: &Column,
    b: &Column,
    method: CorrelationMethod,
    min_samples: usize,
) -> Option<(f64, usize)> {
    let rows = a.len().max(b.len());
    let (xs, ys): (Vec<f64>, Vec<f64>) = (0..rows)
        .filter_map(|row| Some((a.get(row).as_f64()?, b.get(row).as_f64()?)))
        .unzip();

    if xs.len() < min_samples.max(2) {
        return None;
    }

    let coefficient = match method {
        CorrelationMethod::Pearson => stats::pearson(&xs, &ys),
        CorrelationMethod::Spearman => stats::spearman(&xs, &ys),
    }?;
    Some((coefficient, xs.len()))
}

/// Correlations for every unordered pair of the given columns, in column order.
///
/// Only pairs with `|r| >= min_abs` are kept.
pub fn correlation_entries(
    table: &str,
    columns: &[&Column],
    method: CorrelationMethod,
    min_samples: usize,
    min_abs: f64,
) -> Vec<CorrelationEntry> {
    let mut entries = Vec::new();

    for (i, a) in columns.iter().enumerate() {
        for b in &columns[i + 1..] {
            let Some((coefficient, sample_size)) = correlate(a, b, method, min_samples) else {
                tracing::trace!(table, left = %a.name, right = %b.name, "correlation skipped");
                continue;
            };
            if coefficient.abs() < min_abs {
                continue;
            }
            entries.push(CorrelationEntry {
                left: ColumnRef::new(table, &a.name),
                right: ColumnRef::new(table, &b.name),
                coefficient,
                method,
                sample_size,
                strength: CorrelationStrength::from_coefficient(coefficient),
            });
        }
    }

    entries
}
