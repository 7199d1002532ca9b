//! Five-axis table quality score.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::Table;
use crate::profile::{ColumnProfile, InferredType};

/// Per-table quality score; every axis is in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityScore {
    /// Share of non-null cells.
    pub completeness: f64,
    /// Share of columns whose type was inferred with high confidence.
    pub consistency: f64,
    /// Mean distinct ratio of key-like and categorical columns.
    pub uniqueness: f64,
    /// Share of sampled values accepted by their column's winning matcher.
    pub validity: f64,
    /// Estimate only: mean of validity and consistency. There is no ground
    /// truth to measure real accuracy against.
    pub accuracy: f64,
}

impl QualityScore {
    /// Score of a table without rows.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Compute the score from a table, its column profiles and its duplicate row count.
    pub fn compute(
        table: &Table,
        profiles: &IndexMap<String, ColumnProfile>,
        duplicate_rows: usize,
        high_confidence: f64,
    ) -> Self {
        let rows = table.row_count();
        let cells = table.cell_count();
        if rows == 0 || cells == 0 {
            return Self::zero();
        }

        let nulls: usize = (0..table.column_count())
            .map(|col| (0..rows).filter(|&row| table.cell(row, col).is_null()).count())
            .sum();
        let completeness = share(cells - nulls, cells);

        let confident = profiles
            .values()
            .filter(|p| p.confidence >= high_confidence)
            .count();
        let consistency = share(confident, profiles.len());

        let keyed: Vec<f64> = profiles
            .values()
            .filter(|p| {
                matches!(
                    p.inferred_type,
                    InferredType::Identifier | InferredType::Categorical
                )
            })
            .map(|p| p.distinct_ratio)
            .collect();
        let uniqueness = if keyed.is_empty() {
            share(rows.saturating_sub(duplicate_rows), rows)
        } else {
            percent(keyed.iter().sum::<f64>() / keyed.len() as f64)
        };

        let sampled: usize = profiles.values().map(|p| p.sampled).sum();
        let matched: usize = profiles.values().map(|p| p.matched).sum();
        let validity = share(matched, sampled);

        Self {
            completeness,
            consistency,
            uniqueness,
            validity,
            accuracy: ((validity + consistency) / 2.0).clamp(0.0, 100.0),
        }
    }

    /// Mean of the five axes.
    pub fn overall(&self) -> f64 {
        (self.completeness + self.consistency + self.uniqueness + self.validity + self.accuracy)
            / 5.0
    }
}

/// `part / whole` in percent; zero when `whole` is zero.
fn share(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (100.0 * part as f64 / whole as f64).clamp(0.0, 100.0)
    }
}

fn percent(fraction: f64) -> f64 {
    if fraction.is_finite() {
        (fraction * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::profile::TypeProfiler;

    fn profiles_of(table: &Table) -> IndexMap<String, ColumnProfile> {
        let profiler = TypeProfiler::new();
        table
            .columns
            .iter()
            .map(|c| (c.name.clone(), profiler.profile(c)))
            .collect()
    }

    #[test]
    fn test_completeness_exact() {
        // 10 rows x 10 columns, 20 nulls.
        let columns = (0..10)
            .map(|c| {
                let values: Vec<Option<i64>> = (0..10)
                    .map(|r| if c < 2 { None } else { Some(r as i64) })
                    .collect();
                Column::new(format!("c{c}"), values)
            })
            .collect();
        let table = Table::new("t", columns);
        let score = QualityScore::compute(&table, &profiles_of(&table), 0, 0.9);

        assert_eq!(score.completeness, 80.0);
    }

    #[test]
    fn test_zero_rows() {
        let table = Table::new("t", vec![Column::new("a", Vec::<i64>::new())]);
        let score = QualityScore::compute(&table, &profiles_of(&table), 0, 0.9);
        assert_eq!(score, QualityScore::zero());
        assert_eq!(score.overall(), 0.0);
    }

    #[test]
    fn test_uniqueness_falls_back_to_duplicate_rows() {
        let table = Table::new(
            "t",
            vec![
                Column::new("x", [1.5, 2.5, 1.5, 4.5]),
                Column::new("y", [1.0, 2.0, 1.0, 3.0]),
            ],
        );
        let profiles = profiles_of(&table);
        let score = QualityScore::compute(&table, &profiles, table.duplicate_row_count(), 0.9);
        assert_eq!(score.uniqueness, 75.0);
    }

    #[test]
    fn test_axes_bounded_and_accuracy_estimate() {
        let table = Table::new(
            "t",
            vec![
                Column::new("id", ["a1", "a2", "a3", "a4"]),
                Column::new("kind", ["x", "x", "y", "?"]),
                Column::new("amount", ["1", "2", "oops", "4"]),
            ],
        );
        let score = QualityScore::compute(&table, &profiles_of(&table), 0, 0.9);

        for axis in [
            score.completeness,
            score.consistency,
            score.uniqueness,
            score.validity,
            score.accuracy,
        ] {
            assert!((0.0..=100.0).contains(&axis));
        }
        assert!((score.accuracy - (score.validity + score.consistency) / 2.0).abs() < 1e-9);
    }
}
