//! Univariate (IQR, z-score, modified z-score) and multivariate
//! (nearest-neighbour) outlier detection.

use serde::{Deserialize, Serialize};

use crate::dataset::Column;
use crate::stats::{self, RunningStats};

/// Slack for floating point noise between equally spaced points.
const DISTANCE_TOLERANCE: f64 = 1e-9;

/// How outliers were detected, with the thresholds used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutlierMethod {
    /// Values outside `[Q1 - k*IQR, Q3 + k*IQR]`.
    Iqr {
        q1: f64,
        q3: f64,
        multiplier: f64,
        lower_bound: f64,
        upper_bound: f64,
    },
    /// Values more than `threshold` population standard deviations from the mean.
    ZScore { mean: f64, std: f64, threshold: f64 },
    /// Values whose modified z-score `0.6745 * (x - median) / MAD` exceeds
    /// `threshold` in magnitude.
    ModifiedZScore {
        median: f64,
        mad: f64,
        threshold: f64,
    },
    /// Standardized rows whose nearest-neighbour distance exceeds a threshold
    /// learned from the distance distribution itself.
    NearestNeighbor {
        threshold: f64,
        multiplier: f64,
        dimensions: usize,
    },
}

/// Outliers found in one column (or one group of columns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    /// Columns inspected.
    pub columns: Vec<String>,
    /// Detection method and parameters.
    pub method: OutlierMethod,
    /// Flagged row indices, ascending.
    pub rows: Vec<usize>,
    /// Number of values (or complete rows) inspected.
    pub values_checked: usize,
}

impl OutlierReport {
    /// Share of inspected values flagged, in percent.
    pub fn percentage(&self) -> f64 {
        if self.values_checked == 0 {
            0.0
        } else {
            self.rows.len() as f64 / self.values_checked as f64 * 100.0
        }
    }
}

/// IQR outliers of a numeric column. `None` with fewer than `min_values` numbers.
pub fn iqr_outliers(column: &Column, multiplier: f64, min_values: usize) -> Option<OutlierReport> {
    let values = numeric_values(column, min_values)?;

    let numbers: Vec<f64> = values.iter().map(|&(_, x)| x).collect();
    let summary = stats::describe(&numbers)?;
    let (lower_bound, upper_bound) = summary.iqr_bounds(multiplier);

    let rows = values
        .iter()
        .filter(|&&(_, x)| summary.is_outlier_iqr(x, multiplier))
        .map(|&(row, _)| row)
        .collect();

    Some(OutlierReport {
        columns: vec![column.name.clone()],
        method: OutlierMethod::Iqr {
            q1: summary.q1,
            q3: summary.q3,
            multiplier,
            lower_bound,
            upper_bound,
        },
        rows,
        values_checked: values.len(),
    })
}

/// Scale that makes the MAD consistent with the standard deviation of normal data.
const MAD_SCALE: f64 = 0.6745;

/// Z-score outliers. `None` with fewer than `min_values` numbers or no spread.
pub fn zscore_outliers(column: &Column, threshold: f64, min_values: usize) -> Option<OutlierReport> {
    let values = numeric_values(column, min_values)?;

    let mut running = RunningStats::new();
    for &(_, x) in &values {
        running.add(x);
    }
    let (mean, std) = (running.mean(), running.std());
    if std <= f64::EPSILON || !std.is_finite() {
        return None;
    }

    let rows = values
        .iter()
        .filter(|&&(_, x)| ((x - mean) / std).abs() > threshold)
        .map(|&(row, _)| row)
        .collect();

    Some(OutlierReport {
        columns: vec![column.name.clone()],
        method: OutlierMethod::ZScore {
            mean,
            std,
            threshold,
        },
        rows,
        values_checked: values.len(),
    })
}

/// Median-based z-score outliers, robust to the outliers themselves.
///
/// `None` with fewer than `min_values` numbers or when more than half the
/// values share the median (MAD of zero).
pub fn modified_zscore_outliers(
    column: &Column,
    threshold: f64,
    min_values: usize,
) -> Option<OutlierReport> {
    let values = numeric_values(column, min_values)?;

    let numbers: Vec<f64> = values.iter().map(|&(_, x)| x).collect();
    let median = stats::quantile(&stats::sorted(&numbers), 0.5);
    let deviations: Vec<f64> = numbers.iter().map(|x| (x - median).abs()).collect();
    let mad = stats::quantile(&stats::sorted(&deviations), 0.5);
    if mad <= f64::EPSILON || !mad.is_finite() {
        return None;
    }

    let rows = values
        .iter()
        .filter(|&&(_, x)| (MAD_SCALE * (x - median) / mad).abs() > threshold)
        .map(|&(row, _)| row)
        .collect();

    Some(OutlierReport {
        columns: vec![column.name.clone()],
        method: OutlierMethod::ModifiedZScore {
            median,
            mad,
            threshold,
        },
        rows,
        values_checked: values.len(),
    })
}

/// Non-null numbers of a column with their rows, if there are enough of them.
fn numeric_values(column: &Column, min_values: usize) -> Option<Vec<(usize, f64)>> {
    let values: Vec<(usize, f64)> = column
        .non_null()
        .filter_map(|(row, v)| v.as_f64().map(|x| (row, x)))
        .collect();
    (values.len() >= min_values.max(1)).then_some(values)
}

/// Multivariate outliers over rows where every column is numeric.
///
/// Each dimension is standardized to zero mean and unit variance. A row is
/// flagged when its nearest-neighbour distance is above `Q3 + k*IQR` of all
/// nearest-neighbour distances. Quadratic in the number of rows, so callers
/// bound it with `max_rows`.
pub fn density_outliers(
    columns: &[&Column],
    row_count: usize,
    multiplier: f64,
    min_rows: usize,
    max_rows: usize,
) -> Option<OutlierReport> {
    if columns.len() < 2 {
        return None;
    }

    let mut rows = Vec::new();
    let mut points: Vec<Vec<f64>> = Vec::new();
    for row in 0..row_count {
        let point: Option<Vec<f64>> = columns.iter().map(|c| c.get(row).as_f64()).collect();
        if let Some(point) = point {
            rows.push(row);
            points.push(point);
        }
    }

    if points.len() < min_rows.max(2) || points.len() > max_rows {
        tracing::debug!(
            complete_rows = points.len(),
            "skipping density outliers outside the row bounds"
        );
        return None;
    }

    standardize(&mut points)?;

    let distances: Vec<f64> = (0..points.len())
        .map(|i| nearest_neighbor_distance(&points, i))
        .collect();

    let sorted = stats::sorted(&distances);
    let q1 = stats::quantile(&sorted, 0.25);
    let q3 = stats::quantile(&sorted, 0.75);
    let threshold = (q3 + multiplier * (q3 - q1)).max(f64::EPSILON);

    let flagged = rows
        .iter()
        .zip(&distances)
        .filter(|&(_, &d)| d - threshold > DISTANCE_TOLERANCE)
        .map(|(&row, _)| row)
        .collect();

    Some(OutlierReport {
        columns: columns.iter().map(|c| c.name.clone()).collect(),
        method: OutlierMethod::NearestNeighbor {
            threshold,
            multiplier,
            dimensions: columns.len(),
        },
        rows: flagged,
        values_checked: points.len(),
    })
}

/// Standardize every dimension in place. `None` when no dimension varies.
fn standardize(points: &mut [Vec<f64>]) -> Option<()> {
    let dims = points.first()?.len();
    let mut any_variance = false;

    for d in 0..dims {
        let mut running = RunningStats::new();
        for p in points.iter() {
            running.add(p[d]);
        }
        let mean = running.mean();
        let std = running.std();
        for p in points.iter_mut() {
            p[d] = if std > 0.0 { (p[d] - mean) / std } else { 0.0 };
        }
        any_variance |= std > 0.0;
    }

    any_variance.then_some(())
}

fn nearest_neighbor_distance(points: &[Vec<f64>], i: usize) -> f64 {
    points
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(_, other)| {
            points[i]
                .iter()
                .zip(other)
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>()
                .sqrt()
        })
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iqr_flags_extremes() {
        let column = Column::new("age", [10i64, 12, 11, 13, 12, 11, 10, 95, 12, -40]);
        let report = iqr_outliers(&column, 1.5, 4).unwrap();

        assert_eq!(report.rows, vec![7, 9]);
        assert_eq!(report.values_checked, 10);
        match report.method {
            OutlierMethod::Iqr { lower_bound, upper_bound, .. } => {
                assert!(lower_bound < 10.0 && upper_bound > 13.0);
            }
            _ => panic!("expected IQR method"),
        }
    }

    #[test]
    fn test_iqr_skips_nulls_and_keeps_row_indices() {
        let column = Column::new(
            "v",
            vec![Some(1i64), None, Some(2), Some(1), Some(2), None, Some(100)],
        );
        let report = iqr_outliers(&column, 1.5, 4).unwrap();
        assert_eq!(report.rows, vec![6]);
    }

    #[test]
    fn test_iqr_needs_minimum_values() {
        let column = Column::new("v", [1i64, 2, 3]);
        assert!(iqr_outliers(&column, 1.5, 4).is_none());
    }

    /// Thirty readings of 10, 11 and 12 followed by one of 200.
    fn spiked() -> Column {
        let mut values: Vec<f64> = (0..30).map(|i| 10.0 + (i % 3) as f64).collect();
        values.push(200.0);
        Column::new("reading", values)
    }

    #[test]
    fn test_zscore_flags_spike() {
        let report = zscore_outliers(&spiked(), 3.0, 4).unwrap();

        assert_eq!(report.rows, vec![30]);
        assert_eq!(report.values_checked, 31);
        match report.method {
            OutlierMethod::ZScore { mean, threshold, .. } => {
                assert!((mean - 530.0 / 31.0).abs() < 1e-9);
                assert_eq!(threshold, 3.0);
            }
            _ => panic!("expected z-score method"),
        }
    }

    #[test]
    fn test_zscore_without_spread() {
        let column = Column::new("v", [5i64, 5, 5, 5, 5]);
        assert!(zscore_outliers(&column, 3.0, 4).is_none());
        assert!(zscore_outliers(&Column::new("v", [1i64, 2]), 3.0, 4).is_none());
    }

    #[test]
    fn test_modified_zscore_flags_spike() {
        let report = modified_zscore_outliers(&spiked(), 3.5, 4).unwrap();

        assert_eq!(report.rows, vec![30]);
        match report.method {
            OutlierMethod::ModifiedZScore { median, mad, .. } => {
                assert_eq!(median, 11.0);
                assert_eq!(mad, 1.0);
            }
            _ => panic!("expected modified z-score method"),
        }
    }

    #[test]
    fn test_modified_zscore_needs_spread_around_median() {
        let column = Column::new("v", [5i64, 5, 5, 5, 5, 9]);
        assert!(modified_zscore_outliers(&column, 3.5, 4).is_none());
    }

    #[test]
    fn test_density_flags_isolated_point() {
        let mut xs: Vec<f64> = (0..20).map(|i| (i % 5) as f64).collect();
        let mut ys: Vec<f64> = (0..20).map(|i| (i / 5) as f64).collect();
        xs.push(40.0);
        ys.push(40.0);
        let x = Column::new("x", xs);
        let y = Column::new("y", ys);

        let report = density_outliers(&[&x, &y], 21, 1.5, 10, 5000).unwrap();
        assert_eq!(report.rows, vec![20]);
        assert_eq!(report.values_checked, 21);
    }

    #[test]
    fn test_density_respects_row_bounds() {
        let x = Column::new("x", (0..5).map(|i| i as f64));
        let y = Column::new("y", (0..5).map(|i| (i * 2) as f64));
        assert!(density_outliers(&[&x, &y], 5, 1.5, 10, 5000).is_none());
    }
}
