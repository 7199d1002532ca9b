//! Per-table pattern analysis: outliers, correlations, missing data and quality.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::{Column, Table};
use crate::profile::ColumnProfile;

use super::correlation::{correlation_entries, CorrelationEntry, CorrelationMethod};
use super::missing::{missing_patterns, MissingSummary};
use super::outlier::{
    density_outliers, iqr_outliers, modified_zscore_outliers, zscore_outliers, OutlierReport,
};
use super::quality::QualityScore;

/// Configuration for the pattern analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// IQR fence multiplier (`k` in `Q3 + k*IQR`).
    pub iqr_multiplier: f64,
    /// Minimum numeric values for the univariate passes.
    pub min_outlier_values: usize,
    /// Run the z-score and modified z-score passes.
    pub statistical_outliers: bool,
    /// Flag values with `|z|` above this.
    pub zscore_threshold: f64,
    /// Flag values with a modified z-score magnitude above this.
    pub modified_zscore_threshold: f64,
    /// Run the multivariate nearest-neighbour pass.
    pub density_outliers: bool,
    /// Minimum complete rows for the multivariate pass.
    pub density_min_rows: usize,
    /// Maximum complete rows for the multivariate pass.
    pub density_max_rows: usize,
    /// Coefficient used for correlations.
    pub correlation_method: CorrelationMethod,
    /// Minimum co-present values for a correlation.
    pub min_correlation_samples: usize,
    /// Minimum `|r|` for a correlation to be reported.
    pub min_abs_correlation: f64,
    /// Minimum `|r|` between null indicators for columns to count as missing together.
    pub missing_correlation_threshold: f64,
    /// Confidence at which a column counts as consistently typed.
    pub high_confidence: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            min_outlier_values: 4,
            statistical_outliers: true,
            zscore_threshold: 3.0,
            modified_zscore_threshold: 3.5,
            density_outliers: true,
            density_min_rows: 10,
            density_max_rows: 5_000,
            correlation_method: CorrelationMethod::Pearson,
            min_correlation_samples: 3,
            min_abs_correlation: 0.3,
            missing_correlation_threshold: 0.5,
            high_confidence: 0.9,
        }
    }
}

/// Result of analysing one table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub outliers: Vec<OutlierReport>,
    pub correlations: Vec<CorrelationEntry>,
    pub quality: QualityScore,
    pub missing: MissingSummary,
    /// Rows repeating an earlier row exactly.
    pub duplicate_rows: usize,
    /// Columns holding a single distinct value.
    pub constant_columns: Vec<String>,
}

/// Finds outliers, correlations and quality issues within a table.
pub struct PatternAnalyzer {
    config: PatternConfig,
}

impl PatternAnalyzer {
    /// Create an analyzer with default settings.
    pub fn new() -> Self {
        Self::with_config(PatternConfig::default())
    }

    /// Create an analyzer with custom configuration.
    pub fn with_config(config: PatternConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Analyse a table given the profiles of its columns.
    ///
    /// Columns without a profile are ignored. A table with no rows yields a
    /// zero quality score and nothing else.
    pub fn analyze(
        &self,
        table: &Table,
        profiles: &IndexMap<String, ColumnProfile>,
    ) -> PatternAnalysis {
        let row_count = table.row_count();
        if row_count == 0 {
            return PatternAnalysis::default();
        }

        let numeric: Vec<&Column> = table
            .columns
            .iter()
            .filter(|c| profiles.get(&c.name).is_some_and(ColumnProfile::is_numeric))
            .collect();

        let min_values = self.config.min_outlier_values;
        let mut outliers: Vec<OutlierReport> = numeric
            .iter()
            .filter_map(|c| iqr_outliers(c, self.config.iqr_multiplier, min_values))
            .collect();

        if self.config.statistical_outliers {
            outliers.extend(
                numeric
                    .iter()
                    .filter_map(|c| zscore_outliers(c, self.config.zscore_threshold, min_values)),
            );
            outliers.extend(numeric.iter().filter_map(|c| {
                modified_zscore_outliers(c, self.config.modified_zscore_threshold, min_values)
            }));
        }

        if self.config.density_outliers {
            if let Some(report) = density_outliers(
                &numeric,
                row_count,
                self.config.iqr_multiplier,
                self.config.density_min_rows,
                self.config.density_max_rows,
            ) {
                outliers.push(report);
            }
        }

        let correlations = correlation_entries(
            &table.name,
            &numeric,
            self.config.correlation_method,
            self.config.min_correlation_samples,
            self.config.min_abs_correlation,
        );

        let missing = missing_patterns(table, self.config.missing_correlation_threshold);
        let duplicate_rows = table.duplicate_row_count();
        let quality =
            QualityScore::compute(table, profiles, duplicate_rows, self.config.high_confidence);

        let constant_columns = profiles
            .values()
            .filter(|p| p.statistics.distinct_count == 1 && row_count > 1)
            .map(|p| p.name.clone())
            .collect();

        tracing::debug!(
            table = %table.name,
            outliers = outliers.len(),
            correlations = correlations.len(),
            duplicate_rows,
            "pattern analysis complete"
        );

        PatternAnalysis {
            outliers,
            correlations,
            quality,
            missing,
            duplicate_rows,
            constant_columns,
        }
    }
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
