//! Analysis report handed back to callers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pattern::{
    CorrelationEntry, MissingSummary, OutlierReport, PatternAnalysis, QualityScore,
};
use crate::profile::{ColumnProfile, InferredType};
use crate::relationship::Relationship;

/// Complete result of analysing a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Identifier of the analysed dataset.
    pub dataset_id: String,
    /// Per-table results, in dataset order.
    pub tables: IndexMap<String, TableReport>,
    /// Correlations of all tables.
    pub correlations: Vec<CorrelationEntry>,
    /// Cross-table relationships.
    pub relationships: Vec<Relationship>,
    /// Dataset-wide summary.
    pub summary: ReportSummary,
}

impl AnalysisReport {
    /// Get a table report by name.
    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.get(name)
    }

    /// Get the profile of a column.
    pub fn profile(&self, table: &str, column: &str) -> Option<&ColumnProfile> {
        self.tables.get(table)?.columns.get(column)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a report previously produced by [`AnalysisReport::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Result of analysing one table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableReport {
    pub row_count: usize,
    /// Column profiles, in column order.
    pub columns: IndexMap<String, ColumnProfile>,
    pub outliers: Vec<OutlierReport>,
    pub quality: QualityScore,
    /// Columns missing together and rows missing several values.
    #[serde(default)]
    pub missing: MissingSummary,
    /// Columns complete and unique enough to serve as a key.
    #[serde(default)]
    pub candidate_keys: Vec<String>,
    #[serde(default)]
    pub duplicate_rows: usize,
    #[serde(default)]
    pub constant_columns: Vec<String>,
    /// Human-readable observations.
    #[serde(default)]
    pub insights: Vec<String>,
    /// Human-readable suggested actions.
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Why the table could not be analysed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl TableReport {
    /// Report for a table that was skipped.
    pub fn failed(row_count: usize, error: impl Into<String>) -> Self {
        Self {
            row_count,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Assemble a table report from profiles and pattern analysis.
    ///
    /// The table's correlations are not kept here; the caller collects them
    /// into the dataset-wide list.
    pub fn build(
        row_count: usize,
        columns: IndexMap<String, ColumnProfile>,
        analysis: PatternAnalysis,
        key_ratio: f64,
    ) -> Self {
        let candidate_keys = candidate_keys(&columns, key_ratio);
        let mut report = Self {
            row_count,
            columns,
            outliers: analysis.outliers,
            quality: analysis.quality,
            missing: analysis.missing,
            candidate_keys,
            duplicate_rows: analysis.duplicate_rows,
            constant_columns: analysis.constant_columns,
            insights: Vec::new(),
            recommendations: Vec::new(),
            error: None,
        };
        report.insights = report.generate_insights();
        report.recommendations = report.generate_recommendations();
        report
    }

    /// Whether the table was analysed.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Number of distinct rows flagged by any outlier pass.
    pub fn outlier_rows(&self) -> usize {
        let mut rows: Vec<usize> = self.outliers.iter().flat_map(|o| o.rows.iter().copied()).collect();
        rows.sort_unstable();
        rows.dedup();
        rows.len()
    }

    fn count_types(&self, types: &[InferredType]) -> usize {
        self.columns
            .values()
            .filter(|p| types.contains(&p.inferred_type))
            .count()
    }

    fn missing_percentage(&self) -> f64 {
        100.0 - self.quality.completeness
    }

    fn generate_insights(&self) -> Vec<String> {
        let mut insights = Vec::new();
        if self.row_count == 0 {
            return insights;
        }

        insights.push(format!(
            "Table contains {} rows across {} columns",
            self.row_count,
            self.columns.len()
        ));

        let numeric = self.count_types(&[InferredType::Integer, InferredType::Float]);
        if numeric > 0 {
            insights.push(format!("Found {numeric} numeric columns for statistical analysis"));
        }
        let text = self.count_types(&[InferredType::Categorical, InferredType::FreeText]);
        if text > 0 {
            insights.push(format!("Identified {text} text columns for pattern analysis"));
        }
        let dates = self.count_types(&[InferredType::Date]);
        if dates > 0 {
            insights.push(format!("Detected {dates} date columns for temporal analysis"));
        }

        for profile in self.columns.values() {
            if profile.inferred_type == InferredType::Identifier {
                insights.push(format!("Column '{}' appears to be a unique identifier", profile.name));
            }
            if let Some(numeric) = &profile.statistics.numeric {
                if numeric.skewness > 1.0 {
                    insights.push(format!("Column '{}' is right-skewed (long upper tail)", profile.name));
                } else if numeric.skewness < -1.0 {
                    insights.push(format!("Column '{}' is left-skewed (long lower tail)", profile.name));
                }
            }
            if let Some(pattern) = profile.pattern {
                insights.push(format!(
                    "Column '{}' holds {:?} values ({:.0}% match)",
                    profile.name,
                    pattern,
                    profile.confidence * 100.0
                ));
            }
        }

        insights
    }

    fn generate_recommendations(&self) -> Vec<String> {
        let mut recommendations = Vec::new();
        if self.row_count == 0 {
            recommendations.push("Table has no rows; nothing to analyse.".to_string());
            return recommendations;
        }

        let missing = self.missing_percentage();
        if missing > 10.0 {
            recommendations.push(format!(
                "Consider addressing missing data ({missing:.1}% of cells are empty)"
            ));
        }
        for pair in &self.missing.correlated {
            if pair.coefficient > 0.0 {
                recommendations.push(format!(
                    "Columns '{}' and '{}' tend to be missing together (r = {:.2})",
                    pair.left, pair.right, pair.coefficient
                ));
            }
        }
        if self.missing.rows_with_multiple_missing > 0 {
            recommendations.push(format!(
                "{} rows are missing more than one value",
                self.missing.rows_with_multiple_missing
            ));
        }
        if self.duplicate_rows > 0 {
            recommendations.push(format!(
                "Found {} duplicate rows that could be removed",
                self.duplicate_rows
            ));
        }
        for column in &self.constant_columns {
            recommendations.push(format!("Column '{column}' holds a single value and could be dropped"));
        }
        for profile in self.columns.values() {
            if !profile.missing_markers.is_empty() {
                recommendations.push(format!(
                    "Column '{}' uses non-standard missing markers: {}",
                    profile.name,
                    profile.missing_markers.join(", ")
                ));
            }
        }
        let outlier_rows = self.outlier_rows();
        if outlier_rows > 0 {
            recommendations.push(format!("Review {outlier_rows} rows flagged as outliers"));
        }
        if self.candidate_keys.is_empty() && self.columns.len() > 1 {
            recommendations.push("No candidate key found; consider adding a unique identifier".to_string());
        }

        recommendations
    }
}

/// Columns that are near-unique and almost never null.
fn candidate_keys(columns: &IndexMap<String, ColumnProfile>, key_ratio: f64) -> Vec<String> {
    columns
        .values()
        .filter(|p| {
            matches!(
                p.inferred_type,
                InferredType::Identifier | InferredType::Integer | InferredType::FreeText
            ) && p.is_near_unique(key_ratio)
                && p.null_ratio <= 0.1
        })
        .map(|p| p.name.clone())
        .collect()
}

/// Dataset-wide totals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_tables: usize,
    /// Tables skipped with an inline error.
    pub failed_tables: usize,
    pub total_rows: usize,
    pub total_columns: usize,
    pub total_outlier_rows: usize,
    pub total_correlations: usize,
    pub total_relationships: usize,
    /// Mean overall quality of analysed tables (0-100).
    pub data_quality_score: f64,
    /// Human-readable recommendation.
    pub recommendation: String,
}

impl ReportSummary {
    /// Compute the summary of assembled table reports.
    pub fn compute(
        tables: &IndexMap<String, TableReport>,
        correlations: usize,
        relationships: usize,
    ) -> Self {
        let analysed: Vec<&TableReport> = tables.values().filter(|t| t.is_ok()).collect();
        let data_quality_score = if analysed.is_empty() {
            0.0
        } else {
            analysed.iter().map(|t| t.quality.overall()).sum::<f64>() / analysed.len() as f64
        };
        let failed_tables = tables.len() - analysed.len();

        Self {
            total_tables: tables.len(),
            failed_tables,
            total_rows: tables.values().map(|t| t.row_count).sum(),
            total_columns: tables.values().map(|t| t.columns.len()).sum(),
            total_outlier_rows: analysed.iter().map(|t| t.outlier_rows()).sum(),
            total_correlations: correlations,
            total_relationships: relationships,
            data_quality_score,
            recommendation: generate_recommendation(failed_tables, data_quality_score),
        }
    }
}

fn generate_recommendation(failed_tables: usize, quality_score: f64) -> String {
    if failed_tables > 0 {
        format!("Fix {failed_tables} tables that could not be analysed before relying on the results.")
    } else if quality_score >= 90.0 {
        "Data quality is good. Minor issues detected for review.".to_string()
    } else if quality_score >= 70.0 {
        "Data quality is acceptable. Consider addressing the recommendations.".to_string()
    } else {
        format!("Data quality needs attention (score: {quality_score:.0}%). Review all recommendations.")
    }
}
