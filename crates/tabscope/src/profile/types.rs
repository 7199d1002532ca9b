//! Column profile types produced by the type profiler.

use serde::{Deserialize, Serialize};

/// Inferred semantic type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredType {
    /// Whole numbers (no decimal point).
    Integer,
    /// Floating-point numbers.
    Float,
    /// Boolean values (true/false, yes/no, 0/1).
    Boolean,
    /// Date or date-time values.
    Date,
    /// Low-cardinality discrete values.
    Categorical,
    /// Near-unique key column.
    Identifier,
    /// High-cardinality text.
    FreeText,
    /// No non-null values to infer from.
    #[default]
    Unknown,
}

impl InferredType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, InferredType::Integer | InferredType::Float)
    }
}

/// Value pattern detected through a regular expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Email,
    Url,
    Phone,
    Uuid,
    PostalCode,
}

/// A detected pattern and the share of sampled values matching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern: PatternKind,
    pub match_ratio: f64,
}

/// A value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Statistics for numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub median: f64,
    /// First quartile (25th percentile).
    pub q1: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
    /// Sample skewness (`m3 / m2^1.5`); 0 for constant values.
    #[serde(default)]
    pub skewness: f64,
    /// Excess kurtosis (`m4 / m2^2 - 3`); 0 for constant values.
    #[serde(default)]
    pub kurtosis: f64,
}

impl NumericStatistics {
    /// Calculate the interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Lower and upper fences for the IQR method.
    pub fn iqr_bounds(&self, multiplier: f64) -> (f64, f64) {
        let iqr = self.iqr();
        (self.q1 - multiplier * iqr, self.q3 + multiplier * iqr)
    }

    /// Check if a value is an outlier using the IQR method.
    pub fn is_outlier_iqr(&self, value: f64, multiplier: f64) -> bool {
        let (lower, upper) = self.iqr_bounds(multiplier);
        value < lower || value > upper
    }
}

/// Statistics for string columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringStatistics {
    pub min_length: usize,
    pub max_length: usize,
    pub avg_length: f64,
}

/// Earliest and latest date of a date column, ISO formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: String,
    pub max: String,
    pub span_days: i64,
}

/// Statistics computed for a column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    /// Total number of values (including nulls).
    pub count: usize,
    /// Number of null/missing values.
    pub null_count: usize,
    /// Number of distinct non-null values.
    pub distinct_count: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub numeric: Option<NumericStatistics>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub string: Option<StringStatistics>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date_range: Option<DateRange>,
    /// Most frequent values (non-numeric columns).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub top_values: Vec<ValueCount>,
}

/// Profile of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name.
    pub name: String,
    /// Inferred semantic type.
    pub inferred_type: InferredType,
    /// Share of sampled values supporting the inferred type (0.0-1.0).
    pub confidence: f64,
    /// Share of null cells (0.0-1.0).
    pub null_ratio: f64,
    /// Distinct non-null values over non-null values (0.0-1.0).
    pub distinct_ratio: f64,
    /// Whether null values are present.
    pub nullable: bool,
    /// Winning value pattern, when a pattern decided the profile.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pattern: Option<PatternKind>,
    /// Every pattern detected in the sample.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub patterns: Vec<PatternMatch>,
    /// Number of non-null values sampled.
    pub sampled: usize,
    /// Number of sampled values accepted by the winning matcher.
    pub matched: usize,
    /// Computed statistics.
    pub statistics: ColumnStatistics,
    /// Non-standard missing value markers seen repeatedly.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub missing_markers: Vec<String>,
}

impl ColumnProfile {
    /// Profile for a column without any non-null value.
    pub fn unknown(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            inferred_type: InferredType::Unknown,
            confidence: 0.0,
            null_ratio: if count == 0 { 0.0 } else { 1.0 },
            distinct_ratio: 0.0,
            nullable: count > 0,
            pattern: None,
            patterns: Vec::new(),
            sampled: 0,
            matched: 0,
            statistics: ColumnStatistics {
                count,
                null_count: count,
                ..ColumnStatistics::default()
            },
            missing_markers: Vec::new(),
        }
    }

    /// Whether the column holds numbers usable for outliers and correlation.
    pub fn is_numeric(&self) -> bool {
        self.inferred_type.is_numeric()
    }

    /// Whether the column is near-unique under the given threshold.
    pub fn is_near_unique(&self, threshold: f64) -> bool {
        self.sampled > 0 && self.distinct_ratio >= threshold
    }

    /// Match ratio of a detected pattern, if present.
    pub fn pattern_ratio(&self, pattern: PatternKind) -> Option<f64> {
        self.patterns
            .iter()
            .find(|p| p.pattern == pattern)
            .map(|p| p.match_ratio)
    }
}
