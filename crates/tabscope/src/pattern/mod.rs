//! Per-table outliers, correlations and quality scoring.

mod analyzer;
mod correlation;
mod missing;
mod outlier;
mod quality;

pub use analyzer::{PatternAnalysis, PatternAnalyzer, PatternConfig};
pub use correlation::{
    correlate, correlation_entries, CorrelationEntry, CorrelationMethod, CorrelationStrength,
};
pub use missing::{missing_patterns, MissingCorrelation, MissingSummary};
pub use outlier::{
    density_outliers, iqr_outliers, modified_zscore_outliers, zscore_outliers, OutlierMethod,
    OutlierReport,
};
pub use quality::QualityScore;
