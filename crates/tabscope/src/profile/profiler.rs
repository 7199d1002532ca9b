//! Per-column type inference and descriptive statistics.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dataset::{CellValue, Column};
use crate::stats;

use super::matcher::{default_matchers, parse_date, MatchKind, Matcher};
use super::types::{
    ColumnProfile, ColumnStatistics, DateRange, InferredType, PatternKind, PatternMatch,
    StringStatistics, ValueCount,
};

static IDENTIFIER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(id|key|uuid|guid|pk)$|[_\-\s](id|key|uuid|guid)$|^(id|key|uuid)[_\-\s]")
        .unwrap()
});

static CAMEL_IDENTIFIER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9](Id|ID|Key|Uuid|UUID)$").unwrap());

/// Text values that usually stand in for a missing value.
const SUSPICIOUS_MARKERS: &[&str] = &[
    "missing", "unknown", "not available", "not recorded",
    "n.a.", "n.a", "na.", "#n/a", "#null", "undefined",
    "-999", "-9999", "999", "9999",
];

/// Configuration for the type profiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Maximum number of non-null values inspected by the matchers.
    pub sample_size: usize,
    /// Minimum share of sampled values a matcher needs to win.
    pub min_match_ratio: f64,
    /// Distinct ratio at or below which text is categorical.
    pub categorical_ratio: f64,
    /// Absolute distinct count at or below which text may be categorical.
    pub categorical_max_distinct: usize,
    /// Distinct ratio required for an identifier.
    pub identifier_ratio: f64,
    /// Minimum non-null values before values alone can make an identifier.
    pub identifier_min_values: usize,
    /// Minimum match ratio for a pattern to be listed on the profile.
    pub pattern_report_ratio: f64,
    /// Number of most-frequent values to keep.
    pub top_values: usize,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            sample_size: 10_000,
            min_match_ratio: 0.8,
            categorical_ratio: 0.2,
            categorical_max_distinct: 50,
            identifier_ratio: 0.98,
            identifier_min_values: 10,
            pattern_report_ratio: 0.1,
            top_values: 5,
        }
    }
}

/// Infers the semantic type and statistics of single columns.
pub struct TypeProfiler {
    config: ProfilerConfig,
    matchers: Vec<Box<dyn Matcher>>,
}

impl TypeProfiler {
    /// Create a profiler with default settings.
    pub fn new() -> Self {
        Self::with_config(ProfilerConfig::default())
    }

    /// Create a profiler with custom configuration and the built-in matchers.
    pub fn with_config(config: ProfilerConfig) -> Self {
        Self::with_matchers(config, default_matchers())
    }

    /// Create a profiler with a custom priority-ordered matcher list.
    pub fn with_matchers(config: ProfilerConfig, matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { config, matchers }
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Profile a column. Never fails; bad cells only lower the confidence.
    pub fn profile(&self, column: &Column) -> ColumnProfile {
        self.profile_with_rows(column, column.len())
    }

    /// Profile a column of a table with `rows` rows.
    ///
    /// Rows past the end of a shorter column count as nulls.
    pub fn profile_with_rows(&self, column: &Column, rows: usize) -> ColumnProfile {
        let total = rows.max(column.len());
        let non_null: Vec<&CellValue> = column.non_null().map(|(_, v)| v).collect();

        if non_null.is_empty() {
            return ColumnProfile::unknown(&column.name, total);
        }

        let null_count = total - non_null.len();
        let mut value_counts: IndexMap<String, usize> = IndexMap::new();
        for v in &non_null {
            *value_counts.entry(v.key()).or_insert(0) += 1;
        }
        let distinct_count = value_counts.len();
        let distinct_ratio = distinct_count as f64 / non_null.len() as f64;

        let sample = self.sample(&non_null);
        let sampled = sample.len();
        let (counts, unmatched) = self.score(&sample);

        let winner = self.pick_winner(&counts, sampled);
        let text_type = self.text_type(distinct_count, distinct_ratio);

        let (mut inferred_type, matched, pattern) = match winner {
            Some((MatchKind::Integer, c)) => (InferredType::Integer, c, None),
            Some((MatchKind::Float, c)) => (InferredType::Float, c, None),
            Some((MatchKind::Boolean, c)) => (InferredType::Boolean, c, None),
            Some((MatchKind::Date, c)) => (InferredType::Date, c, None),
            Some((MatchKind::Pattern(p), c)) => (text_type, c, Some(p)),
            None => (text_type, unmatched, None),
        };

        if inferred_type != InferredType::Boolean
            && self.is_identifier(&column.name, non_null.len(), distinct_ratio, &counts, sampled)
        {
            inferred_type = InferredType::Identifier;
        }

        let patterns = self.detected_patterns(&counts, sampled);
        let statistics = self.statistics(
            &non_null,
            &value_counts,
            inferred_type,
            total,
            null_count,
            &counts,
            sampled,
        );

        ColumnProfile {
            name: column.name.clone(),
            inferred_type,
            confidence: ratio(matched, sampled),
            null_ratio: ratio(null_count, total),
            distinct_ratio,
            nullable: null_count > 0,
            pattern,
            patterns,
            sampled,
            matched,
            statistics,
            missing_markers: detect_missing_markers(&non_null),
        }
    }

    /// Evenly strided sample; small columns are taken whole.
    fn sample<'a>(&self, values: &[&'a CellValue]) -> Vec<&'a CellValue> {
        let limit = self.config.sample_size.max(1);
        if values.len() <= limit {
            return values.to_vec();
        }
        let step = values.len() as f64 / limit as f64;
        (0..limit)
            .map(|i| values[((i as f64 * step) as usize).min(values.len() - 1)])
            .collect()
    }

    /// Match counts per matcher, plus the number of values no matcher accepted.
    fn score(&self, sample: &[&CellValue]) -> (Vec<(MatchKind, usize)>, usize) {
        let mut counts: Vec<(MatchKind, usize)> =
            self.matchers.iter().map(|m| (m.kind(), 0)).collect();
        let mut unmatched = 0;

        for value in sample {
            let mut any = false;
            for (slot, matcher) in counts.iter_mut().zip(&self.matchers) {
                if matcher.matches(value) {
                    slot.1 += 1;
                    any = true;
                }
            }
            if !any {
                unmatched += 1;
            }
        }

        (counts, unmatched)
    }

    /// Highest ratio above the threshold; ties keep the earlier matcher.
    fn pick_winner(&self, counts: &[(MatchKind, usize)], sampled: usize) -> Option<(MatchKind, usize)> {
        let mut best: Option<(MatchKind, usize)> = None;
        for &(kind, count) in counts {
            if ratio(count, sampled) < self.config.min_match_ratio {
                continue;
            }
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((kind, count));
            }
        }
        best
    }

    /// Categorical or free text, by cardinality.
    fn text_type(&self, distinct_count: usize, distinct_ratio: f64) -> InferredType {
        let low_ratio = distinct_ratio <= self.config.categorical_ratio;
        let few_values =
            distinct_count <= self.config.categorical_max_distinct && distinct_ratio <= 0.5;
        if low_ratio || few_values {
            InferredType::Categorical
        } else {
            InferredType::FreeText
        }
    }

    fn is_identifier(
        &self,
        name: &str,
        non_null: usize,
        distinct_ratio: f64,
        counts: &[(MatchKind, usize)],
        sampled: usize,
    ) -> bool {
        if distinct_ratio < self.config.identifier_ratio || non_null < 2 {
            return false;
        }
        if is_identifier_name(name) {
            return true;
        }
        let all_match = |kind: MatchKind| {
            counts
                .iter()
                .any(|&(k, c)| k == kind && c == sampled)
        };
        non_null >= self.config.identifier_min_values
            && (all_match(MatchKind::Integer) || all_match(MatchKind::Pattern(PatternKind::Uuid)))
    }

    fn detected_patterns(&self, counts: &[(MatchKind, usize)], sampled: usize) -> Vec<PatternMatch> {
        counts
            .iter()
            .filter_map(|&(kind, count)| match kind {
                MatchKind::Pattern(pattern) => Some((pattern, ratio(count, sampled))),
                _ => None,
            })
            .filter(|&(_, r)| r > 0.0 && r >= self.config.pattern_report_ratio)
            .map(|(pattern, match_ratio)| PatternMatch {
                pattern,
                match_ratio,
            })
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn statistics(
        &self,
        non_null: &[&CellValue],
        value_counts: &IndexMap<String, usize>,
        inferred_type: InferredType,
        count: usize,
        null_count: usize,
        counts: &[(MatchKind, usize)],
        sampled: usize,
    ) -> ColumnStatistics {
        let numeric_identifier = inferred_type == InferredType::Identifier
            && counts
                .iter()
                .any(|&(k, c)| k == MatchKind::Integer && c == sampled);

        let numeric = if inferred_type.is_numeric() || numeric_identifier {
            let values: Vec<f64> = non_null.iter().filter_map(|v| v.as_f64()).collect();
            stats::describe(&values)
        } else {
            None
        };

        let string = match inferred_type {
            InferredType::Categorical | InferredType::FreeText => string_statistics(non_null),
            InferredType::Identifier if !numeric_identifier => string_statistics(non_null),
            _ => None,
        };

        let date_range = if inferred_type == InferredType::Date {
            date_range(non_null)
        } else {
            None
        };

        let top_values = match inferred_type {
            InferredType::Boolean
            | InferredType::Date
            | InferredType::Categorical
            | InferredType::FreeText => self.top_values(value_counts),
            _ => Vec::new(),
        };

        ColumnStatistics {
            count,
            null_count,
            distinct_count: value_counts.len(),
            numeric,
            string,
            date_range,
            top_values,
        }
    }

    /// Most frequent values; ties keep first appearance.
    fn top_values(&self, value_counts: &IndexMap<String, usize>) -> Vec<ValueCount> {
        let mut entries: Vec<(&String, &usize)> = value_counts.iter().collect();
        // Stable sort keeps insertion order among equal counts.
        entries.sort_by(|a, b| b.1.cmp(a.1));
        entries
            .into_iter()
            .take(self.config.top_values)
            .map(|(value, &count)| ValueCount {
                value: value.clone(),
                count,
            })
            .collect()
    }
}

impl Default for TypeProfiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a column name looks like a key (`id`, `user_id`, `userId`, `uuid`, ...).
pub fn is_identifier_name(name: &str) -> bool {
    let trimmed = name.trim();
    IDENTIFIER_NAME.is_match(trimmed) || CAMEL_IDENTIFIER_NAME.is_match(trimmed)
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn string_statistics(values: &[&CellValue]) -> Option<StringStatistics> {
    let lengths: Vec<usize> = values.iter().map(|v| v.as_text().chars().count()).collect();
    if lengths.is_empty() {
        return None;
    }

    let min_length = *lengths.iter().min().unwrap_or(&0);
    let max_length = *lengths.iter().max().unwrap_or(&0);
    let avg_length = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;

    Some(StringStatistics {
        min_length,
        max_length,
        avg_length,
    })
}

fn date_range(values: &[&CellValue]) -> Option<DateRange> {
    let mut dates = values.iter().filter_map(|v| match v {
        CellValue::Text(s) => parse_date(s),
        _ => None,
    });
    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));

    Some(DateRange {
        min: min.format("%Y-%m-%d").to_string(),
        max: max.format("%Y-%m-%d").to_string(),
        span_days: (max - min).num_days(),
    })
}

/// Non-standard missing value markers appearing at least twice.
fn detect_missing_markers(values: &[&CellValue]) -> Vec<String> {
    let mut marker_counts: BTreeMap<&'static str, usize> = BTreeMap::new();

    for value in values {
        let CellValue::Text(text) = value else {
            continue;
        };
        let lower = text.trim().to_lowercase();
        if let Some(&marker) = SUSPICIOUS_MARKERS.iter().find(|&&m| m == lower) {
            *marker_counts.entry(marker).or_insert(0) += 1;
        }
    }

    marker_counts
        .into_iter()
        .filter(|&(_, count)| count >= 2)
        .map(|(marker, _)| marker.to_string())
        .collect()
}
