//! Value matchers tried by the type profiler, in priority order.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::dataset::CellValue;

use super::types::PatternKind;

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================
// Compiled once on first use.

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i)https?://\S+$").unwrap());

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\+?1?[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}|\+\d{1,3}[-.\s]?\d{4,14})$")
        .unwrap()
});

static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static POSTAL_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{5}(-\d{4})?|(?i)[A-Z]\d[A-Z] ?\d[A-Z]\d)$").unwrap()
});

/// Date-only formats, first match wins.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// Date-time formats, tried after the date-only ones.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// What a matcher recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Integer,
    Float,
    Boolean,
    Date,
    Pattern(PatternKind),
}

/// A single value recogniser.
///
/// Matchers are independent of each other; the profiler runs all of them
/// over the sample and picks a winner.
pub trait Matcher: Send + Sync {
    /// What this matcher recognises.
    fn kind(&self) -> MatchKind;

    /// Whether a non-null cell is accepted.
    fn matches(&self, value: &CellValue) -> bool;
}

/// Accepts whole numbers, including integral floats.
pub struct IntegerMatcher;

impl Matcher for IntegerMatcher {
    fn kind(&self) -> MatchKind {
        MatchKind::Integer
    }

    fn matches(&self, value: &CellValue) -> bool {
        value.as_i64().is_some()
    }
}

/// Accepts any finite number.
pub struct FloatMatcher;

impl Matcher for FloatMatcher {
    fn kind(&self) -> MatchKind {
        MatchKind::Float
    }

    fn matches(&self, value: &CellValue) -> bool {
        value.as_f64().is_some()
    }
}

/// Accepts `true/false/yes/no/0/1` in any case, and native booleans.
pub struct BooleanMatcher;

impl Matcher for BooleanMatcher {
    fn kind(&self) -> MatchKind {
        MatchKind::Boolean
    }

    fn matches(&self, value: &CellValue) -> bool {
        match value {
            CellValue::Bool(_) => true,
            CellValue::Int(i) => *i == 0 || *i == 1,
            CellValue::Text(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "false" | "yes" | "no" | "0" | "1"
            ),
            _ => false,
        }
    }
}

/// Accepts text in one of the known date or date-time formats.
pub struct DateMatcher;

impl Matcher for DateMatcher {
    fn kind(&self) -> MatchKind {
        MatchKind::Date
    }

    fn matches(&self, value: &CellValue) -> bool {
        match value {
            CellValue::Text(s) => parse_date(s).is_some(),
            _ => false,
        }
    }
}

/// Parse a date using the fixed format list; the first matching format wins.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.len() < 6 {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Accepts values whose text form matches a precompiled pattern.
pub struct RegexMatcher {
    pattern: PatternKind,
    regex: &'static Lazy<Regex>,
}

impl RegexMatcher {
    /// Matcher for one of the built-in patterns.
    pub fn new(pattern: PatternKind) -> Self {
        let regex = match pattern {
            PatternKind::Email => &EMAIL,
            PatternKind::Url => &URL,
            PatternKind::Phone => &PHONE,
            PatternKind::Uuid => &UUID,
            PatternKind::PostalCode => &POSTAL_CODE,
        };
        Self { pattern, regex }
    }
}

impl Matcher for RegexMatcher {
    fn kind(&self) -> MatchKind {
        MatchKind::Pattern(self.pattern)
    }

    fn matches(&self, value: &CellValue) -> bool {
        match value {
            CellValue::Null | CellValue::Bool(_) => false,
            other => self.regex.is_match(&other.as_text()),
        }
    }
}

/// The built-in matchers, most specific first.
pub fn default_matchers() -> Vec<Box<dyn Matcher>> {
    vec![
        Box::new(IntegerMatcher),
        Box::new(FloatMatcher),
        Box::new(BooleanMatcher),
        Box::new(DateMatcher),
        Box::new(RegexMatcher::new(PatternKind::Email)),
        Box::new(RegexMatcher::new(PatternKind::Url)),
        Box::new(RegexMatcher::new(PatternKind::Phone)),
        Box::new(RegexMatcher::new(PatternKind::Uuid)),
        Box::new(RegexMatcher::new(PatternKind::PostalCode)),
    ]
}
