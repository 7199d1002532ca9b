//! Raw cell values as handed over by the loading collaborators.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Largest float that still has an exact integer representation.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// A single cell: either a native scalar or raw text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Check if a text value represents a missing/null value.
    pub fn is_null_text(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }

    /// Whether this cell counts as missing.
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(f) => !f.is_finite(),
            CellValue::Text(s) => Self::is_null_text(s),
            CellValue::Bool(_) | CellValue::Int(_) => false,
        }
    }

    /// Text form of the cell, trimmed. Natives are formatted.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed(""),
            CellValue::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
            CellValue::Text(s) => Cow::Borrowed(s.trim()),
        }
    }

    /// Numeric value, if the cell is a finite number or parses as one.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            CellValue::Int(i) => *i as f64,
            CellValue::Float(f) => *f,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Null | CellValue::Bool(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Integer value. Integral floats, native or written as text, are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(i) => Some(*i),
            CellValue::Float(f) => integral(*f),
            CellValue::Text(s) => parse_integral(s.trim()),
            _ => None,
        }
    }

    /// Normalized key used for distinct counting and cross-table overlap.
    ///
    /// `42`, `42.0`, `"42.0"` and `" 42 "` share the key `"42"`.
    pub fn key(&self) -> String {
        match self {
            CellValue::Float(f) => match integral(*f) {
                Some(i) => i.to_string(),
                None => f.to_string(),
            },
            CellValue::Text(s) => {
                let trimmed = s.trim();
                match parse_integral(trimmed) {
                    Some(i) => i.to_string(),
                    None => trimmed.to_string(),
                }
            }
            other => other.as_text().into_owned(),
        }
    }
}

fn integral(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT_INT)
        .then_some(value as i64)
}

/// Whole numbers in text, including forms like `42.0` written by float exporters.
fn parse_integral(text: &str) -> Option<i64> {
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(integral))
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_markers() {
        assert!(CellValue::from("NA").is_null());
        assert!(CellValue::from("  ").is_null());
        assert!(CellValue::from("null").is_null());
        assert!(CellValue::Float(f64::NAN).is_null());
        assert!(!CellValue::from("0").is_null());
        assert!(!CellValue::Int(0).is_null());
    }

    #[test]
    fn test_keys_unify_numbers() {
        assert_eq!(CellValue::Int(42).key(), "42");
        assert_eq!(CellValue::Float(42.0).key(), "42");
        assert_eq!(CellValue::from(" 42 ").key(), "42");
        assert_eq!(CellValue::from("abc ").key(), "abc");
    }

    #[test]
    fn test_integral_float_text_matches_integers() {
        assert_eq!(CellValue::from("42.0").key(), "42");
        assert_eq!(CellValue::from("42.0").key(), CellValue::Float(42.0).key());
        assert_eq!(CellValue::from("42.0").as_i64(), Some(42));
        assert_eq!(CellValue::from("-7.00").as_i64(), Some(-7));
        assert_eq!(CellValue::from("42.5").key(), "42.5");
        assert_eq!(CellValue::from("42.5").as_i64(), None);
        assert_eq!(CellValue::from("inf").as_i64(), None);
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(CellValue::from("3.5").as_f64(), Some(3.5));
        assert_eq!(CellValue::from("nan").as_f64(), None);
        assert_eq!(CellValue::Float(7.0).as_i64(), Some(7));
        assert_eq!(CellValue::Float(7.5).as_i64(), None);
        assert_eq!(CellValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_untagged_json() {
        let values: Vec<CellValue> = serde_json::from_str(r#"[null, true, 3, 2.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                CellValue::Null,
                CellValue::Bool(true),
                CellValue::Int(3),
                CellValue::Float(2.5),
                CellValue::Text("x".to_string()),
            ]
        );
    }
}
