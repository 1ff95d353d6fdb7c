//! Lenient numeric coercion for line fields.
//!
//! The record editor autosaves partially-typed rows, so numeric fields may
//! arrive as numbers, numeric strings, blanks or garbage. Blank input is
//! treated as absent (the field default applies); anything that does not
//! parse is zero. Coercion never fails.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Coerce text to a number. `None` for blank input, `Some(0.0)` for text
/// that is not a finite number. Thousands separators are ignored.
pub fn coerce(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned = trimmed.replace(',', "");
    let value = cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);
    Some(value)
}

/// Like [`coerce`] but absent input is zero.
pub fn flt(raw: &str) -> f64 {
    coerce(raw).unwrap_or(0.0)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
    Flag(bool),
    /// Arrays, objects and anything else a client might send.
    Other(IgnoredAny),
}

impl RawNumber {
    fn into_value(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            Self::Text(s) => coerce(&s),
            Self::Flag(b) => Some(if b { 1.0 } else { 0.0 }),
            Self::Other(_) => Some(0.0),
        }
    }
}

/// `deserialize_with` target for `Option<f64>` fields.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawNumber> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(RawNumber::into_value))
}

/// `deserialize_with` target for derived `f64` fields.
pub fn lenient_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient(deserializer)?.unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient")]
        qty: Option<f64>,
    }

    fn probe(json: &str) -> Option<f64> {
        serde_json::from_str::<Probe>(json).unwrap().qty
    }

    #[test]
    fn coerce_blank_is_absent() {
        assert_eq!(coerce(""), None);
        assert_eq!(coerce("   "), None);
    }

    #[test]
    fn coerce_garbage_is_zero() {
        assert_eq!(coerce("abc"), Some(0.0));
        assert_eq!(coerce("1.2.3"), Some(0.0));
        assert_eq!(coerce("inf"), Some(0.0));
    }

    #[test]
    fn coerce_strips_thousands_separator() {
        assert_eq!(coerce("1,250.50"), Some(1250.5));
        assert_eq!(coerce(" -3 "), Some(-3.0));
    }

    #[test]
    fn flt_defaults_to_zero() {
        assert_eq!(flt(""), 0.0);
        assert_eq!(flt("7"), 7.0);
    }

    #[test]
    fn lenient_accepts_every_scalar_shape() {
        assert_eq!(probe(r#"{"qty": 2}"#), Some(2.0));
        assert_eq!(probe(r#"{"qty": 2.5}"#), Some(2.5));
        assert_eq!(probe(r#"{"qty": "4"}"#), Some(4.0));
        assert_eq!(probe(r#"{"qty": ""}"#), None);
        assert_eq!(probe(r#"{"qty": "x"}"#), Some(0.0));
        assert_eq!(probe(r#"{"qty": null}"#), None);
        assert_eq!(probe(r#"{"qty": true}"#), Some(1.0));
        assert_eq!(probe("{}"), None);
    }

    #[test]
    fn lenient_zeroes_structured_values() {
        assert_eq!(probe(r#"{"qty": []}"#), Some(0.0));
        assert_eq!(probe(r#"{"qty": [1, 2]}"#), Some(0.0));
        assert_eq!(probe(r#"{"qty": {"n": 3}}"#), Some(0.0));
    }
}
