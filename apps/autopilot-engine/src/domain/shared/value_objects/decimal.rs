//! Lenient decimal parsing for externally supplied numbers.
//!
//! Commands and snapshots arrive from agents, UIs and broker bridges that do
//! not agree on number encoding. A value that is absent, `null`, or not a
//! number decodes to `None` instead of failing the whole payload; the risk
//! rules then decide what a missing value means.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Convert a JSON value into a decimal.
///
/// Accepts JSON numbers (including exponent notation) and numeric strings.
#[must_use]
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Serde adapter: `#[serde(default, deserialize_with = "lenient_decimal")]`.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "lenient_decimal")]
        value: Option<Decimal>,
    }

    fn decode(raw: &str) -> Option<Decimal> {
        serde_json::from_str::<Holder>(raw).unwrap().value
    }

    #[test]
    fn decodes_numbers_exactly() {
        assert_eq!(decode(r#"{"value": -399.99}"#), Some(dec!(-399.99)));
        assert_eq!(decode(r#"{"value": 10}"#), Some(dec!(10)));
    }

    #[test]
    fn decodes_numeric_strings() {
        assert_eq!(decode(r#"{"value": " 1.2345 "}"#), Some(dec!(1.2345)));
    }

    #[test]
    fn decodes_exponent_notation() {
        assert_eq!(decimal_from_json(&json!(1e3)), Some(dec!(1000)));
    }

    #[test]
    fn missing_null_and_garbage_become_none() {
        assert_eq!(decode("{}"), None);
        assert_eq!(decode(r#"{"value": null}"#), None);
        assert_eq!(decode(r#"{"value": "abc"}"#), None);
        assert_eq!(decode(r#"{"value": [1]}"#), None);
        assert_eq!(decode(r#"{"value": ""}"#), None);
    }
}
