//! Lenient numeric coercion.
//!
//! Numbers arrive as JSON numbers, as bare strings, or as display text such as
//! `"$1,250.00"` or `"(25.00)"`. Everything except digits, dots and minus signs
//! is dropped, then the longest leading numeric prefix is read.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use super::patterns::{NUMERIC_PREFIX, WRAPPED_NEGATIVE};

/// Parse the leading number of `raw` after stripping currency noise.
pub fn parse_number(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .replace('\u{2212}', "-")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let prefix = NUMERIC_PREFIX.find(&cleaned)?.as_str();
    let prefix = prefix.strip_suffix('.').unwrap_or(prefix);
    Decimal::from_str(prefix).ok()
}

/// Coerce text to a number, returning `fallback` when nothing numeric is found.
pub fn to_number(raw: &str, fallback: Decimal) -> Decimal {
    parse_number(raw).unwrap_or(fallback)
}

/// Like [`to_number`], but a value wrapped in parentheses is negative.
pub fn to_currency_number(raw: &str, fallback: Decimal) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return fallback;
    }

    let parsed = to_number(trimmed, fallback);
    if WRAPPED_NEGATIVE.is_match(trimmed) {
        -parsed.abs()
    } else {
        parsed
    }
}

/// Coerce a JSON value to a number.
pub fn value_to_number(value: &Value, fallback: Decimal) -> Decimal {
    match value {
        Value::Number(number) => json_number(number).unwrap_or(fallback),
        Value::String(text) => to_number(text, fallback),
        _ => fallback,
    }
}

/// Coerce a JSON value to a currency amount.
pub fn value_to_currency(value: &Value, fallback: Decimal) -> Decimal {
    match value {
        Value::Number(number) => json_number(number).unwrap_or(fallback),
        Value::String(text) => to_currency_number(text, fallback),
        _ => fallback,
    }
}

fn json_number(number: &serde_json::Number) -> Option<Decimal> {
    if let Some(int) = number.as_i64() {
        return Some(Decimal::from(int));
    }
    if let Some(int) = number.as_u64() {
        return Some(Decimal::from(int));
    }
    let float = number.as_f64()?;
    Decimal::from_str(&float.to_string()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn test_parse_display_amounts() {
        assert_eq!(parse_number("$1,250.50"), Some(dec("1250.50")));
        assert_eq!(parse_number("  42 hrs"), Some(dec("42")));
        assert_eq!(parse_number("\u{2212}7.5"), Some(dec("-7.5")));
        assert_eq!(parse_number("3."), Some(dec("3")));
        assert_eq!(parse_number(".5"), Some(dec("0.5")));
        assert_eq!(parse_number("1.2.3"), Some(dec("1.2")));
    }

    #[test]
    fn test_parse_non_numeric() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("--5"), None);
    }

    #[test]
    fn test_to_number_fallback() {
        assert_eq!(to_number("abc", Decimal::ONE), Decimal::ONE);
        assert_eq!(to_number("", Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_currency_parentheses() {
        assert_eq!(to_currency_number("(25.00)", Decimal::ZERO), dec("-25"));
        assert_eq!(to_currency_number("-$25.00", Decimal::ZERO), dec("-25"));
        assert_eq!(to_currency_number("   ", dec("9")), dec("9"));
    }

    #[test]
    fn test_json_values() {
        assert_eq!(value_to_number(&json!(3), Decimal::ONE), dec("3"));
        assert_eq!(value_to_number(&json!(99.95), Decimal::ZERO), dec("99.95"));
        assert_eq!(value_to_number(&json!("12 units"), Decimal::ONE), dec("12"));
        assert_eq!(value_to_number(&json!(true), Decimal::ONE), Decimal::ONE);
        assert_eq!(value_to_number(&Value::Null, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(value_to_currency(&json!("(10)"), Decimal::ZERO), dec("-10"));
    }
}
