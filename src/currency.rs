//! Currency normalization helpers for lead values.
//!
//! Deterministic pure functions. Only the USD↔INR pair is convertible, at a
//! fixed rate; anything else passes through unchanged. No live exchange-rate
//! lookup by design.

use serde_json::Value;

/// Fixed conversion rate: 1 USD = 83 INR.
pub const USD_INR_RATE: f64 = 83.0;

/// Coerce an arbitrary JSON value to a finite number.
///
/// Nulls, booleans, non-numeric strings, arrays, objects and non-finite
/// results all degrade to 0.
pub fn parse_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Convert `amount` between currencies.
///
/// Identity when the currencies match (case-insensitive) or the amount is
/// zero/non-finite. Unsupported pairs return the amount unconverted.
pub fn convert(amount: f64, from: &str, to: &str) -> f64 {
    if from.eq_ignore_ascii_case(to) || amount == 0.0 || !amount.is_finite() {
        return amount;
    }
    let from = from.to_ascii_uppercase();
    let to = to.to_ascii_uppercase();
    match (from.as_str(), to.as_str()) {
        ("USD", "INR") => amount * USD_INR_RATE,
        ("INR", "USD") => amount / USD_INR_RATE,
        _ => amount,
    }
}

/// Format an amount for display: round to the nearest integer, group
/// thousands, and attach the currency symbol (`₹`/`$`) or raw code.
pub fn format(amount: f64, currency: &str) -> String {
    let rounded = if amount.is_finite() { amount.round() as i64 } else { 0 };
    let grouped = group_thousands(rounded);
    match currency.to_ascii_uppercase().as_str() {
        "INR" => format!("₹{}", grouped),
        "USD" => format!("${}", grouped),
        _ => format!("{} {}", grouped, currency),
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    let first = digits.len() % 3;
    if first > 0 {
        out.push_str(&digits[..first]);
    }
    for (i, chunk) in digits[first..].as_bytes().chunks(3).enumerate() {
        if first > 0 || i > 0 {
            out.push(',');
        }
        out.push_str(std::str::from_utf8(chunk).unwrap());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_number_coercion() {
        assert_eq!(parse_number(&json!(42)), 42.0);
        assert_eq!(parse_number(&json!(12.5)), 12.5);
        assert_eq!(parse_number(&json!("  830 ")), 830.0);
        assert_eq!(parse_number(&json!("not a number")), 0.0);
        assert_eq!(parse_number(&json!(null)), 0.0);
        assert_eq!(parse_number(&json!(true)), 0.0);
        assert_eq!(parse_number(&json!([1, 2])), 0.0);
        assert_eq!(parse_number(&json!("inf")), 0.0);
    }

    #[test]
    fn test_convert_supported_pair() {
        assert_eq!(convert(100.0, "USD", "INR"), 8300.0);
        assert_eq!(convert(830.0, "INR", "USD"), 10.0);
    }

    #[test]
    fn test_convert_identity_and_unsupported() {
        assert_eq!(convert(100.0, "USD", "USD"), 100.0);
        assert_eq!(convert(100.0, "usd", "USD"), 100.0);
        assert_eq!(convert(100.0, "USD", "EUR"), 100.0);
        assert_eq!(convert(0.0, "USD", "INR"), 0.0);
    }

    #[test]
    fn test_format_symbols_and_grouping() {
        assert_eq!(format(1234567.0, "INR"), "₹1,234,567");
        assert_eq!(format(1234567.0, "USD"), "$1,234,567");
        assert_eq!(format(1234.4, "USD"), "$1,234");
        assert_eq!(format(999.0, "INR"), "₹999");
        assert_eq!(format(1500.0, "EUR"), "1,500 EUR");
        assert_eq!(format(-1234567.0, "USD"), "$-1,234,567");
        assert_eq!(format(0.0, "USD"), "$0");
    }
}
