//! String to typed value conversion
//!
//! Shared by the query codec and the route matcher. Precedence for a string is
//! fixed: booleans, `null`, `undefined`, numbers, then separator splitting, then
//! the raw string. Numbers are tried before splitting, so a numeric string is
//! never split.

use crate::config::{ArrayFormat, QueryConfig};
use crate::value::Value;

/// Coerce a value, recursing into arrays and objects.
///
/// Non-string scalars pass through unchanged, which makes the conversion
/// idempotent.
pub fn convert_type(value: Value, config: &QueryConfig) -> Value {
    match value {
        Value::String(s) => convert_string(s, config),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| convert_type(item, config))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, convert_type(v, config)))
                .collect(),
        ),
        other => other,
    }
}

/// Coerce a single raw string
pub fn convert_str(raw: &str, config: &QueryConfig) -> Value {
    convert_string(raw.to_string(), config)
}

fn convert_string(raw: String, config: &QueryConfig) -> Value {
    match raw.as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        "undefined" => return Value::Undefined,
        "" => return Value::String(raw),
        _ => {}
    }

    if let Some(n) = parse_number(&raw) {
        return Value::Number(n);
    }

    let separator = config.array.separator.as_str();
    if config.array.format == ArrayFormat::Separator
        && !separator.is_empty()
        && raw.contains(separator)
    {
        return Value::Array(raw.split(separator).map(Value::from).collect());
    }

    Value::String(raw)
}

/// Numeric parse with the leniency of a browser `Number()` conversion:
/// surrounding whitespace, `Infinity`, and `0x`/`0o`/`0b` prefixes.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        let stripped = trimmed
            .strip_prefix(prefix)
            .or_else(|| trimmed.strip_prefix(&prefix.to_ascii_uppercase()));
        if let Some(digits) = stripped {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    // Rejects the spellings Rust accepts but a query string never means as a
    // number ("inf", "nan", "1_0").
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return None;
    }

    trimmed.parse::<f64>().ok()
}
