//! Flat value snapshots and the coercions applied at the snapshot boundary.
//!
//! Persisted rows arrive as loosely typed JSON scalars (`15`, `"15"`,
//! `null`). Every setter goes through one of these helpers first, so two
//! values that coerce to the same typed value never mark an item modified.

use crate::identity::{format_datetime, parse_datetime};
use crate::{StoreResult, ValidationError};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Flat mapping of namespaced keys (`product.code`) to scalar values.
pub type ItemValues = BTreeMap<String, Value>;

/// Maximum length of product, stock and supplier codes.
pub const MAX_CODE_LENGTH: usize = 64;

static INTERVAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(\d+Y)?(\d+M)?(\d+W)?(\d+D)?(T(\d+H)?(\d+M)?(\d+S)?)?$")
        .expect("interval pattern is valid")
});

/// Build an [`ItemValues`] map from key/value pairs.
pub fn values<K, I>(pairs: I) -> ItemValues
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Coerce a scalar to a string; `null` and containers yield `None`.
pub fn to_string_opt(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}

/// Coerce a scalar to a string, `null` becoming the empty string.
pub fn to_string(value: &Value) -> String {
    to_string_opt(value).unwrap_or_default()
}

/// Coerce a scalar to an integer; `null` and `""` yield `None`.
pub fn to_int_opt(field: &str, value: &Value) -> StoreResult<Option<i64>> {
    let invalid = || ValidationError::InvalidValue {
        field: field.to_string(),
        reason: format!("{} is not an integer", value),
    };

    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(i64::from(*b))),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(i))
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 9.0e18 => Ok(Some(f as i64)),
                    _ => Err(invalid().into()),
                }
            }
        }
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse::<i64>().map(Some).map_err(|_| invalid().into()),
        _ => Err(invalid().into()),
    }
}

/// Coerce a scalar to an integer, `null` becoming `0`.
pub fn to_int(field: &str, value: &Value) -> StoreResult<i64> {
    Ok(to_int_opt(field, value)?.unwrap_or(0))
}

/// Coerce a scalar to an `i32` status or position value.
pub fn to_i32(field: &str, value: &Value) -> StoreResult<i32> {
    let raw = to_int(field, value)?;
    i32::try_from(raw).map_err(|_| {
        ValidationError::OutOfRange {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "must fit into a 32 bit integer".to_string(),
        }
        .into()
    })
}

/// Validate a code value against [`MAX_CODE_LENGTH`].
pub fn check_code(field: &str, code: &str) -> StoreResult<String> {
    if code.chars().count() > MAX_CODE_LENGTH {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("code must not be longer than {} characters", MAX_CODE_LENGTH),
        }
        .into());
    }
    Ok(code.to_string())
}

/// Validate and normalise an optional date/time string.
pub fn check_datetime(field: &str, value: Option<&str>) -> StoreResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_datetime(raw)
            .map(|ts| Some(format_datetime(&ts)))
            .ok_or_else(|| {
                ValidationError::InvalidFormat {
                    field: field.to_string(),
                    value: raw.to_string(),
                    expected: "YYYY-MM-DD HH:mm:ss".to_string(),
                }
                .into()
            }),
    }
}

/// Validate an ISO-8601 period like `P1Y` or `P0Y1M2W3D`.
pub fn check_interval(field: &str, value: &str) -> StoreResult<String> {
    if value == "P" || value.ends_with('T') || !INTERVAL_RE.is_match(value) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            value: value.to_string(),
            expected: "ISO-8601 period (e.g. P1Y2M)".to_string(),
        }
        .into());
    }
    Ok(value.to_string())
}

/// Validate a decimal amount and normalise it to two fraction digits.
pub fn check_price(field: &str, value: &Value) -> StoreResult<String> {
    let invalid = || ValidationError::InvalidValue {
        field: field.to_string(),
        reason: format!("{} is not a decimal number", value),
    };

    let amount = match value {
        Value::Null => 0.0,
        Value::Number(n) => n.as_f64().ok_or_else(invalid)?,
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid())?,
        _ => return Err(invalid().into()),
    };

    if !amount.is_finite() {
        return Err(invalid().into());
    }
    Ok(format!("{:.2}", amount))
}
