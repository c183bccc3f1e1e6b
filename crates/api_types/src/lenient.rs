//! Forgiving number deserializers for form-like payloads.
//!
//! Numbers and numeric strings are accepted; `null`, empty strings and any
//! other value become `0` (or `None` for the optional variants). Use with
//! `#[serde(default, deserialize_with = "...")]`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn as_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

fn map_of<'de, D, T>(
    deserializer: D,
    convert: fn(&Value) -> Option<T>,
) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(object) = value else {
        return Ok(BTreeMap::new());
    };
    Ok(object
        .into_iter()
        .map(|(key, value)| {
            let converted = convert(&value).unwrap_or_default();
            (key, converted)
        })
        .collect())
}

pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(as_f64(&Value::deserialize(deserializer)?).unwrap_or(0.0))
}

pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(as_i64(&Value::deserialize(deserializer)?).unwrap_or(0))
}

/// `None` for `null`, empty strings and anything that is not a number.
pub fn optional_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    Ok(as_f64(&Value::deserialize(deserializer)?))
}

pub fn number_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, f64>, D::Error> {
    map_of(deserializer, as_f64)
}

pub fn integer_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, i64>, D::Error> {
    map_of(deserializer, as_i64)
}

/// `None` unless the value is an object.
pub fn optional_number_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, f64>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let Value::Object(object) = value else {
        return Ok(None);
    };
    Ok(Some(
        object
            .into_iter()
            .map(|(key, value)| (key, as_f64(&value).unwrap_or(0.0)))
            .collect(),
    ))
}
