//! Internal helpers for model validation and conversion.

use std::collections::BTreeMap;

use serde::{Serialize, de::DeserializeOwned};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

pub(crate) fn parse_optional_uuid(value: Option<&str>, label: &str) -> ResultEngine<Option<Uuid>> {
    value.map(|v| parse_uuid(v, label)).transpose()
}

/// Trimmed, NFC-normalized name; empty names are rejected.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(normalized)
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.nfc().collect())
}

/// JSON text column → typed value.
pub(crate) fn from_json_column<T: DeserializeOwned>(value: &str) -> ResultEngine<T> {
    serde_json::from_str(value).map_err(Into::into)
}

pub(crate) fn to_json_column<T: Serialize>(value: &T) -> ResultEngine<String> {
    serde_json::to_string(value).map_err(Into::into)
}

/// Product maps keyed by NFC names, dropping blank keys.
pub(crate) fn normalize_keys<V>(map: BTreeMap<String, V>) -> BTreeMap<String, V> {
    map.into_iter()
        .filter_map(|(key, value)| {
            let key: String = key.trim().nfc().collect();
            (!key.is_empty()).then_some((key, value))
        })
        .collect()
}
