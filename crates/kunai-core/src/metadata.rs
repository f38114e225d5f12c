//! Persisted key-value tree.
//!
//! Domain objects are saved between process runs as a nested map of short
//! string keys to scalars, strings, or nested maps. The short key names used
//! by each codec are an on-disk contract and live with the codec that owns
//! them. Keys iterate in sorted order; codecs that need sequence order
//! encode it in the key itself (e.g. numbered suffixes).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A single value in the persisted tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// String value.
    Str(String),
    /// Nested record.
    Map(Metadata),
}

/// A nested string-keyed record in the persisted tree.
///
/// Getters take a default (or return `Option`) rather than failing, because
/// absence of a key is a valid prior state for most fields. The JSON form is
/// the durable representation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: BTreeMap<String, MetaValue>,
}

impl Metadata {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any existing value under the same key.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns the string value under `key`, if present and a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(MetaValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the string value under `key`, or `default` when absent.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_str(key).unwrap_or(default)
    }

    /// Returns the integer value under `key`, or `default` when absent or
    /// not an integer.
    #[must_use]
    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        match self.entries.get(key) {
            Some(MetaValue::Int(i)) => *i,
            _ => default,
        }
    }

    /// Returns the boolean value under `key`, or `default` when absent or
    /// not a boolean.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.entries.get(key) {
            Some(MetaValue::Bool(b)) => *b,
            _ => default,
        }
    }

    /// Returns the nested record under `key`, if present and a record.
    #[must_use]
    pub fn get_map(&self, key: &str) -> Option<&Metadata> {
        match self.entries.get(key) {
            Some(MetaValue::Map(m)) => Some(m),
            _ => None,
        }
    }

    /// Returns the nested record under `key`, failing when absent.
    ///
    /// ## Errors
    /// Returns [`CoreError::MissingRecord`] if the key is absent or not a
    /// record.
    pub fn require_map(&self, key: &str) -> CoreResult<&Metadata> {
        self.get_map(key)
            .ok_or_else(|| CoreError::MissingRecord(key.to_string()))
    }

    /// Returns whether the record contains `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of keys in this record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether this record has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the record to its durable JSON form.
    ///
    /// ## Errors
    /// Returns [`CoreError::ParseError`] if serialization fails.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(|e| CoreError::ParseError(e.to_string()))
    }

    /// Deserializes a record from its durable JSON form.
    ///
    /// ## Errors
    /// Returns [`CoreError::ParseError`] if the input is not a valid record.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::ParseError(e.to_string()))
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for MetaValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<usize> for MetaValue {
    fn from(v: usize) -> Self {
        // Persisted counts are small; saturate rather than panic on the
        // pathological case.
        Self::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Metadata> for MetaValue {
    fn from(v: Metadata) -> Self {
        Self::Map(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters_with_defaults() {
        let mut meta = Metadata::new();
        meta.put("n", "ATTACH");
        meta.put("seq", 7i64);
        meta.put("flag", true);

        assert_eq!(meta.get_str("n"), Some("ATTACH"));
        assert_eq!(meta.get_or("missing", "dflt"), "dflt");
        assert_eq!(meta.get_i64("seq", 0), 7);
        assert_eq!(meta.get_i64("missing", 42), 42);
        assert!(meta.get_bool("flag", false));
        assert!(!meta.get_bool("missing", false));
    }

    #[test]
    fn nested_records() {
        let mut inner = Metadata::new();
        inner.put("v", "value");
        let mut meta = Metadata::new();
        meta.put("x0", inner);

        assert_eq!(
            meta.get_map("x0").and_then(|m| m.get_str("v")),
            Some("value")
        );
        assert!(meta.get_map("x1").is_none());
        assert!(meta.require_map("x1").is_err());
    }

    #[test]
    fn json_round_trip() {
        let mut inner = Metadata::new();
        inner.put("n", "X-FOO");
        let mut meta = Metadata::new();
        meta.put("numX", 1i64);
        meta.put("x0", inner);
        meta.put("ok", true);

        let json = meta.to_json().unwrap();
        let back = Metadata::from_json(&json).unwrap();
        assert_eq!(meta, back);
    }

    #[test]
    fn wrong_type_yields_default() {
        let mut meta = Metadata::new();
        meta.put("k", "text");
        assert_eq!(meta.get_i64("k", 9), 9);
        assert!(meta.get_map("k").is_none());
    }
}
