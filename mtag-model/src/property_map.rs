use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from an uppercase key (ASCII `[A-Z0-9_:]`) to an ordered
/// sequence of text values. Keys outside the declared schema (see
/// [`crate::PROPERTY_SCHEMA`]) pass through verbatim to the underlying
/// format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap {
    entries: BTreeMap<String, Vec<String>>,
}

/// A key must be non-empty and made only of `[A-Z0-9_:]`.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_' || b == b':')
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ordered values for `key`, or an empty slice if absent.
    pub fn get(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the first value for `key`, if any.
    pub fn get_one(&self, key: &str) -> Option<&str> {
        self.get(key).first().map(String::as_str)
    }

    /// Sets the values for `key`. An empty `values` deletes the key.
    pub fn set(&mut self, key: impl Into<String>, values: Vec<String>) {
        let key = key.into();
        if values.is_empty() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, values);
        }
    }

    /// Convenience for the common single-value case.
    pub fn set_one(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key, vec![value.into()]);
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
