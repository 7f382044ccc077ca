use serde::Serialize;
use std::collections::HashMap;

/// Free-form `name -> value` table attached to maps, layers, tilesets, tiles and objects.
///
/// TMX stores every value as text; the typed getters parse on demand and return
/// `None` when the key is absent or the text does not parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Properties(HashMap<String, String>);

impl Properties {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any earlier one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Raw text of a property.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Alias of [`Properties::get`].
    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name)
    }

    /// `true`/`1` and `false`/`0`.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }

    /// Value parsed as `i32`.
    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get(name)?.trim().parse().ok()
    }

    /// Value parsed as `i64`.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name)?.trim().parse().ok()
    }

    /// Value parsed as `f32`.
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        self.get(name)?.trim().parse().ok()
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no property was set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All `(name, value)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
