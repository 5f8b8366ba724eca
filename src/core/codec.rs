// Pure codec between the flat `key=v1,v2;key2=v` HAL string and `ParameterMap`.
// No escaping or trimming; value order within a key is preserved, key order is not.
use std::collections::HashMap;
use std::collections::hash_map;

use serde::Serialize;

pub const ENTRY_SEPARATOR: char = ';';
pub const KEY_VALUE_SEPARATOR: char = '=';
pub const VALUE_SEPARATOR: char = ',';

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterMap {
    entries: HashMap<String, Vec<String>>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// First value stored for `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Replaces the values of `key`. Returns `false` and leaves the map
    /// untouched when the entry could not survive a round trip through
    /// `serialize` and `parse`: an empty key, no values, or a lone empty value.
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) -> bool {
        let key = key.into();
        let lone_empty = matches!(values.as_slice(), [only] if only.is_empty());
        if key.is_empty() || values.is_empty() || lone_empty {
            return false;
        }
        self.entries.insert(key, values);
        true
    }

    pub fn insert_value(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        self.insert(key, vec![value.into()])
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }
}

pub struct Iter<'a> {
    inner: hash_map::Iter<'a, String, Vec<String>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [String]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a ParameterMap {
    type Item = (&'a str, &'a [String]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub fn parse(text: &str) -> ParameterMap {
    let mut map = ParameterMap::new();
    for part in text.split(ENTRY_SEPARATOR) {
        let Some((key, value)) = part.split_once(KEY_VALUE_SEPARATOR) else {
            continue;
        };
        if key.is_empty() || value.is_empty() {
            continue;
        }
        tracing::trace!(key, value, "param");
        let values = value.split(VALUE_SEPARATOR).map(str::to_string).collect();
        map.insert(key, values);
    }
    map
}

pub fn serialize(map: &ParameterMap) -> String {
    let mut out = String::new();
    for (key, values) in map {
        if !out.is_empty() {
            out.push(ENTRY_SEPARATOR);
        }
        out.push_str(key);
        out.push(KEY_VALUE_SEPARATOR);
        for (index, value) in values.iter().enumerate() {
            if index > 0 {
                out.push(VALUE_SEPARATOR);
            }
            out.push_str(value);
        }
    }
    out
}
