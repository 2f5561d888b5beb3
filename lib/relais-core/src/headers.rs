//! Case-insensitive header map.
//!
//! HTTP header names are case-insensitive; [`HeaderMap`] normalizes names to
//! lowercase at insertion so that `ETag`, `etag`, and `Etag` are the same key.

use std::collections::HashMap;
use std::collections::hash_map;

/// A header map with case-insensitive keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: HashMap<String, String>,
}

impl HeaderMap {
    /// Creates an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header, replacing any previous value for the same name.
    ///
    /// Returns the previous value, if any.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.entries
            .insert(name.as_ref().to_ascii_lowercase(), value.into())
    }

    /// Single header value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Removes a header, returning its value if present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(&name.to_ascii_lowercase())
    }

    /// Returns `true` if a header with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (name, value) pairs. Names are lowercase.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

impl<N: AsRef<str>, V: Into<String>> Extend<(N, V)> for HeaderMap {
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl IntoIterator for HeaderMap {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", "application/json");

        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
        assert!(headers.contains("Content-type"));
    }

    #[test]
    fn insert_replaces_across_cases() {
        let mut headers = HeaderMap::new();
        headers.insert("ETag", "\"v1\"");
        let previous = headers.insert("etag", "\"v2\"");

        assert_eq!(previous.as_deref(), Some("\"v1\""));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Etag"), Some("\"v2\""));
    }

    #[test]
    fn remove_ignores_case() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "token abc");

        assert_eq!(headers.remove("AUTHORIZATION").as_deref(), Some("token abc"));
        assert!(headers.is_empty());
    }

    #[test]
    fn from_iterator() {
        let headers: HeaderMap = [("Accept", "application/json"), ("X-RateLimit-Limit", "60")]
            .into_iter()
            .collect();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("accept"), Some("application/json"));
        assert_eq!(headers.get("x-ratelimit-limit"), Some("60"));
    }
}
