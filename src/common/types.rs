// Copyright 2018 Dmitry Tantsur <divius.inside@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Types shared between services.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// Query parameters passed to a listing call.
///
/// A single set of filters is always combined with AND by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerSideFilters(BTreeMap<String, String>);

impl ServerSideFilters {
    /// Create an empty filter set.
    #[inline]
    pub fn new() -> ServerSideFilters {
        ServerSideFilters(BTreeMap::new())
    }

    /// Create a filter set with one parameter.
    pub fn single<K, V>(key: K, value: V) -> ServerSideFilters
    where
        K: Into<String>,
        V: Into<String>,
    {
        ServerSideFilters::new().with(key, value)
    }

    /// Add a parameter, returning the previous value for this key.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<String>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.insert(key.into(), value.into())
    }

    /// Add a parameter.
    #[inline]
    pub fn with<K, V>(mut self, key: K, value: V) -> ServerSideFilters
    where
        K: Into<String>,
        V: Into<String>,
    {
        let _ = self.insert(key, value);
        self
    }

    /// Value of the parameter (if set).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether no parameters are set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of parameters.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the parameters.
    #[inline]
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Whether both sets constrain at least one common parameter.
    pub fn shares_keys_with(&self, other: &ServerSideFilters) -> bool {
        self.0.keys().any(|key| other.0.contains_key(key))
    }

    /// Union of both sets; values from `other` win.
    pub fn merged(&self, other: &ServerSideFilters) -> ServerSideFilters {
        let mut result = self.clone();
        result
            .0
            .extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        result
    }

    /// Convert into query parameters, adding pagination if requested.
    pub fn to_query(&self, limit: Option<usize>, marker: Option<&str>) -> Vec<(String, String)> {
        let mut result: Vec<(String, String)> = self
            .0
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(limit) = limit {
            result.push(("limit".into(), limit.to_string()));
        }
        if let Some(marker) = marker {
            result.push(("marker".into(), marker.into()));
        }
        result
    }
}

impl<'a> IntoIterator for &'a ServerSideFilters {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ServerSideFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.0 {
            if !first {
                f.write_str("&")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::ServerSideFilters;

    #[test]
    fn test_filters_basics() {
        let filters = ServerSideFilters::single("status", "ACTIVE").with("flavor", "f1");
        assert_eq!(filters.len(), 2);
        assert_eq!(filters.get("status"), Some("ACTIVE"));
        assert_eq!(filters.get("name"), None);
        assert_eq!(filters.to_string(), "flavor=f1&status=ACTIVE");
    }

    #[test]
    fn test_filters_shared_keys() {
        let first = ServerSideFilters::single("status", "ACTIVE");
        let second = ServerSideFilters::single("status", "SHUTOFF");
        let third = ServerSideFilters::single("flavor", "f1");
        assert!(first.shares_keys_with(&second));
        assert!(!first.shares_keys_with(&third));
        assert!(!first.shares_keys_with(&ServerSideFilters::new()));
    }

    #[test]
    fn test_filters_to_query() {
        let filters = ServerSideFilters::single("status", "ACTIVE");
        assert_eq!(
            filters.to_query(Some(10), Some("abcd")),
            vec![
                ("status".to_string(), "ACTIVE".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("marker".to_string(), "abcd".to_string()),
            ]
        );
        assert_eq!(filters.to_query(None, None).len(), 1);
    }
}
