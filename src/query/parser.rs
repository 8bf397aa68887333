// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Sorting and grouping of query results.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::base::QueryProperty;
use crate::common::PropValue;
use crate::{Error, ErrorKind, Result};

/// Name of the group collecting results that match no range.
pub const UNGROUPED: &str = "ungrouped results";

/// Sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<SortOrder> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Unknown sort order {}, expected asc or desc", s),
            )),
        }
    }
}

/// Results, either as a single list or split into named groups.
#[derive(Debug, Clone, PartialEq)]
pub enum Grouping<T> {
    /// Results are not grouped.
    Flat(T),
    /// Named groups in their order.
    Grouped(Vec<(String, T)>),
}

impl<T> Grouping<T> {
    /// Apply a function to every group.
    pub fn map<U, F>(self, mut f: F) -> Grouping<U>
    where
        F: FnMut(T) -> U,
    {
        match self {
            Grouping::Flat(value) => Grouping::Flat(f(value)),
            Grouping::Grouped(groups) => Grouping::Grouped(
                groups
                    .into_iter()
                    .map(|(name, value)| (name, f(value)))
                    .collect(),
            ),
        }
    }

    /// Borrow the contents.
    pub fn as_ref(&self) -> Grouping<&T> {
        match self {
            Grouping::Flat(value) => Grouping::Flat(value),
            Grouping::Grouped(groups) => {
                Grouping::Grouped(groups.iter().map(|(name, value)| (name.clone(), value)).collect())
            }
        }
    }

    /// Iterate over groups with their names (`None` for flat results).
    pub fn groups(&self) -> Vec<(Option<&str>, &T)> {
        match self {
            Grouping::Flat(value) => vec![(None, value)],
            Grouping::Grouped(groups) => groups
                .iter()
                .map(|(name, value)| (Some(name.as_str()), value))
                .collect(),
        }
    }
}

impl<T> Grouping<Vec<T>> {
    /// Total number of items in all groups.
    pub fn len(&self) -> usize {
        match self {
            Grouping::Flat(items) => items.len(),
            Grouping::Grouped(groups) => groups.iter().map(|(_, items)| items.len()).sum(),
        }
    }

    /// Whether there are no items at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Serialize> Serialize for Grouping<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Grouping::Flat(value) => value.serialize(serializer),
            Grouping::Grouped(groups) => {
                let mut map = serializer.serialize_map(Some(groups.len()))?;
                for (name, value) in groups {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

/// How to group results.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupBy<P> {
    /// A group for every distinct value of the property.
    Value(P),
    /// Named groups of values.
    Ranges {
        /// Property to group by.
        prop: P,
        /// Group names with the values they accept.
        ranges: Vec<(String, Vec<PropValue>)>,
        /// Whether to keep results matching no range.
        include_ungrouped: bool,
    },
}

/// Sorts and groups results.
#[derive(Clone, PartialEq)]
pub struct QueryParser<P> {
    sort_by: Vec<(P, SortOrder)>,
    group_by: Option<GroupBy<P>>,
}

impl<P: QueryProperty> QueryParser<P> {
    /// Create a parser that keeps results as they are.
    pub fn new() -> QueryParser<P> {
        QueryParser {
            sort_by: Vec::new(),
            group_by: None,
        }
    }

    /// Sort by the property; the first sort key takes precedence.
    pub fn add_sort(&mut self, prop: P, order: SortOrder) {
        self.sort_by.push((prop, order));
    }

    /// Group results by the value of the property.
    pub fn set_group_by(&mut self, prop: P) {
        self.group_by = Some(GroupBy::Value(prop));
    }

    /// Group results into named groups of values.
    ///
    /// Fails if a value belongs to more than one group or a group name is
    /// repeated.
    pub fn set_group_by_ranges(
        &mut self,
        prop: P,
        ranges: Vec<(String, Vec<PropValue>)>,
        include_ungrouped: bool,
    ) -> Result<()> {
        for (index, (name, values)) in ranges.iter().enumerate() {
            for (other_name, other_values) in &ranges[index + 1..] {
                if name == other_name {
                    return Err(Error::new(
                        ErrorKind::InvalidInput,
                        format!("Group {} is defined more than once", name),
                    ));
                }
                if let Some(value) = values
                    .iter()
                    .find(|v| other_values.iter().any(|o| v.loosely_eq(o)))
                {
                    return Err(Error::new(
                        ErrorKind::InvalidInput,
                        format!(
                            "Value {} of {} belongs to both groups {} and {}",
                            value, prop, name, other_name
                        ),
                    ));
                }
            }
        }
        self.group_by = Some(GroupBy::Ranges {
            prop,
            ranges,
            include_ungrouped,
        });
        Ok(())
    }

    /// Current sort keys.
    #[inline]
    pub fn sort_keys(&self) -> &[(P, SortOrder)] {
        &self.sort_by
    }

    /// Current grouping.
    #[inline]
    pub fn grouping(&self) -> Option<&GroupBy<P>> {
        self.group_by.as_ref()
    }

    /// Sort resources in place (stable).
    pub fn sort(&self, items: &mut Vec<P::Resource>) {
        if self.sort_by.is_empty() {
            return;
        }

        let mut keyed: Vec<(Vec<PropValue>, P::Resource)> = items
            .drain(..)
            .map(|item| {
                let keys = self
                    .sort_by
                    .iter()
                    .map(|(prop, _)| prop.value_of(&item))
                    .collect();
                (keys, item)
            })
            .collect();
        keyed.sort_by(|(first, _), (second, _)| {
            for ((x, y), (_, order)) in first.iter().zip(second.iter()).zip(&self.sort_by) {
                let result = match order {
                    SortOrder::Asc => x.sort_cmp(y),
                    SortOrder::Desc => y.sort_cmp(x),
                };
                if result != Ordering::Equal {
                    return result;
                }
            }
            Ordering::Equal
        });
        items.extend(keyed.into_iter().map(|(_, item)| item));
    }

    /// Split sorted resources into groups.
    pub fn group(&self, items: Vec<P::Resource>) -> Grouping<Vec<P::Resource>> {
        match self.group_by {
            None => Grouping::Flat(items),
            Some(GroupBy::Value(prop)) => {
                let mut groups: Vec<(String, Vec<P::Resource>)> = Vec::new();
                for item in items {
                    let key = prop.value_of(&item).to_string();
                    match groups.iter_mut().find(|(name, _)| *name == key) {
                        Some((_, group)) => group.push(item),
                        None => groups.push((key, vec![item])),
                    }
                }
                Grouping::Grouped(groups)
            }
            Some(GroupBy::Ranges {
                prop,
                ref ranges,
                include_ungrouped,
            }) => {
                let mut groups: Vec<(String, Vec<P::Resource>)> = ranges
                    .iter()
                    .map(|(name, _)| (name.clone(), Vec::new()))
                    .collect();
                let mut ungrouped = Vec::new();
                for item in items {
                    let value = prop.value_of(&item);
                    match ranges
                        .iter()
                        .position(|(_, values)| values.iter().any(|v| value.loosely_eq(v)))
                    {
                        Some(index) => groups[index].1.push(item),
                        None => ungrouped.push(item),
                    }
                }
                if include_ungrouped {
                    groups.push((UNGROUPED.to_string(), ungrouped));
                } else if !ungrouped.is_empty() {
                    debug!(
                        "Dropping {} result(s) not matching any group of {}",
                        ungrouped.len(),
                        prop
                    );
                }
                Grouping::Grouped(groups)
            }
        }
    }

    /// Sort and group resources.
    pub fn parse(&self, mut items: Vec<P::Resource>) -> Grouping<Vec<P::Resource>> {
        self.sort(&mut items);
        self.group(items)
    }
}

impl<P: QueryProperty> Default for QueryParser<P> {
    fn default() -> QueryParser<P> {
        QueryParser::new()
    }
}

impl<P: fmt::Debug> fmt::Debug for QueryParser<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParser")
            .field("sort_by", &self.sort_by)
            .field("group_by", &self.group_by)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::{Grouping, QueryParser, SortOrder, UNGROUPED};
    use crate::compute::{Flavor, FlavorProperties};
    use crate::query::testing::flavor;
    use crate::ErrorKind;

    fn flavors() -> Vec<Flavor> {
        vec![
            flavor("f1", "small", 2048),
            flavor("f2", "large", 8192),
            flavor("f3", "medium", 4096),
            flavor("f4", "small-2", 2048),
            flavor("f5", "tiny", 512),
        ]
    }

    fn names(items: &[Flavor]) -> Vec<&str> {
        items.iter().map(|f| f.name().as_str()).collect()
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!(SortOrder::from_str("DESC").unwrap(), SortOrder::Desc);
        assert_eq!(SortOrder::from_str("asc").unwrap(), SortOrder::Asc);
        assert_eq!(
            SortOrder::from_str("up").unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_sort_multiple_keys() {
        let mut parser = QueryParser::new();
        parser.add_sort(FlavorProperties::FlavorRam, SortOrder::Desc);
        parser.add_sort(FlavorProperties::FlavorName, SortOrder::Asc);
        let mut items = flavors();
        parser.sort(&mut items);
        assert_eq!(
            names(&items),
            vec!["large", "medium", "small", "small-2", "tiny"]
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let mut parser = QueryParser::new();
        parser.add_sort(FlavorProperties::FlavorRam, SortOrder::Asc);
        let mut items = flavors();
        parser.sort(&mut items);
        assert_eq!(
            names(&items),
            vec!["tiny", "small", "small-2", "medium", "large"]
        );
    }

    #[test]
    fn test_group_by_value() {
        let mut parser = QueryParser::new();
        parser.set_group_by(FlavorProperties::FlavorRam);
        match parser.parse(flavors()) {
            Grouping::Grouped(groups) => {
                let keys: Vec<_> = groups.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
                assert_eq!(
                    keys,
                    vec![("2048", 2), ("8192", 1), ("4096", 1), ("512", 1)]
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_group_by_ranges() {
        let mut parser = QueryParser::new();
        parser
            .set_group_by_ranges(
                FlavorProperties::FlavorName,
                vec![
                    ("smallish".into(), vec!["tiny".into(), "small".into()]),
                    ("empty".into(), vec!["huge".into()]),
                ],
                true,
            )
            .unwrap();
        let result = parser.parse(flavors());
        assert_eq!(result.len(), 5);
        match result {
            Grouping::Grouped(groups) => {
                assert_eq!(groups.len(), 3);
                assert_eq!(groups[0].0, "smallish");
                assert_eq!(names(&groups[0].1), vec!["small", "tiny"]);
                assert_eq!(groups[1].0, "empty");
                assert!(groups[1].1.is_empty());
                assert_eq!(groups[2].0, UNGROUPED);
                assert_eq!(names(&groups[2].1), vec!["large", "medium", "small-2"]);
            }
            other => panic!("unexpected {:?}", other),
        }

        parser
            .set_group_by_ranges(
                FlavorProperties::FlavorName,
                vec![("smallish".into(), vec!["tiny".into()])],
                false,
            )
            .unwrap();
        let result = parser.parse(flavors());
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_group_by_ranges_overlap() {
        let mut parser = QueryParser::new();
        let err = parser
            .set_group_by_ranges(
                FlavorProperties::FlavorRam,
                vec![
                    ("a".into(), vec![512.into(), 2048.into()]),
                    ("b".into(), vec![2048.into()]),
                ],
                false,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(parser.grouping().is_none());
    }

    #[test]
    fn test_grouping_serialize() {
        let grouping = Grouping::Grouped(vec![
            ("b".to_string(), vec![1, 2]),
            ("a".to_string(), vec![3]),
        ]);
        assert_eq!(
            serde_json::to_string(&grouping).unwrap(),
            r#"{"b":[1,2],"a":[3]}"#
        );
        let grouping = Grouping::Flat(vec![1]);
        assert_eq!(serde_json::to_string(&grouping).unwrap(), "[1]");
    }
}
