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

//! Projection of results into rows, tables and HTML.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tabled::builder::Builder;
use tabled::settings::Style;

use super::base::QueryProperty;
use super::parser::Grouping;
use crate::common::PropValue;

/// Text rendered instead of an empty table.
pub const NO_RESULTS: &str = "No results found";

/// Property values of one result, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropRow(Vec<(String, PropValue)>);

impl PropRow {
    /// An empty row.
    #[inline]
    pub fn new() -> PropRow {
        PropRow(Vec::new())
    }

    /// Set a value, keeping the position of an existing column.
    pub fn insert<S: Into<String>>(&mut self, name: S, value: PropValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((name, value)),
        }
    }

    /// Value of a column.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Column names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over columns and values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row has no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn extend(&mut self, other: &PropRow) {
        for (name, value) in &other.0 {
            self.insert(name.clone(), value.clone());
        }
    }
}

impl Serialize for PropRow {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Values of every column, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropColumns(Vec<(String, Vec<PropValue>)>);

impl PropColumns {
    /// Collect values of rows column by column.
    pub fn from_rows(rows: &[PropRow]) -> PropColumns {
        let mut columns: Vec<(String, Vec<PropValue>)> = Vec::new();
        for row in rows {
            for (name, value) in row.iter() {
                match columns.iter_mut().find(|(n, _)| n == name) {
                    Some((_, values)) => values.push(value.clone()),
                    None => columns.push((name.to_string(), vec![value.clone()])),
                }
            }
        }
        PropColumns(columns)
    }

    /// Values of a column.
    pub fn get(&self, name: &str) -> Option<&[PropValue]> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Column names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }
}

impl Serialize for PropColumns {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, values) in &self.0 {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

/// Columns of another query joined into the results.
///
/// Rows are keyed by the display form of the value of `key` in this query.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardedOutputs<P> {
    key: P,
    columns: Vec<String>,
    rows: HashMap<String, Vec<PropRow>>,
}

impl<P: QueryProperty> ForwardedOutputs<P> {
    /// Create forwarded outputs joined on the `key` property.
    pub fn new(key: P, columns: Vec<String>) -> ForwardedOutputs<P> {
        ForwardedOutputs {
            key,
            columns,
            rows: HashMap::new(),
        }
    }

    /// Add a row for the given link value.
    pub fn add_row(&mut self, value: &PropValue, row: PropRow) {
        if value.is_null() {
            return;
        }
        self.rows.entry(value.to_string()).or_default().push(row);
    }

    /// Property this query is joined on.
    #[inline]
    pub fn key(&self) -> P {
        self.key
    }

    /// Forwarded column names.
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn null_row(&self) -> PropRow {
        let mut row = PropRow::new();
        for column in &self.columns {
            row.insert(column.clone(), PropValue::Null);
        }
        row
    }

    /// Join into a row; several matches duplicate the row.
    fn join(&self, resource: &P::Resource, rows: Vec<PropRow>) -> Vec<PropRow> {
        let value = self.key.value_of(resource);
        let matches = if value.is_null() {
            None
        } else {
            self.rows.get(&value.to_string())
        };
        let null_row = [self.null_row()];
        let matches: &[PropRow] = match matches {
            Some(found) if !found.is_empty() => found,
            _ => &null_row,
        };
        rows.into_iter()
            .flat_map(|row| {
                matches.iter().map(move |forwarded| {
                    let mut result = row.clone();
                    result.extend(forwarded);
                    result
                })
            })
            .collect()
    }
}

/// Selected properties and forwarded columns of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput<P> {
    selected: Vec<P>,
    forwarded: Vec<ForwardedOutputs<P>>,
}

impl<P: QueryProperty> QueryOutput<P> {
    /// Output of all properties.
    pub fn new() -> QueryOutput<P> {
        QueryOutput {
            selected: Vec::new(),
            forwarded: Vec::new(),
        }
    }

    /// Add properties to the selection (duplicates are ignored).
    pub fn select<I: IntoIterator<Item = P>>(&mut self, props: I) {
        for prop in props {
            if !self.selected.contains(&prop) {
                self.selected.push(prop);
            }
        }
    }

    /// Select all properties.
    pub fn select_all(&mut self) {
        self.selected.clear();
    }

    /// Selected properties; all of them when nothing was selected.
    pub fn selected(&self) -> &[P] {
        if self.selected.is_empty() {
            P::all()
        } else {
            &self.selected
        }
    }

    /// Add forwarded columns.
    pub fn add_forwarded(&mut self, forwarded: ForwardedOutputs<P>) {
        self.forwarded.push(forwarded);
    }

    /// Forwarded columns.
    #[inline]
    pub fn forwarded(&self) -> &[ForwardedOutputs<P>] {
        &self.forwarded
    }

    /// Column names in output order.
    pub fn columns(&self) -> Vec<String> {
        let mut result: Vec<String> = self.selected().iter().map(|p| p.name().to_string()).collect();
        for forwarded in &self.forwarded {
            for column in forwarded.columns() {
                if !result.contains(column) {
                    result.push(column.clone());
                }
            }
        }
        result
    }

    /// Selected properties of a resource, without forwarded columns.
    pub fn own_row(&self, resource: &P::Resource) -> PropRow {
        let mut row = PropRow::new();
        for prop in self.selected() {
            row.insert(prop.name(), prop.value_of(resource));
        }
        row
    }

    /// Rows of a resource with forwarded columns joined.
    pub fn rows(&self, resource: &P::Resource) -> Vec<PropRow> {
        let mut rows = vec![self.own_row(resource)];
        for forwarded in &self.forwarded {
            rows = forwarded.join(resource, rows);
        }
        rows
    }

    /// Convert grouped resources into grouped rows.
    pub fn to_props(&self, results: &Grouping<Vec<P::Resource>>) -> Grouping<Vec<PropRow>> {
        results
            .as_ref()
            .map(|items| items.iter().flat_map(|item| self.rows(item)).collect())
    }
}

impl<P: QueryProperty> Default for QueryOutput<P> {
    fn default() -> QueryOutput<P> {
        QueryOutput::new()
    }
}

fn cell(row: &PropRow, column: &str) -> String {
    row.get(column)
        .map(ToString::to_string)
        .unwrap_or_else(|| PropValue::Null.to_string())
}

/// Render rows as text tables, one per group.
pub fn render_table(rows: &Grouping<Vec<PropRow>>, columns: &[String], title: Option<&str>) -> String {
    let mut result = String::new();
    if let Some(title) = title {
        result.push_str(&format!("{}\n", title));
    }
    if rows.is_empty() {
        result.push_str(NO_RESULTS);
        result.push('\n');
        return result;
    }

    for (name, group) in rows.groups() {
        if let Some(name) = name {
            result.push_str(&format!("{}:\n", name));
        }
        if group.is_empty() {
            result.push_str(&format!("{}\n", NO_RESULTS));
            continue;
        }
        let mut builder = Builder::default();
        builder.push_record(columns.iter().cloned());
        for row in group {
            builder.push_record(columns.iter().map(|column| cell(row, column)));
        }
        result.push_str(&format!("{}\n", builder.build().with(Style::psql())));
    }
    result
}

/// Escape text for inclusion into HTML.
pub fn escape_html(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            other => result.push(other),
        }
    }
    result
}

/// Render rows as HTML tables, one per group.
pub fn render_html(rows: &Grouping<Vec<PropRow>>, columns: &[String], title: Option<&str>) -> String {
    let mut result = String::new();
    if let Some(title) = title {
        result.push_str(&format!("<h3>{}</h3>\n", escape_html(title)));
    }
    if rows.is_empty() {
        result.push_str(&format!("<p>{}</p>\n", NO_RESULTS));
        return result;
    }

    for (name, group) in rows.groups() {
        if let Some(name) = name {
            result.push_str(&format!("<b>{}</b>\n", escape_html(name)));
        }
        if group.is_empty() {
            result.push_str(&format!("<p>{}</p>\n", NO_RESULTS));
            continue;
        }
        result.push_str("<table>\n<thead>\n<tr>");
        for column in columns {
            result.push_str(&format!("<th>{}</th>", escape_html(column)));
        }
        result.push_str("</tr>\n</thead>\n<tbody>\n");
        for row in group {
            result.push_str("<tr>");
            for column in columns {
                result.push_str(&format!("<td>{}</td>", escape_html(&cell(row, column))));
            }
            result.push_str("</tr>\n");
        }
        result.push_str("</tbody>\n</table>\n");
    }
    result
}
