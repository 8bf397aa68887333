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

//! Query API.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

use super::base::{parse_property, QueryResource};
use super::builder::QueryBuilder;
use super::output::{render_html, render_table, PropColumns, PropRow, QueryOutput};
use super::parser::{Grouping, QueryParser, SortOrder};
use super::presets::QueryPreset;
use super::runner::{QueryRunner, RunScope, RunnerOptions};
use crate::common::{PropValue, ResourceSource};
use crate::{Error, ErrorKind, Result};

/// A query over resources of type `R`.
///
/// Build the query with `select`, `with_where`, `sort_by` and `group_by`,
/// execute it with [run](#method.run), then fetch the results in one of the
/// output formats.
pub struct Query<R: QueryResource> {
    pub(super) builder: QueryBuilder<R>,
    pub(super) parser: QueryParser<R::Property>,
    pub(super) output: QueryOutput<R::Property>,
    pub(super) scope: RunScope,
    pub(super) options: RunnerOptions,
    pub(super) results: Option<Vec<R>>,
}

impl<R: QueryResource> Query<R> {
    /// Create an empty query returning everything.
    pub fn new() -> Query<R> {
        Query {
            builder: QueryBuilder::new(),
            parser: QueryParser::new(),
            output: QueryOutput::new(),
            scope: RunScope::Default,
            options: RunnerOptions::default(),
            results: None,
        }
    }

    /// Use the given execution options.
    pub fn with_options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.options.page_size = Some(page_size);
        self
    }

    /// How many times to retry a failed page request.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.options.max_retries = max_retries;
        self
    }

    /// Delay between retries of a failed page request.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.options.retry_delay = retry_delay;
        self
    }

    /// Set the project scope of the query.
    pub fn set_scope(&mut self, scope: RunScope) {
        self.scope = scope;
    }

    /// Run the query against all projects.
    ///
    /// Requires administrative rights for project-scoped resources, ignored
    /// for global ones.
    pub fn all_projects(mut self) -> Self {
        self.set_scope(RunScope::AllProjects);
        self
    }

    /// Run the query against the given projects.
    pub fn from_projects<I, S>(mut self, projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_scope(RunScope::Projects(
            projects.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Add properties to the output.
    pub fn select<I: IntoIterator<Item = R::Property>>(mut self, props: I) -> Self {
        self.output.select(props);
        self
    }

    /// Output all properties.
    pub fn select_all(mut self) -> Self {
        self.output.select_all();
        self
    }

    /// Add properties to the output by their names or aliases.
    pub fn select_by_name<I, S>(mut self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let props = names
            .into_iter()
            .map(|name| parse_property::<R::Property>(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        self.output.select(props);
        Ok(self)
    }

    /// Add a condition.
    pub fn set_where(&mut self, preset: QueryPreset, prop: R::Property) -> Result<()> {
        self.builder.add_condition(preset, prop)
    }

    /// Add a condition.
    #[inline]
    pub fn with_where(mut self, preset: QueryPreset, prop: R::Property) -> Result<Self> {
        self.set_where(preset, prop)?;
        Ok(self)
    }

    /// Add a condition from a preset name, a property name and JSON arguments.
    ///
    /// ```rust
    /// use openstack_query::compute::Server;
    /// use openstack_query::Query;
    ///
    /// let query = Query::<Server>::new()
    ///     .with_where_json("older_than", "server_creation_date", &serde_json::json!({"days": 30}))
    ///     .expect("Invalid condition");
    /// ```
    pub fn with_where_json(mut self, preset: &str, prop: &str, args: &Value) -> Result<Self> {
        self.builder.parse_where(preset, prop, args)?;
        Ok(self)
    }

    /// Sort by the property; earlier sort keys take precedence.
    pub fn sort_by(mut self, prop: R::Property, order: SortOrder) -> Self {
        self.parser.add_sort(prop, order);
        self
    }

    /// Group results by the value of the property.
    pub fn group_by(mut self, prop: R::Property) -> Self {
        self.parser.set_group_by(prop);
        self
    }

    /// Group results into named groups of values.
    pub fn group_by_ranges<S: Into<String>>(
        mut self,
        prop: R::Property,
        ranges: Vec<(S, Vec<PropValue>)>,
        include_ungrouped: bool,
    ) -> Result<Self> {
        let ranges = ranges
            .into_iter()
            .map(|(name, values)| (name.into(), values))
            .collect();
        self.parser
            .set_group_by_ranges(prop, ranges, include_ungrouped)?;
        Ok(self)
    }

    /// Conditions of this query.
    #[inline]
    pub fn builder(&self) -> &QueryBuilder<R> {
        &self.builder
    }

    /// Project scope of this query.
    #[inline]
    pub fn scope(&self) -> &RunScope {
        &self.scope
    }

    /// Execution options of this query.
    #[inline]
    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Execute the query, replacing any previous results.
    pub async fn run<S: ResourceSource<R>>(&mut self, source: &S) -> Result<()> {
        let runner = QueryRunner::new(self.options.clone());
        let mut results = runner.run(source, &self.builder, &self.scope).await?;
        self.parser.sort(&mut results);
        self.results = Some(results);
        Ok(())
    }

    /// Whether the query has been run.
    #[inline]
    pub fn has_run(&self) -> bool {
        self.results.is_some()
    }

    /// Sorted results.
    pub fn results(&self) -> Result<&[R]> {
        self.results.as_deref().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("The {} query has not been run yet", R::QUERY_TYPE),
            )
        })
    }

    /// Results as resource objects.
    pub fn to_objects(&self) -> Result<Grouping<Vec<R>>> {
        Ok(self.parser.group(self.results()?.to_vec()))
    }

    /// Results as rows of selected properties.
    pub fn to_props(&self) -> Result<Grouping<Vec<PropRow>>> {
        Ok(self.output.to_props(&self.to_objects()?))
    }

    /// Results as lists of values per property.
    pub fn to_props_flattened(&self) -> Result<Grouping<PropColumns>> {
        Ok(self.to_props()?.map(|rows| PropColumns::from_rows(&rows)))
    }

    /// Results as text tables.
    pub fn to_string_table(&self, title: Option<&str>) -> Result<String> {
        Ok(render_table(&self.to_props()?, &self.output.columns(), title))
    }

    /// Results as HTML tables.
    pub fn to_html(&self, title: Option<&str>) -> Result<String> {
        Ok(render_html(&self.to_props()?, &self.output.columns(), title))
    }

    /// Results as a JSON document.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_props()?).map_err(|err| {
            Error::new(
                ErrorKind::OperationFailed,
                format!("Cannot serialize {} results: {}", R::QUERY_TYPE, err),
            )
        })
    }
}

impl<R: QueryResource> Default for Query<R> {
    fn default() -> Query<R> {
        Query::new()
    }
}

impl<R: QueryResource> Clone for Query<R> {
    fn clone(&self) -> Query<R> {
        Query {
            builder: self.builder.clone(),
            parser: self.parser.clone(),
            output: self.output.clone(),
            scope: self.scope.clone(),
            options: self.options.clone(),
            results: self.results.clone(),
        }
    }
}

impl<R: QueryResource> fmt::Debug for Query<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("type", &R::QUERY_TYPE)
            .field("builder", &self.builder)
            .field("parser", &self.parser)
            .field("output", &self.output)
            .field("scope", &self.scope)
            .field("results", &self.results.as_ref().map(Vec::len))
            .finish()
    }
}
