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

//! Execution of queries.

use std::collections::HashSet;
use std::time::Duration;

use super::base::{ProjectScoping, QueryResource};
use super::builder::QueryBuilder;
use crate::common::{ResourceId, ResourceIterator, ResourceSource, ServerSideFilters};
use crate::{Error, ErrorKind, Result};

/// Projects to run a query against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunScope {
    /// The project of the current session.
    #[default]
    Default,
    /// All projects (requires administrative rights).
    AllProjects,
    /// The given projects.
    Projects(Vec<String>),
}

/// Options of query execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Page size, `None` to use the default of each resource type.
    pub page_size: Option<usize>,
    /// How many times a failed page request is retried.
    pub max_retries: usize,
    /// Delay between retries.
    pub retry_delay: Duration,
}

impl Default for RunnerOptions {
    fn default() -> RunnerOptions {
        RunnerOptions {
            page_size: None,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Runs queries against a resource source.
#[derive(Debug, Clone, Default)]
pub struct QueryRunner {
    options: RunnerOptions,
}

fn compatible(first: &ServerSideFilters, second: &ServerSideFilters) -> bool {
    first
        .iter()
        .all(|(key, value)| second.get(key).map(|other| other == value).unwrap_or(true))
}

fn scope_filters<R: QueryResource>(scope: &RunScope) -> Result<Vec<ServerSideFilters>> {
    match (R::SCOPING, scope) {
        (_, RunScope::Projects(projects)) if projects.is_empty() => Err(Error::new(
            ErrorKind::InvalidInput,
            "At least one project is required to run a query against projects",
        )),
        (ProjectScoping::Global, RunScope::Projects(..)) => Err(Error::new(
            ErrorKind::InvalidInput,
            format!(
                "{} queries cannot be limited to projects",
                R::QUERY_TYPE
            ),
        )),
        (ProjectScoping::Global, _) | (_, RunScope::Default) => {
            Ok(vec![ServerSideFilters::new()])
        }
        (ProjectScoping::Scoped { all_projects, .. }, RunScope::AllProjects) => {
            Ok(vec![match all_projects {
                Some((key, value)) => ServerSideFilters::single(key, value),
                None => ServerSideFilters::new(),
            }])
        }
        (
            ProjectScoping::Scoped {
                project_key,
                all_projects,
            },
            RunScope::Projects(projects),
        ) => Ok(projects
            .iter()
            .map(|project| {
                let filters = ServerSideFilters::single(project_key, project.clone());
                match all_projects {
                    Some((key, value)) => filters.with(key, value),
                    None => filters,
                }
            })
            .collect()),
    }
}

impl QueryRunner {
    /// Create a runner with the given options.
    pub fn new(options: RunnerOptions) -> QueryRunner {
        QueryRunner { options }
    }

    /// Options of this runner.
    #[inline]
    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Page size to use for the resource type (if it can paginate).
    pub fn page_size<R: QueryResource>(&self) -> Option<usize> {
        if R::CAN_PAGINATE {
            Some(self.options.page_size.unwrap_or(R::DEFAULT_LIMIT))
        } else {
            None
        }
    }

    /// Combine query conditions with the project scope into listing calls.
    pub fn filter_sets<R: QueryResource>(
        &self,
        builder: &QueryBuilder<R>,
        scope: &RunScope,
    ) -> Result<Vec<ServerSideFilters>> {
        let scoped = scope_filters::<R>(scope)?;
        let mut result = Vec::new();
        for conditions in builder.server_side_filters() {
            for scope in &scoped {
                if compatible(conditions, scope) {
                    let merged = conditions.merged(scope);
                    if !result.contains(&merged) {
                        result.push(merged);
                    }
                } else {
                    trace!(
                        "Skipping listing with {} in scope {}: no resources can match",
                        conditions,
                        scope
                    );
                }
            }
        }
        Ok(result)
    }

    /// Run the query.
    ///
    /// Results of several listing calls are de-duplicated by ID, then all
    /// client-side conditions are applied.
    pub async fn run<R, S>(
        &self,
        source: &S,
        builder: &QueryBuilder<R>,
        scope: &RunScope,
    ) -> Result<Vec<R>>
    where
        R: QueryResource,
        S: ResourceSource<R>,
    {
        let filter_sets = self.filter_sets(builder, scope)?;
        if builder.matches_nothing() {
            debug!(
                "Skipping {} query that cannot match anything",
                R::QUERY_TYPE
            );
            return Ok(Vec::new());
        }

        debug!(
            "Running {} query with {} listing call(s) and {} client-side filter(s)",
            R::QUERY_TYPE,
            filter_sets.len(),
            builder.client_side_filters().len()
        );

        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for filters in filter_sets {
            let items = ResourceIterator::new(source, filters)
                .with_page_size(self.page_size::<R>())
                .with_retries(self.options.max_retries, self.options.retry_delay)
                .all()
                .await?;
            for item in items {
                if seen.insert(item.resource_id()) {
                    result.push(item);
                }
            }
        }

        let total = result.len();
        result.retain(|item| builder.matches(item));
        debug!(
            "{} query returned {} of {} fetched resource(s)",
            R::QUERY_TYPE,
            result.len(),
            total
        );
        Ok(result)
    }
}
