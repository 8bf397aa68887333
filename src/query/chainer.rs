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

//! Chaining queries over related resource types.

use std::collections::HashSet;

use super::api::Query;
use super::base::{parse_property, ChainLink, ProjectScoping, QueryProperty, QueryResource};
use super::output::ForwardedOutputs;
use super::presets::QueryPreset;
use super::runner::RunScope;
use crate::common::{PropValue, ResourceSource};
use crate::{Error, ErrorKind, Result};

fn link_values(value: PropValue) -> Vec<PropValue> {
    match value {
        PropValue::Null => Vec::new(),
        PropValue::List(items) => items.into_iter().filter(|v| !v.is_null()).collect(),
        other => vec![other],
    }
}

impl<R: QueryResource> Query<R> {
    fn chain_link_to<T: QueryResource>() -> Result<(&'static ChainLink<R::Property>, T::Property)>
    {
        let link = R::chain_link(T::QUERY_TYPE).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "{} query cannot be chained to a {} query",
                    R::QUERY_TYPE,
                    T::QUERY_TYPE
                ),
            )
        })?;
        let target = parse_property::<T::Property>(link.to_property)?;
        Ok((link, target))
    }

    /// Build a query over a related resource type.
    ///
    /// The new query matches resources linked to the results of this one.
    /// With `keep_previous_results`, the selected columns of this query are
    /// joined into the output of the new one.
    ///
    /// Fails if this query has not been run or the types are not linked.
    pub fn then<T: QueryResource>(&self, keep_previous_results: bool) -> Result<Query<T>> {
        let (link, target) = Self::chain_link_to::<T>()?;
        let results = self.results()?;

        let mut seen = HashSet::new();
        let values: Vec<PropValue> = results
            .iter()
            .flat_map(|item| link_values(link.from.value_of(item)))
            .filter(|value| seen.insert(value.to_string()))
            .collect();
        debug!(
            "Chaining {} query into {} query on {} with {} value(s)",
            R::QUERY_TYPE,
            T::QUERY_TYPE,
            target,
            values.len()
        );

        let mut query = Query::<T>::new().with_options(self.options.clone());
        if let ProjectScoping::Scoped { .. } = T::SCOPING {
            query.set_scope(RunScope::AllProjects);
        }
        query.set_where(QueryPreset::AnyIn(values), target)?;

        if keep_previous_results {
            let mut forwarded = ForwardedOutputs::new(target, self.output.columns());
            for item in results {
                let rows = self.output.rows(item);
                for value in link_values(link.from.value_of(item)) {
                    for row in &rows {
                        forwarded.add_row(&value, row.clone());
                    }
                }
            }
            query.output.add_forwarded(forwarded);
        }

        Ok(query)
    }

    /// Run a query over a related resource type and append its properties.
    ///
    /// An empty list of properties appends all of them.
    pub async fn append_from<T, S, I>(&mut self, source: &S, props: I) -> Result<()>
    where
        T: QueryResource,
        S: ResourceSource<T>,
        I: IntoIterator<Item = T::Property>,
    {
        let (link, target) = Self::chain_link_to::<T>()?;
        let mut query = self.then::<T>(false)?.select(props);
        query.run(source).await?;

        let mut forwarded = ForwardedOutputs::new(link.from, query.output.columns());
        for item in query.results()? {
            forwarded.add_row(&target.value_of(item), query.output.own_row(item));
        }
        self.output.add_forwarded(forwarded);
        Ok(())
    }
}
