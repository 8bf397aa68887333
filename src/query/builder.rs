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

//! Accumulation of query conditions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::base::{parse_property, QueryProperty, QueryResource};
use super::handlers::ClientSideFilter;
use super::presets::{PresetKind, QueryPreset};
use crate::common::ServerSideFilters;
use crate::{Error, ErrorKind, Result};

/// Conditions of a query, split into server-side and client-side parts.
///
/// All conditions are combined with AND. Every condition is checked either
/// by the server or locally, never both.
pub struct QueryBuilder<R: QueryResource> {
    client_side: Vec<ClientSideFilter<R::Property>>,
    server_side: Vec<ServerSideFilters>,
    matches_nothing: bool,
}

impl<R: QueryResource> QueryBuilder<R> {
    /// Create a builder without conditions.
    pub fn new() -> QueryBuilder<R> {
        QueryBuilder {
            client_side: Vec::new(),
            server_side: vec![ServerSideFilters::new()],
            matches_nothing: false,
        }
    }

    /// Add a condition.
    #[inline]
    pub fn add_condition(&mut self, preset: QueryPreset, prop: R::Property) -> Result<()> {
        self.add_condition_at(preset, prop, Utc::now())
    }

    /// Add a condition, resolving relative times against `now`.
    pub fn add_condition_at(
        &mut self,
        preset: QueryPreset,
        prop: R::Property,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let kind = preset.kind();
        if !R::supports(kind, prop) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "Preset {} is not supported for property {} of {} queries",
                    kind,
                    prop,
                    R::QUERY_TYPE
                ),
            ));
        }

        let preset = preset.resolved(now)?;
        match preset {
            QueryPreset::AnyIn(ref values) if values.is_empty() => {
                debug!(
                    "Empty {} condition on {}, the query will match nothing",
                    kind, prop
                );
                self.matches_nothing = true;
                return Ok(());
            }
            QueryPreset::NotAnyIn(ref values) if values.is_empty() => {
                debug!("Ignoring empty {} condition on {}", kind, prop);
                return Ok(());
            }
            _ => {}
        }

        let client_side = ClientSideFilter::new(prop, preset.clone())?;
        match R::server_side_filters(&preset, prop) {
            Some(sets) if !sets.is_empty() => {
                let collides = self
                    .server_side
                    .iter()
                    .any(|existing| sets.iter().any(|new| existing.shares_keys_with(new)));
                if collides {
                    debug!(
                        "Server-side filters for {} on {} collide with {:?}, \
                         filtering on the client side",
                        kind, prop, self.server_side
                    );
                    self.client_side.push(client_side);
                } else {
                    trace!(
                        "Using server-side filters {:?} for {} on {}",
                        sets,
                        kind,
                        prop
                    );
                    self.server_side = self
                        .server_side
                        .iter()
                        .flat_map(|existing| sets.iter().map(move |new| existing.merged(new)))
                        .collect();
                }
            }
            _ => {
                trace!("Filtering {} on {} on the client side", kind, prop);
                self.client_side.push(client_side);
            }
        }

        Ok(())
    }

    /// Add a condition from its string and JSON representation.
    ///
    /// For example, `("EQUAL_TO", "server_status", {"value": "ACTIVE"})`.
    pub fn parse_where(&mut self, preset: &str, prop: &str, args: &Value) -> Result<()> {
        self.parse_where_at(preset, prop, args, Utc::now())
    }

    /// Add a condition from its string and JSON representation at a given time.
    pub fn parse_where_at(
        &mut self,
        preset: &str,
        prop: &str,
        args: &Value,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let kind = PresetKind::from_str(preset)?;
        let prop = parse_property::<R::Property>(prop)?;
        let preset = QueryPreset::from_json(kind, args)?;
        self.add_condition_at(preset, prop, now)
    }

    /// Conditions checked locally.
    #[inline]
    pub fn client_side_filters(&self) -> &[ClientSideFilter<R::Property>] {
        &self.client_side
    }

    /// Sets of server-side filters; each set is a separate listing call.
    #[inline]
    pub fn server_side_filters(&self) -> &[ServerSideFilters] {
        &self.server_side
    }

    /// Whether the query is known to match nothing.
    #[inline]
    pub fn matches_nothing(&self) -> bool {
        self.matches_nothing
    }

    /// Whether a fetched resource passes all client-side conditions.
    pub fn matches(&self, resource: &R) -> bool {
        self.client_side.iter().all(|filter| filter.matches(resource))
    }
}

impl<R: QueryResource> Default for QueryBuilder<R> {
    fn default() -> QueryBuilder<R> {
        QueryBuilder::new()
    }
}

impl<R: QueryResource> Clone for QueryBuilder<R> {
    fn clone(&self) -> QueryBuilder<R> {
        QueryBuilder {
            client_side: self.client_side.clone(),
            server_side: self.server_side.clone(),
            matches_nothing: self.matches_nothing,
        }
    }
}

impl<R: QueryResource> fmt::Debug for QueryBuilder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("client_side", &self.client_side)
            .field("server_side", &self.server_side)
            .field("matches_nothing", &self.matches_nothing)
            .finish()
    }
}
