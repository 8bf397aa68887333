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

//! Traits describing queryable resources.

use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use async_trait::async_trait;
use osauth::Session;
use serde::Serialize;

use super::presets::{PresetKind, QueryPreset};
use crate::common::{PropValue, ResourceId, ServerSideFilters};
use crate::{Error, ErrorKind, Result};

/// A property of a queryable resource.
///
/// Implementations are generated by the `query_properties!` macro.
pub trait QueryProperty:
    Copy + Eq + Hash + Ord + Debug + Display + Send + Sync + 'static
{
    /// Resource this property belongs to.
    type Resource;

    /// All properties in their declaration order.
    fn all() -> &'static [Self];

    /// Canonical name of the property.
    fn name(&self) -> &'static str;

    /// Alternative names accepted when parsing.
    fn aliases(&self) -> &'static [&'static str];

    /// Extract the value of this property from a resource.
    fn value_of(&self, resource: &Self::Resource) -> PropValue;

    /// Whether the name matches this property (case-insensitive).
    fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.name().eq_ignore_ascii_case(name)
            || self.aliases().iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// Parse a property from its canonical name or one of its aliases.
pub fn parse_property<P: QueryProperty>(name: &str) -> Result<P> {
    P::all()
        .iter()
        .find(|prop| prop.matches_name(name))
        .copied()
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "Unknown property {}, expected one of: {}",
                    name,
                    P::all()
                        .iter()
                        .map(|p| p.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )
        })
}

/// Which properties a preset can be used with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropSupport<P: 'static> {
    /// Any property of the resource.
    All,
    /// Only the listed properties.
    Only(&'static [P]),
}

impl<P: PartialEq> PropSupport<P> {
    /// Whether the property is covered.
    pub fn covers(&self, prop: &P) -> bool {
        match self {
            PropSupport::All => true,
            PropSupport::Only(props) => props.contains(prop),
        }
    }
}

/// How a resource type is scoped to projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectScoping {
    /// The resource is not owned by projects.
    Global,
    /// The resource belongs to a project.
    Scoped {
        /// Filter selecting resources of one project.
        project_key: &'static str,
        /// Filter requesting resources from all projects (if needed).
        all_projects: Option<(&'static str, &'static str)>,
    },
}

/// Type of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryType {
    /// Compute servers.
    Server,
    /// Compute flavors.
    Flavor,
    /// Images.
    Image,
    /// Compute hypervisors.
    Hypervisor,
    /// Identity users.
    User,
    /// Identity projects.
    Project,
}

impl QueryType {
    /// All query types.
    pub const ALL: [QueryType; 6] = [
        QueryType::Server,
        QueryType::Flavor,
        QueryType::Image,
        QueryType::Hypervisor,
        QueryType::User,
        QueryType::Project,
    ];

    /// Short name of the query type.
    pub fn name(self) -> &'static str {
        match self {
            QueryType::Server => "server",
            QueryType::Flavor => "flavor",
            QueryType::Image => "image",
            QueryType::Hypervisor => "hypervisor",
            QueryType::User => "user",
            QueryType::Project => "project",
        }
    }
}

impl Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QueryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<QueryType> {
        let lower = s.trim().to_ascii_lowercase();
        let short = lower.strip_suffix("_query").unwrap_or(&lower);
        QueryType::ALL
            .iter()
            .find(|t| t.name() == short)
            .copied()
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("Unknown query type {}", s),
                )
            })
    }
}

/// A link used to chain a query into a query of another type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink<P: 'static> {
    /// Property of this resource holding the linked value.
    pub from: P,
    /// Type of the linked query.
    pub to: QueryType,
    /// Name of the property of the linked resource.
    pub to_property: &'static str,
}

/// A resource that can be queried.
#[async_trait]
pub trait QueryResource:
    ResourceId + Clone + Debug + Serialize + Send + Sync + Sized + 'static
{
    /// Properties of this resource.
    type Property: QueryProperty<Resource = Self>;

    /// Type of the query.
    const QUERY_TYPE: QueryType;

    /// Whether the listing API supports limit/marker pagination.
    const CAN_PAGINATE: bool;

    /// Page size used when not overridden.
    const DEFAULT_LIMIT: usize = 1000;

    /// Project scoping of this resource.
    const SCOPING: ProjectScoping;

    /// Presets and the properties they can be used with.
    ///
    /// Presets not listed here are not supported at all.
    const SUPPORTED_PRESETS: &'static [(PresetKind, PropSupport<Self::Property>)];

    /// Links to other query types.
    const CHAIN_LINKS: &'static [ChainLink<Self::Property>];

    /// Convert a condition into server-side filter sets.
    ///
    /// Returns `None` if the condition can only be checked locally. Each
    /// returned set is a separate listing call; the results are combined.
    fn server_side_filters(
        _preset: &QueryPreset,
        _prop: Self::Property,
    ) -> Option<Vec<ServerSideFilters>> {
        None
    }

    /// List resources with the given query parameters.
    async fn list(session: &Session, query: &[(String, String)]) -> Result<Vec<Self>>;

    /// Whether the preset can be used with the property.
    fn supports(kind: PresetKind, prop: Self::Property) -> bool {
        Self::SUPPORTED_PRESETS
            .iter()
            .any(|(k, support)| *k == kind && support.covers(&prop))
    }

    /// Find a link to the given query type.
    fn chain_link(to: QueryType) -> Option<&'static ChainLink<Self::Property>> {
        Self::CHAIN_LINKS.iter().find(|link| link.to == to)
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::{PropSupport, QueryType};
    use crate::ErrorKind;

    #[test]
    fn test_query_type_from_str() {
        assert_eq!(QueryType::from_str("server").unwrap(), QueryType::Server);
        assert_eq!(
            QueryType::from_str("SERVER_QUERY").unwrap(),
            QueryType::Server
        );
        assert_eq!(
            QueryType::from_str(" hypervisor_query ").unwrap(),
            QueryType::Hypervisor
        );
        assert_eq!(
            QueryType::from_str("volume").unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_prop_support() {
        const ONLY: &[u8] = &[1, 3];
        assert!(PropSupport::<u8>::All.covers(&42));
        assert!(PropSupport::Only(ONLY).covers(&3));
        assert!(!PropSupport::Only(ONLY).covers(&2));
    }
}
