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

//! Project queries via Identity API.

use async_trait::async_trait;
use osauth::Session;

use super::{api, protocol};
use crate::common::{ResourceId, ServerSideFilters};
use crate::query::server_side::{bool_equal_to, equal_to};
use crate::query::{
    ChainLink, PresetKind, ProjectScoping, PropSupport, QueryPreset, QueryResource, QueryType,
};
use crate::Result;

/// An Identity project.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Project {
    inner: protocol::Project,
}

query_properties! {
    /// Queryable properties of a project.
    enum ProjectProperties for Project {
        /// Project description.
        ProjectDescription = "project_description" ["description"] => |p| p.description(),
        /// ID of the project's domain.
        ProjectDomainId = "project_domain_id" ["domain_id", "domain"] => |p| p.domain_id(),
        /// Unique ID.
        ProjectId = "project_id" ["id", "uuid"] => |p| p.id(),
        /// Whether the project is also a domain.
        ProjectIsDomain = "project_is_domain" ["is_domain"] => |p| p.is_domain(),
        /// Whether the project is enabled.
        ProjectIsEnabled = "project_is_enabled" ["enabled", "is_enabled"] => |p| p.enabled(),
        /// Project name.
        ProjectName = "project_name" ["name"] => |p| p.name(),
        /// ID of the parent project.
        ProjectParentId = "project_parent_id" ["parent_id"] => |p| p.parent_id(),
        /// Project tags.
        ProjectTags = "project_tags" ["tags"] => |p| p.tags(),
    }
}

const STRING_PROPERTIES: &[ProjectProperties] = &[
    ProjectProperties::ProjectDescription,
    ProjectProperties::ProjectName,
    ProjectProperties::ProjectTags,
];

impl Project {
    transparent_property! {
        #[doc = "Project description."]
        description: ref Option<String>
    }

    transparent_property! {
        #[doc = "ID of the project's domain."]
        domain_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Whether the project is enabled."]
        enabled: bool
    }

    transparent_property! {
        #[doc = "Project unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "Whether the project acts as a domain."]
        is_domain: bool
    }

    transparent_property! {
        #[doc = "Project name."]
        name: ref String
    }

    transparent_property! {
        #[doc = "ID of the parent project (a domain for top-level projects)."]
        parent_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Project tags."]
        tags: ref Vec<String>
    }
}

impl ResourceId for Project {
    fn resource_id(&self) -> String {
        self.id().clone()
    }
}

#[async_trait]
impl QueryResource for Project {
    type Property = ProjectProperties;

    const QUERY_TYPE: QueryType = QueryType::Project;

    const CAN_PAGINATE: bool = false;

    const SCOPING: ProjectScoping = ProjectScoping::Global;

    const SUPPORTED_PRESETS: &'static [(PresetKind, PropSupport<ProjectProperties>)] = &[
        (PresetKind::EqualTo, PropSupport::All),
        (PresetKind::NotEqualTo, PropSupport::All),
        (PresetKind::AnyIn, PropSupport::All),
        (PresetKind::NotAnyIn, PropSupport::All),
        (PresetKind::MatchesRegex, PropSupport::Only(STRING_PROPERTIES)),
        (PresetKind::NotMatchesRegex, PropSupport::Only(STRING_PROPERTIES)),
    ];

    const CHAIN_LINKS: &'static [ChainLink<ProjectProperties>] = &[ChainLink {
        from: ProjectProperties::ProjectId,
        to: QueryType::Server,
        to_property: "project_id",
    }];

    fn server_side_filters(
        preset: &QueryPreset,
        prop: ProjectProperties,
    ) -> Option<Vec<ServerSideFilters>> {
        match prop {
            ProjectProperties::ProjectName => equal_to(preset, "name"),
            ProjectProperties::ProjectDomainId => equal_to(preset, "domain_id"),
            ProjectProperties::ProjectParentId => equal_to(preset, "parent_id"),
            ProjectProperties::ProjectIsEnabled => bool_equal_to(preset, "enabled"),
            ProjectProperties::ProjectIsDomain => bool_equal_to(preset, "is_domain"),
            _ => None,
        }
    }

    async fn list(session: &Session, query: &[(String, String)]) -> Result<Vec<Project>> {
        Ok(api::list_projects(session, &query)
            .await?
            .into_iter()
            .map(|inner| Project { inner })
            .collect())
    }
}
