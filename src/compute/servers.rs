// Copyright 2017 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Server queries via Compute API.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use osauth::Session;

use super::{api, protocol};
use crate::common::{ResourceId, ServerSideFilters};
use crate::query::server_side::{changed_since, equal_or_any_in, exact_regex};
use crate::query::{
    ChainLink, PresetKind, ProjectScoping, PropSupport, QueryPreset, QueryResource, QueryType,
};
use crate::Result;

/// A virtual server.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Server {
    inner: protocol::Server,
}

query_properties! {
    /// Queryable properties of a server.
    enum ServerProperties for Server {
        /// ID of the flavor used to create the server.
        FlavorId = "flavor_id" ["flavor"] => |s| s.flavor_id(),
        /// Host name of the hypervisor running the server.
        HypervisorName = "hypervisor_name" ["hypervisor", "node"] => |s| s.hypervisor_name(),
        /// ID of the image used to create the server (if any).
        ImageId = "image_id" ["image"] => |s| s.image_id(),
        /// ID of the owning project.
        ProjectId = "project_id" ["project", "tenant_id"] => |s| s.project_id(),
        /// When the server was created.
        ServerCreationDate = "server_creation_date" ["created_at", "created"] => |s| s.created_at(),
        /// Server description.
        ServerDescription = "server_description" ["description"] => |s| s.description(),
        /// Unique ID.
        ServerId = "server_id" ["id", "uuid"] => |s| s.id(),
        /// When the server was last updated.
        ServerLastUpdatedDate = "server_last_updated_date" ["updated_at", "updated"] => |s| s.updated_at(),
        /// Server name.
        ServerName = "server_name" ["name"] => |s| s.name(),
        /// Server status, e.g. `ACTIVE`.
        ServerStatus = "server_status" ["status"] => |s| s.status(),
        /// ID of the user that created the server.
        UserId = "user_id" ["user"] => |s| s.user_id(),
        /// IP addresses on all networks.
        Addresses = "addresses" ["ips", "ip_addresses"] => |s| s.ip_addresses(),
    }
}

const STRING_PROPERTIES: &[ServerProperties] = &[
    ServerProperties::Addresses,
    ServerProperties::HypervisorName,
    ServerProperties::ServerDescription,
    ServerProperties::ServerName,
    ServerProperties::ServerStatus,
];

const DATE_PROPERTIES: &[ServerProperties] = &[
    ServerProperties::ServerCreationDate,
    ServerProperties::ServerLastUpdatedDate,
];

impl Server {
    transparent_property! {
        #[doc = "Creation date and time."]
        created_at: DateTime<FixedOffset>
    }

    transparent_property! {
        #[doc = "Server description."]
        description: ref Option<String>
    }

    /// ID of the flavor used to create the server.
    #[inline]
    pub fn flavor_id(&self) -> &String {
        &self.inner.flavor.id
    }

    transparent_property! {
        #[doc = "Host name of the hypervisor (requires administrative rights)."]
        hypervisor_name: ref Option<String>
    }

    transparent_property! {
        #[doc = "Server unique ID."]
        id: ref String
    }

    /// ID of the image used to create the server.
    ///
    /// Servers booted from volumes have no image.
    #[inline]
    pub fn image_id(&self) -> Option<&String> {
        self.inner.image.as_ref().map(|image| &image.id)
    }

    /// IP addresses on all networks, ordered by network name.
    pub fn ip_addresses(&self) -> Vec<String> {
        self.inner
            .addresses
            .values()
            .flat_map(|addresses| addresses.iter().map(|a| a.addr.clone()))
            .collect()
    }

    transparent_property! {
        #[doc = "Server name."]
        name: ref String
    }

    transparent_property! {
        #[doc = "ID of the owning project."]
        project_id: ref String
    }

    transparent_property! {
        #[doc = "Server status."]
        status: ref String
    }

    transparent_property! {
        #[doc = "Last update date and time."]
        updated_at: DateTime<FixedOffset>
    }

    transparent_property! {
        #[doc = "ID of the user that created the server."]
        user_id: ref String
    }
}

impl ResourceId for Server {
    fn resource_id(&self) -> String {
        self.id().clone()
    }
}

#[async_trait]
impl QueryResource for Server {
    type Property = ServerProperties;

    const QUERY_TYPE: QueryType = QueryType::Server;

    const CAN_PAGINATE: bool = true;

    const SCOPING: ProjectScoping = ProjectScoping::Scoped {
        project_key: "project_id",
        all_projects: Some(("all_tenants", "True")),
    };

    const SUPPORTED_PRESETS: &'static [(PresetKind, PropSupport<ServerProperties>)] = &[
        (PresetKind::EqualTo, PropSupport::All),
        (PresetKind::NotEqualTo, PropSupport::All),
        (PresetKind::AnyIn, PropSupport::All),
        (PresetKind::NotAnyIn, PropSupport::All),
        (PresetKind::MatchesRegex, PropSupport::Only(STRING_PROPERTIES)),
        (PresetKind::NotMatchesRegex, PropSupport::Only(STRING_PROPERTIES)),
        (PresetKind::OlderThan, PropSupport::Only(DATE_PROPERTIES)),
        (PresetKind::OlderThanOrEqualTo, PropSupport::Only(DATE_PROPERTIES)),
        (PresetKind::YoungerThan, PropSupport::Only(DATE_PROPERTIES)),
        (PresetKind::YoungerThanOrEqualTo, PropSupport::Only(DATE_PROPERTIES)),
    ];

    const CHAIN_LINKS: &'static [ChainLink<ServerProperties>] = &[
        ChainLink {
            from: ServerProperties::UserId,
            to: QueryType::User,
            to_property: "user_id",
        },
        ChainLink {
            from: ServerProperties::ProjectId,
            to: QueryType::Project,
            to_property: "project_id",
        },
        ChainLink {
            from: ServerProperties::FlavorId,
            to: QueryType::Flavor,
            to_property: "flavor_id",
        },
        ChainLink {
            from: ServerProperties::ImageId,
            to: QueryType::Image,
            to_property: "image_id",
        },
        ChainLink {
            from: ServerProperties::HypervisorName,
            to: QueryType::Hypervisor,
            to_property: "hypervisor_name",
        },
    ];

    fn server_side_filters(
        preset: &QueryPreset,
        prop: ServerProperties,
    ) -> Option<Vec<ServerSideFilters>> {
        match prop {
            ServerProperties::ServerId => equal_or_any_in(preset, "uuid"),
            ServerProperties::ServerStatus => equal_or_any_in(preset, "status"),
            ServerProperties::FlavorId => equal_or_any_in(preset, "flavor"),
            ServerProperties::ImageId => equal_or_any_in(preset, "image"),
            ServerProperties::ProjectId => equal_or_any_in(preset, "project_id"),
            ServerProperties::UserId => equal_or_any_in(preset, "user_id"),
            ServerProperties::HypervisorName => equal_or_any_in(preset, "node"),
            ServerProperties::ServerName => exact_regex(preset, "name"),
            ServerProperties::ServerLastUpdatedDate => changed_since(preset, "changes-since"),
            _ => None,
        }
    }

    async fn list(session: &Session, query: &[(String, String)]) -> Result<Vec<Server>> {
        Ok(api::list_servers(session, &query)
            .await?
            .into_iter()
            .map(|inner| Server { inner })
            .collect())
    }
}

#[cfg(test)]
impl Server {
    pub(crate) fn with_flavor<S: Into<String>>(mut self, flavor_id: S) -> Server {
        self.inner.flavor.id = flavor_id.into();
        self
    }

    pub(crate) fn with_hypervisor<S: Into<String>>(mut self, name: S) -> Server {
        self.inner.hypervisor_name = Some(name.into());
        self
    }

    pub(crate) fn with_user<S: Into<String>>(mut self, user_id: S) -> Server {
        self.inner.user_id = user_id.into();
        self
    }
}
