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

//! Flavor queries via Compute API.

use async_trait::async_trait;
use osauth::Session;

use super::{api, protocol};
use crate::common::{ResourceId, ServerSideFilters};
use crate::query::server_side::{at_least, bool_equal_to};
use crate::query::{
    ChainLink, PresetKind, ProjectScoping, PropSupport, QueryPreset, QueryResource, QueryType,
};
use crate::Result;

/// A server flavor.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Flavor {
    inner: protocol::Flavor,
}

query_properties! {
    /// Queryable properties of a flavor.
    enum FlavorProperties for Flavor {
        /// Flavor description.
        FlavorDescription = "flavor_description" ["description"] => |f| f.description(),
        /// Root disk size (GiB).
        FlavorDisk = "flavor_disk" ["disk", "disk_size"] => |f| f.disk(),
        /// Ephemeral disk size (GiB).
        FlavorEphemeral = "flavor_ephemeral" ["ephemeral", "ephemeral_size"] => |f| f.ephemeral(),
        /// Unique ID.
        FlavorId = "flavor_id" ["id", "uuid"] => |f| f.id(),
        /// Whether the flavor is available to all projects.
        FlavorIsPublic = "flavor_is_public" ["is_public"] => |f| f.is_public(),
        /// Flavor name.
        FlavorName = "flavor_name" ["name"] => |f| f.name(),
        /// RAM size (MiB).
        FlavorRam = "flavor_ram" ["ram", "ram_size"] => |f| f.ram(),
        /// Swap size (MiB).
        FlavorSwap = "flavor_swap" ["swap", "swap_size"] => |f| f.swap(),
        /// Number of virtual CPUs.
        FlavorVcpu = "flavor_vcpu" ["vcpu", "vcpus"] => |f| f.vcpu_count(),
    }
}

const STRING_PROPERTIES: &[FlavorProperties] =
    &[FlavorProperties::FlavorDescription, FlavorProperties::FlavorName];

const SIZE_PROPERTIES: &[FlavorProperties] = &[
    FlavorProperties::FlavorDisk,
    FlavorProperties::FlavorEphemeral,
    FlavorProperties::FlavorRam,
    FlavorProperties::FlavorSwap,
    FlavorProperties::FlavorVcpu,
];

impl Flavor {
    transparent_property! {
        #[doc = "Flavor description."]
        description: ref Option<String>
    }

    transparent_property! {
        #[doc = "Root disk size in GiB."]
        disk: u64
    }

    transparent_property! {
        #[doc = "Ephemeral disk size in GiB."]
        ephemeral: u64
    }

    transparent_property! {
        #[doc = "Flavor unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "Whether the flavor is public."]
        is_public: bool
    }

    transparent_property! {
        #[doc = "Flavor name."]
        name: ref String
    }

    transparent_property! {
        #[doc = "RAM size in MiB."]
        ram: u64
    }

    transparent_property! {
        #[doc = "Swap size in MiB."]
        swap: u64
    }

    /// Number of virtual CPUs.
    #[inline]
    pub fn vcpu_count(&self) -> u32 {
        self.inner.vcpus
    }
}

impl ResourceId for Flavor {
    fn resource_id(&self) -> String {
        self.id().clone()
    }
}

#[async_trait]
impl QueryResource for Flavor {
    type Property = FlavorProperties;

    const QUERY_TYPE: QueryType = QueryType::Flavor;

    const CAN_PAGINATE: bool = true;

    const SCOPING: ProjectScoping = ProjectScoping::Global;

    const SUPPORTED_PRESETS: &'static [(PresetKind, PropSupport<FlavorProperties>)] = &[
        (PresetKind::EqualTo, PropSupport::All),
        (PresetKind::NotEqualTo, PropSupport::All),
        (PresetKind::AnyIn, PropSupport::All),
        (PresetKind::NotAnyIn, PropSupport::All),
        (PresetKind::MatchesRegex, PropSupport::Only(STRING_PROPERTIES)),
        (PresetKind::NotMatchesRegex, PropSupport::Only(STRING_PROPERTIES)),
        (PresetKind::GreaterThan, PropSupport::Only(SIZE_PROPERTIES)),
        (PresetKind::GreaterThanOrEqualTo, PropSupport::Only(SIZE_PROPERTIES)),
        (PresetKind::LessThan, PropSupport::Only(SIZE_PROPERTIES)),
        (PresetKind::LessThanOrEqualTo, PropSupport::Only(SIZE_PROPERTIES)),
    ];

    const CHAIN_LINKS: &'static [ChainLink<FlavorProperties>] = &[ChainLink {
        from: FlavorProperties::FlavorId,
        to: QueryType::Server,
        to_property: "flavor_id",
    }];

    fn server_side_filters(
        preset: &QueryPreset,
        prop: FlavorProperties,
    ) -> Option<Vec<ServerSideFilters>> {
        match prop {
            FlavorProperties::FlavorRam => at_least(preset, "minRam"),
            FlavorProperties::FlavorDisk => at_least(preset, "minDisk"),
            FlavorProperties::FlavorIsPublic => bool_equal_to(preset, "is_public"),
            _ => None,
        }
    }

    async fn list(session: &Session, query: &[(String, String)]) -> Result<Vec<Flavor>> {
        Ok(api::list_flavors(session, &query)
            .await?
            .into_iter()
            .map(|inner| Flavor { inner })
            .collect())
    }
}
