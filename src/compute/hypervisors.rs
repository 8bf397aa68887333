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

//! Hypervisor queries via Compute API.

use async_trait::async_trait;
use osauth::Session;

use super::{api, protocol};
use crate::common::ResourceId;
use crate::query::{ChainLink, PresetKind, ProjectScoping, PropSupport, QueryResource, QueryType};
use crate::Result;

/// A compute hypervisor.
///
/// Listing hypervisors requires administrative rights.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Hypervisor {
    inner: protocol::Hypervisor,
}

query_properties! {
    /// Queryable properties of a hypervisor.
    enum HypervisorProperties for Hypervisor {
        /// Number of tasks currently running on the hypervisor.
        HypervisorCurrentWorkload = "hypervisor_current_workload" ["current_workload", "workload"]
            => |h| h.current_workload(),
        /// Free local disk (GiB), may be negative when over-committed.
        HypervisorDiskFree = "hypervisor_disk_free" ["disk_free", "free_disk_gb"] => |h| h.disk_free(),
        /// Local disk size (GiB).
        HypervisorDiskSize = "hypervisor_disk_size" ["disk_size", "local_gb"] => |h| h.disk_size(),
        /// Used local disk (GiB).
        HypervisorDiskUsed = "hypervisor_disk_used" ["disk_used", "local_gb_used"] => |h| h.disk_used(),
        /// Unique ID.
        HypervisorId = "hypervisor_id" ["id", "uuid"] => |h| h.id(),
        /// IP address of the hypervisor host.
        HypervisorIp = "hypervisor_ip" ["ip", "host_ip"] => |h| h.ip(),
        /// Free memory (MiB), may be negative when over-committed.
        HypervisorMemoryFree = "hypervisor_memory_free" ["memory_free", "free_ram_mb"] => |h| h.memory_free(),
        /// Memory size (MiB).
        HypervisorMemorySize = "hypervisor_memory_size" ["memory_size", "memory_mb"] => |h| h.memory_size(),
        /// Used memory (MiB).
        HypervisorMemoryUsed = "hypervisor_memory_used" ["memory_used", "memory_mb_used"] => |h| h.memory_used(),
        /// Host name.
        HypervisorName = "hypervisor_name" ["name", "host_name"] => |h| h.name(),
        /// Number of servers running on the hypervisor.
        HypervisorServerCount = "hypervisor_server_count" ["server_count", "running_vms"] => |h| h.server_count(),
        /// State, `up` or `down`.
        HypervisorState = "hypervisor_state" ["state"] => |h| h.state(),
        /// Status, `enabled` or `disabled`.
        HypervisorStatus = "hypervisor_status" ["status"] => |h| h.status(),
        /// Number of virtual CPUs.
        HypervisorVcpus = "hypervisor_vcpus" ["vcpus"] => |h| h.vcpus(),
        /// Number of used virtual CPUs.
        HypervisorVcpusUsed = "hypervisor_vcpus_used" ["vcpus_used"] => |h| h.vcpus_used(),
    }
}

const STRING_PROPERTIES: &[HypervisorProperties] = &[
    HypervisorProperties::HypervisorIp,
    HypervisorProperties::HypervisorName,
    HypervisorProperties::HypervisorState,
    HypervisorProperties::HypervisorStatus,
];

const INTEGER_PROPERTIES: &[HypervisorProperties] = &[
    HypervisorProperties::HypervisorCurrentWorkload,
    HypervisorProperties::HypervisorDiskFree,
    HypervisorProperties::HypervisorDiskSize,
    HypervisorProperties::HypervisorDiskUsed,
    HypervisorProperties::HypervisorMemoryFree,
    HypervisorProperties::HypervisorMemorySize,
    HypervisorProperties::HypervisorMemoryUsed,
    HypervisorProperties::HypervisorServerCount,
    HypervisorProperties::HypervisorVcpus,
    HypervisorProperties::HypervisorVcpusUsed,
];

impl Hypervisor {
    transparent_property! {
        #[doc = "Number of running tasks."]
        current_workload: Option<u64>
    }

    transparent_property! {
        #[doc = "Free local disk in GiB."]
        disk_free: Option<i64>
    }

    transparent_property! {
        #[doc = "Local disk size in GiB."]
        disk_size: Option<u64>
    }

    transparent_property! {
        #[doc = "Used local disk in GiB."]
        disk_used: Option<u64>
    }

    transparent_property! {
        #[doc = "Hypervisor unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "Host IP address."]
        ip: ref Option<String>
    }

    transparent_property! {
        #[doc = "Free memory in MiB."]
        memory_free: Option<i64>
    }

    transparent_property! {
        #[doc = "Memory size in MiB."]
        memory_size: Option<u64>
    }

    transparent_property! {
        #[doc = "Used memory in MiB."]
        memory_used: Option<u64>
    }

    transparent_property! {
        #[doc = "Hypervisor host name."]
        name: ref String
    }

    transparent_property! {
        #[doc = "Number of running servers."]
        server_count: Option<u64>
    }

    transparent_property! {
        #[doc = "Hypervisor state."]
        state: ref String
    }

    transparent_property! {
        #[doc = "Hypervisor status."]
        status: ref String
    }

    transparent_property! {
        #[doc = "Number of virtual CPUs."]
        vcpus: Option<u64>
    }

    transparent_property! {
        #[doc = "Number of used virtual CPUs."]
        vcpus_used: Option<u64>
    }
}

impl ResourceId for Hypervisor {
    fn resource_id(&self) -> String {
        self.id().clone()
    }
}

#[async_trait]
impl QueryResource for Hypervisor {
    type Property = HypervisorProperties;

    const QUERY_TYPE: QueryType = QueryType::Hypervisor;

    const CAN_PAGINATE: bool = true;

    const SCOPING: ProjectScoping = ProjectScoping::Global;

    const SUPPORTED_PRESETS: &'static [(PresetKind, PropSupport<HypervisorProperties>)] = &[
        (PresetKind::EqualTo, PropSupport::All),
        (PresetKind::NotEqualTo, PropSupport::All),
        (PresetKind::AnyIn, PropSupport::All),
        (PresetKind::NotAnyIn, PropSupport::All),
        (PresetKind::MatchesRegex, PropSupport::Only(STRING_PROPERTIES)),
        (PresetKind::NotMatchesRegex, PropSupport::Only(STRING_PROPERTIES)),
        (PresetKind::GreaterThan, PropSupport::Only(INTEGER_PROPERTIES)),
        (PresetKind::GreaterThanOrEqualTo, PropSupport::Only(INTEGER_PROPERTIES)),
        (PresetKind::LessThan, PropSupport::Only(INTEGER_PROPERTIES)),
        (PresetKind::LessThanOrEqualTo, PropSupport::Only(INTEGER_PROPERTIES)),
    ];

    const CHAIN_LINKS: &'static [ChainLink<HypervisorProperties>] = &[ChainLink {
        from: HypervisorProperties::HypervisorName,
        to: QueryType::Server,
        to_property: "hypervisor_name",
    }];

    async fn list(session: &Session, query: &[(String, String)]) -> Result<Vec<Hypervisor>> {
        Ok(api::list_hypervisors(session, &query)
            .await?
            .into_iter()
            .map(|inner| Hypervisor { inner })
            .collect())
    }
}
