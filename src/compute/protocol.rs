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

//! JSON structures and protocol bits for the Compute API.

#![allow(missing_docs)]

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use osauth::ApiVersion;

use crate::common::protocol::{empty_as_default, Ref};
use crate::utils::some_truth;

/// Flavor ID is still reported in server details.
pub const API_VERSION_SERVERS: ApiVersion = ApiVersion(2, 19);
/// Flavor descriptions.
pub const API_VERSION_FLAVORS: ApiVersion = ApiVersion(2, 55);
/// Hypervisor IDs are UUIDs, pagination is supported.
pub const API_VERSION_HYPERVISORS: ApiVersion = ApiVersion(2, 53);

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServerAddress {
    pub addr: String,
    #[serde(rename = "OS-EXT-IPS:type", default)]
    pub addr_type: Option<String>,
    #[serde(default)]
    pub version: Option<u8>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Server {
    #[serde(default)]
    pub addresses: BTreeMap<String, Vec<ServerAddress>>,
    #[serde(rename = "created")]
    pub created_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub description: Option<String>,
    pub flavor: Ref,
    #[serde(rename = "OS-EXT-SRV-ATTR:hypervisor_hostname", default)]
    pub hypervisor_name: Option<String>,
    pub id: String,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub image: Option<Ref>,
    pub name: String,
    pub status: String,
    #[serde(rename = "tenant_id")]
    pub project_id: String,
    #[serde(rename = "updated")]
    pub updated_at: DateTime<FixedOffset>,
    pub user_id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServersRoot {
    pub servers: Vec<Server>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Flavor {
    #[serde(default)]
    pub description: Option<String>,
    pub disk: u64,
    #[serde(rename = "OS-FLV-EXT-DATA:ephemeral", default)]
    pub ephemeral: u64,
    pub id: String,
    #[serde(rename = "os-flavor-access:is_public", default = "some_truth")]
    pub is_public: bool,
    pub name: String,
    pub ram: u64,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub swap: u64,
    pub vcpus: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FlavorsRoot {
    pub flavors: Vec<Flavor>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Hypervisor {
    #[serde(default)]
    pub current_workload: Option<u64>,
    #[serde(rename = "free_disk_gb", default)]
    pub disk_free: Option<i64>,
    #[serde(rename = "local_gb", default)]
    pub disk_size: Option<u64>,
    #[serde(rename = "local_gb_used", default)]
    pub disk_used: Option<u64>,
    #[serde(deserialize_with = "crate::common::protocol::deser_id")]
    pub id: String,
    #[serde(rename = "host_ip", default)]
    pub ip: Option<String>,
    #[serde(rename = "free_ram_mb", default)]
    pub memory_free: Option<i64>,
    #[serde(rename = "memory_mb", default)]
    pub memory_size: Option<u64>,
    #[serde(rename = "memory_mb_used", default)]
    pub memory_used: Option<u64>,
    #[serde(rename = "hypervisor_hostname")]
    pub name: String,
    #[serde(rename = "running_vms", default)]
    pub server_count: Option<u64>,
    pub state: String,
    pub status: String,
    #[serde(default)]
    pub vcpus: Option<u64>,
    #[serde(default)]
    pub vcpus_used: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HypervisorsRoot {
    pub hypervisors: Vec<Hypervisor>,
}
