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

//! In-memory resource sources for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;

use super::base::{QueryProperty, QueryResource};
use crate::common::{PropValue, ResourceId, ResourceSource, ServerSideFilters};
use crate::compute::{
    Flavor, FlavorProperties, Hypervisor, Server, ServerProperties,
};
use crate::identity::{Project, ProjectProperties, User, UserProperties};
use crate::image::{Image, ImageProperties};
use crate::{Error, ErrorKind, Result};

/// How a fake source interprets a query parameter.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FakeFilter<P> {
    Exact(P),
    Regex(P),
    AtLeast(P),
    AtMost(P),
    Since(P),
}

/// A resource that can be served by a fake source.
pub(crate) trait FakeResource: QueryResource {
    /// Interpretation of a query parameter, `None` to ignore it.
    fn fake_filter(key: &str) -> Option<FakeFilter<Self::Property>>;

    /// Source of this resource type in a fake cloud.
    fn source(cloud: &FakeCloud) -> &FakeSource<Self>;
}

fn fake_matches<R: FakeResource>(item: &R, key: &str, expected: &str) -> bool {
    match R::fake_filter(key) {
        None => true,
        Some(FakeFilter::Exact(prop)) => match prop.value_of(item) {
            PropValue::List(values) => values.iter().any(|v| v.to_filter_string() == expected),
            value => value.to_filter_string() == expected,
        },
        Some(FakeFilter::Regex(prop)) => Regex::new(expected)
            .map(|re| re.is_match(&prop.value_of(item).to_string()))
            .unwrap_or(false),
        Some(FakeFilter::AtLeast(prop)) => {
            match (prop.value_of(item).as_integer(), expected.parse::<i64>()) {
                (Some(value), Ok(limit)) => value >= limit,
                _ => false,
            }
        }
        Some(FakeFilter::AtMost(prop)) => {
            match (prop.value_of(item).as_integer(), expected.parse::<i64>()) {
                (Some(value), Ok(limit)) => value <= limit,
                _ => false,
            }
        }
        Some(FakeFilter::Since(prop)) => match (
            prop.value_of(item).as_datetime(),
            PropValue::from(expected).as_datetime(),
        ) {
            (Some(value), Some(since)) => value >= since,
            _ => false,
        },
    }
}

/// A recorded listing call.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub filters: ServerSideFilters,
    pub limit: Option<usize>,
    pub marker: Option<String>,
}

/// An in-memory listing API with limit/marker pagination.
#[derive(Debug)]
pub(crate) struct FakeSource<R> {
    items: Vec<R>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<VecDeque<ErrorKind>>,
}

impl<R: FakeResource> FakeSource<R> {
    pub fn new(items: Vec<R>) -> FakeSource<R> {
        FakeSource {
            items,
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Make the next `count` calls fail with the given kind.
    pub fn fail_next(&self, kind: ErrorKind, count: usize) {
        let mut failures = self.failures.lock().unwrap();
        for _ in 0..count {
            failures.push_back(kind);
        }
    }

    fn list(
        &self,
        filters: &ServerSideFilters,
        limit: Option<usize>,
        marker: Option<String>,
    ) -> Result<Vec<R>> {
        self.calls.lock().unwrap().push(Call {
            filters: filters.clone(),
            limit,
            marker: marker.clone(),
        });
        if let Some(kind) = self.failures.lock().unwrap().pop_front() {
            return Err(Error::new(kind, "Injected failure"));
        }

        let matching: Vec<&R> = self
            .items
            .iter()
            .filter(|item| {
                filters
                    .iter()
                    .all(|(key, value)| fake_matches(*item, key, value))
            })
            .collect();
        let start = match marker {
            Some(marker) => {
                matching
                    .iter()
                    .position(|item| item.resource_id() == marker)
                    .ok_or_else(|| {
                        Error::new(
                            ErrorKind::ResourceNotFound,
                            format!("Marker {} not found", marker),
                        )
                    })?
                    + 1
            }
            None => 0,
        };
        Ok(matching
            .into_iter()
            .skip(start)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl<R: FakeResource> ResourceSource<R> for FakeSource<R> {
    async fn fetch_chunk(
        &self,
        filters: &ServerSideFilters,
        limit: Option<usize>,
        marker: Option<String>,
    ) -> Result<Vec<R>> {
        self.list(filters, limit, marker)
    }
}

/// A fake cloud with all resource types.
#[derive(Debug)]
pub(crate) struct FakeCloud {
    pub servers: FakeSource<Server>,
    pub flavors: FakeSource<Flavor>,
    pub images: FakeSource<Image>,
    pub hypervisors: FakeSource<Hypervisor>,
    pub users: FakeSource<User>,
    pub projects: FakeSource<Project>,
}

impl FakeCloud {
    pub fn new() -> FakeCloud {
        FakeCloud {
            servers: FakeSource::new(Vec::new()),
            flavors: FakeSource::new(Vec::new()),
            images: FakeSource::new(Vec::new()),
            hypervisors: FakeSource::new(Vec::new()),
            users: FakeSource::new(Vec::new()),
            projects: FakeSource::new(Vec::new()),
        }
    }

    pub fn with_servers(mut self, items: Vec<Server>) -> FakeCloud {
        self.servers = FakeSource::new(items);
        self
    }

    pub fn with_flavors(mut self, items: Vec<Flavor>) -> FakeCloud {
        self.flavors = FakeSource::new(items);
        self
    }

    pub fn with_images(mut self, items: Vec<Image>) -> FakeCloud {
        self.images = FakeSource::new(items);
        self
    }

    pub fn with_hypervisors(mut self, items: Vec<Hypervisor>) -> FakeCloud {
        self.hypervisors = FakeSource::new(items);
        self
    }

    pub fn with_users(mut self, items: Vec<User>) -> FakeCloud {
        self.users = FakeSource::new(items);
        self
    }

    pub fn with_projects(mut self, items: Vec<Project>) -> FakeCloud {
        self.projects = FakeSource::new(items);
        self
    }
}

#[async_trait]
impl<R: FakeResource> ResourceSource<R> for FakeCloud {
    async fn fetch_chunk(
        &self,
        filters: &ServerSideFilters,
        limit: Option<usize>,
        marker: Option<String>,
    ) -> Result<Vec<R>> {
        R::source(self).list(filters, limit, marker)
    }
}

impl FakeResource for Server {
    fn fake_filter(key: &str) -> Option<FakeFilter<ServerProperties>> {
        Some(match key {
            "uuid" => FakeFilter::Exact(ServerProperties::ServerId),
            "status" => FakeFilter::Exact(ServerProperties::ServerStatus),
            "flavor" => FakeFilter::Exact(ServerProperties::FlavorId),
            "image" => FakeFilter::Exact(ServerProperties::ImageId),
            "project_id" => FakeFilter::Exact(ServerProperties::ProjectId),
            "user_id" => FakeFilter::Exact(ServerProperties::UserId),
            "node" => FakeFilter::Exact(ServerProperties::HypervisorName),
            "name" => FakeFilter::Regex(ServerProperties::ServerName),
            "changes-since" => FakeFilter::Since(ServerProperties::ServerLastUpdatedDate),
            _ => return None,
        })
    }

    fn source(cloud: &FakeCloud) -> &FakeSource<Server> {
        &cloud.servers
    }
}

impl FakeResource for Flavor {
    fn fake_filter(key: &str) -> Option<FakeFilter<FlavorProperties>> {
        Some(match key {
            "minRam" => FakeFilter::AtLeast(FlavorProperties::FlavorRam),
            "minDisk" => FakeFilter::AtLeast(FlavorProperties::FlavorDisk),
            "is_public" => FakeFilter::Exact(FlavorProperties::FlavorIsPublic),
            _ => return None,
        })
    }

    fn source(cloud: &FakeCloud) -> &FakeSource<Flavor> {
        &cloud.flavors
    }
}

impl FakeResource for Image {
    fn fake_filter(key: &str) -> Option<FakeFilter<ImageProperties>> {
        Some(match key {
            "id" => FakeFilter::Exact(ImageProperties::ImageId),
            "name" => FakeFilter::Exact(ImageProperties::ImageName),
            "status" => FakeFilter::Exact(ImageProperties::ImageStatus),
            "owner" => FakeFilter::Exact(ImageProperties::ImageOwner),
            "visibility" => FakeFilter::Exact(ImageProperties::ImageVisibility),
            "size_min" => FakeFilter::AtLeast(ImageProperties::ImageSize),
            "size_max" => FakeFilter::AtMost(ImageProperties::ImageSize),
            _ => return None,
        })
    }

    fn source(cloud: &FakeCloud) -> &FakeSource<Image> {
        &cloud.images
    }
}

impl FakeResource for Hypervisor {
    fn fake_filter(_key: &str) -> Option<FakeFilter<crate::compute::HypervisorProperties>> {
        None
    }

    fn source(cloud: &FakeCloud) -> &FakeSource<Hypervisor> {
        &cloud.hypervisors
    }
}

impl FakeResource for User {
    fn fake_filter(key: &str) -> Option<FakeFilter<UserProperties>> {
        Some(match key {
            "name" => FakeFilter::Exact(UserProperties::UserName),
            "domain_id" => FakeFilter::Exact(UserProperties::UserDomainId),
            "enabled" => FakeFilter::Exact(UserProperties::UserEnabled),
            _ => return None,
        })
    }

    fn source(cloud: &FakeCloud) -> &FakeSource<User> {
        &cloud.users
    }
}

impl FakeResource for Project {
    fn fake_filter(key: &str) -> Option<FakeFilter<ProjectProperties>> {
        Some(match key {
            "name" => FakeFilter::Exact(ProjectProperties::ProjectName),
            "domain_id" => FakeFilter::Exact(ProjectProperties::ProjectDomainId),
            "parent_id" => FakeFilter::Exact(ProjectProperties::ProjectParentId),
            "enabled" => FakeFilter::Exact(ProjectProperties::ProjectIsEnabled),
            "is_domain" => FakeFilter::Exact(ProjectProperties::ProjectIsDomain),
            _ => return None,
        })
    }

    fn source(cloud: &FakeCloud) -> &FakeSource<Project> {
        &cloud.projects
    }
}

/// A server in project `p1` using flavor `f0` and image `i0`.
pub(crate) fn server(id: &str, name: &str, status: &str) -> Server {
    server_in(id, name, status, "p1")
}

/// A server in the given project.
pub(crate) fn server_in(id: &str, name: &str, status: &str, project_id: &str) -> Server {
    serde_json::from_value(json!({
        "addresses": {},
        "created": "2024-01-01T00:00:00Z",
        "flavor": {"id": "f0"},
        "id": id,
        "image": {"id": "i0"},
        "name": name,
        "status": status,
        "tenant_id": project_id,
        "updated": "2024-01-02T00:00:00Z",
        "user_id": "u1",
    }))
    .unwrap()
}

pub(crate) fn flavor(id: &str, name: &str, ram: u64) -> Flavor {
    serde_json::from_value(json!({
        "disk": 10,
        "id": id,
        "name": name,
        "ram": ram,
        "vcpus": 1,
    }))
    .unwrap()
}

pub(crate) fn image(id: &str, name: &str, owner: &str) -> Image {
    serde_json::from_value(json!({
        "created_at": "2024-01-01T00:00:00Z",
        "id": id,
        "min_disk": 1,
        "min_ram": 512,
        "name": name,
        "owner": owner,
        "size": 1048576,
        "status": "active",
        "updated_at": "2024-01-01T00:00:00Z",
        "visibility": "private",
    }))
    .unwrap()
}

pub(crate) fn hypervisor(id: &str, name: &str) -> Hypervisor {
    serde_json::from_value(json!({
        "hypervisor_hostname": name,
        "id": id,
        "memory_mb": 8192,
        "memory_mb_used": 1024,
        "running_vms": 1,
        "state": "up",
        "status": "enabled",
        "vcpus": 8,
        "vcpus_used": 1,
    }))
    .unwrap()
}

pub(crate) fn user(id: &str, name: &str) -> User {
    serde_json::from_value(json!({
        "domain_id": "default",
        "email": format!("{}@example.com", name),
        "enabled": true,
        "id": id,
        "name": name,
    }))
    .unwrap()
}

pub(crate) fn project(id: &str, name: &str) -> Project {
    serde_json::from_value(json!({
        "domain_id": "default",
        "enabled": true,
        "id": id,
        "is_domain": false,
        "name": name,
        "parent_id": "default",
        "tags": [],
    }))
    .unwrap()
}
