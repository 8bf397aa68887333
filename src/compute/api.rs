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

//! Foundation bits exposing the Compute API.

use std::fmt::Debug;

use osauth::services::COMPUTE;
use osauth::Session;
use serde::Serialize;

use super::protocol::*;
use crate::Result;

/// List servers with details.
pub async fn list_servers<Q: Serialize + Sync + Debug>(
    session: &Session,
    query: &Q,
) -> Result<Vec<Server>> {
    trace!("Listing servers with {:?}", query);
    let root: ServersRoot = session
        .get(COMPUTE, &["servers", "detail"])
        .api_version(API_VERSION_SERVERS)
        .query(query)
        .fetch()
        .await?;
    trace!("Received servers: {:?}", root.servers);
    Ok(root.servers)
}

/// List flavors with details.
pub async fn list_flavors<Q: Serialize + Sync + Debug>(
    session: &Session,
    query: &Q,
) -> Result<Vec<Flavor>> {
    trace!("Listing flavors with {:?}", query);
    let root: FlavorsRoot = session
        .get(COMPUTE, &["flavors", "detail"])
        .api_version(API_VERSION_FLAVORS)
        .query(query)
        .fetch()
        .await?;
    trace!("Received flavors: {:?}", root.flavors);
    Ok(root.flavors)
}

/// List hypervisors with details.
pub async fn list_hypervisors<Q: Serialize + Sync + Debug>(
    session: &Session,
    query: &Q,
) -> Result<Vec<Hypervisor>> {
    trace!("Listing hypervisors with {:?}", query);
    let root: HypervisorsRoot = session
        .get(COMPUTE, &["os-hypervisors", "detail"])
        .api_version(API_VERSION_HYPERVISORS)
        .query(query)
        .fetch()
        .await?;
    trace!("Received hypervisors: {:?}", root.hypervisors);
    Ok(root.hypervisors)
}
