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

//! Foundation bits exposing the Identity API.

use std::fmt::Debug;

use osauth::services::{GenericService, VersionSelector};
use osauth::Session;
use serde::Serialize;

use super::protocol::*;
use crate::Result;

/// Identity service v3.
const IDENTITY: GenericService = GenericService::new("identity", VersionSelector::Major(3));

/// List users.
pub async fn list_users<Q: Serialize + Sync + Debug>(
    session: &Session,
    query: &Q,
) -> Result<Vec<User>> {
    trace!("Listing users with {:?}", query);
    let root: UsersRoot = session.get(IDENTITY, &["users"]).query(query).fetch().await?;
    trace!("Received users: {:?}", root.users);
    Ok(root.users)
}

/// List projects.
pub async fn list_projects<Q: Serialize + Sync + Debug>(
    session: &Session,
    query: &Q,
) -> Result<Vec<Project>> {
    trace!("Listing projects with {:?}", query);
    let root: ProjectsRoot = session
        .get(IDENTITY, &["projects"])
        .query(query)
        .fetch()
        .await?;
    trace!("Received projects: {:?}", root.projects);
    Ok(root.projects)
}
