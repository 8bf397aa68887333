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

//! These tests need a real cloud configured via `OS_*` environment variables
//! (or `$OS_QUERY_CONFIG`). Run them with `cargo test -- --ignored`.

use std::sync::Once;

use openstack_query::compute::{Flavor, FlavorProperties, Server, ServerProperties};
use openstack_query::identity::UserProperties;
use openstack_query::query::{Grouping, QueryPreset, SortOrder, TimeReference};
use openstack_query::{Cloud, QueryConfig};

static INIT: Once = Once::new();

async fn set_up() -> Cloud {
    INIT.call_once(|| {
        env_logger::init();
    });

    let config = QueryConfig::find().expect("Invalid query configuration");
    Cloud::from_query_config(&config)
        .await
        .expect("Failed to create an identity provider from the environment")
}

#[tokio::test]
#[ignore]
async fn test_list_flavors() {
    let os = set_up().await;
    let mut query = os
        .find_flavors()
        .select([FlavorProperties::FlavorName, FlavorProperties::FlavorRam])
        .sort_by(FlavorProperties::FlavorRam, SortOrder::Asc);
    query.run(&os).await.expect("Cannot list flavors");
    assert!(!query.results().unwrap().is_empty());
    println!("{}", query.to_string_table(Some("Flavors")).unwrap());
}

#[tokio::test]
#[ignore]
async fn test_filter_flavors_server_side() {
    let os = set_up().await;
    let mut query = os
        .find_flavors()
        .with_where(
            QueryPreset::GreaterThanOrEqualTo(1024),
            FlavorProperties::FlavorRam,
        )
        .expect("Invalid condition");
    query.run(&os).await.expect("Cannot list flavors");
    for flavor in query.results().unwrap() {
        assert!(flavor.ram() >= 1024);
    }
}

#[tokio::test]
#[ignore]
async fn test_list_images() {
    let os = set_up().await;
    let mut query = os.find_images().with_page_size(1);
    query.run(&os).await.expect("Cannot list images");
    assert!(!query.results().unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_list_recent_servers() {
    let os = set_up().await;
    let mut query = os
        .find_servers()
        .with_where(
            QueryPreset::YoungerThanOrEqualTo(TimeReference::days_ago(30)),
            ServerProperties::ServerLastUpdatedDate,
        )
        .expect("Invalid condition")
        .group_by(ServerProperties::ServerStatus);
    query.run(&os).await.expect("Cannot list servers");
    match query.to_objects().unwrap() {
        Grouping::Grouped(_) => (),
        other => panic!("Expected grouped results, got {:?}", other),
    }
}

#[tokio::test]
#[ignore]
async fn test_chain_servers_to_flavors() {
    let os = set_up().await;
    let mut servers = os.find_servers().select([ServerProperties::ServerName]);
    servers.run(&os).await.expect("Cannot list servers");
    let mut flavors = servers
        .then::<Flavor>(true)
        .expect("Cannot chain")
        .select([FlavorProperties::FlavorName]);
    flavors.run(&os).await.expect("Cannot list flavors");
    let _ = flavors.to_json().expect("Cannot serialize results");
}

#[tokio::test]
#[ignore]
async fn test_append_users() {
    let os = set_up().await;
    let mut servers = os.query::<Server>().select([ServerProperties::ServerId]);
    servers.run(&os).await.expect("Cannot list servers");
    servers
        .append_from::<openstack_query::identity::User, _, _>(&os, [UserProperties::UserName])
        .await
        .expect("Cannot append users");
    let _ = servers.to_html(None).expect("Cannot render results");
}

#[tokio::test]
#[ignore]
async fn test_list_hypervisors_and_projects() {
    let os = set_up().await;
    let mut hypervisors = os.find_hypervisors();
    hypervisors.run(&os).await.expect("Cannot list hypervisors");
    let mut projects = os.find_projects();
    projects.run(&os).await.expect("Cannot list projects");
    assert!(!projects.results().unwrap().is_empty());
}
