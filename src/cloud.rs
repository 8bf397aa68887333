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

//! Cloud API.

use async_trait::async_trait;
use osauth::Session;

use super::common::{ResourceSource, ServerSideFilters};
use super::compute::{Flavor, Hypervisor, Server};
use super::config::QueryConfig;
use super::identity::{Project, User};
use super::image::Image;
use super::query::{Query, QueryResource, RunnerOptions};
use super::Result;

/// OpenStack cloud API.
///
/// Provides queries over the resources of an OpenStack cloud.
#[derive(Debug, Clone)]
pub struct Cloud {
    session: Session,
    options: RunnerOptions,
}

impl Cloud {
    /// Create a new cloud object with a given session.
    ///
    /// # See Also
    ///
    /// * [from_config](#method.from_config) to create a Cloud from clouds.yaml
    /// * [from_env](#method.from_env) to create a Cloud from environment variables
    /// * [from_query_config](#method.from_query_config) to use a query configuration file
    pub fn new(session: Session) -> Cloud {
        Cloud {
            session,
            options: RunnerOptions::default(),
        }
    }

    /// Create a new cloud object from a configuration file
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn cloud_from_config() -> openstack_query::Result<()> {
    /// let os = openstack_query::Cloud::from_config("cloud-1").await?;
    /// # Ok(()) }
    /// ```
    pub async fn from_config<S: AsRef<str>>(cloud_name: S) -> Result<Cloud> {
        Ok(Cloud::new(Session::from_config(cloud_name).await?))
    }

    /// Create a new cloud object from environment variables.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn cloud_from_env() -> openstack_query::Result<()> {
    /// let os = openstack_query::Cloud::from_env().await?;
    /// # Ok(()) }
    /// ```
    pub async fn from_env() -> Result<Cloud> {
        Ok(Cloud::new(Session::from_env().await?))
    }

    /// Create a new cloud object from a query configuration.
    ///
    /// The cloud named in the configuration is loaded from `clouds.yaml`,
    /// otherwise environment variables are used.
    pub async fn from_query_config(config: &QueryConfig) -> Result<Cloud> {
        let cloud = match config.cloud {
            Some(ref name) => Cloud::from_config(name).await?,
            None => Cloud::from_env().await?,
        };
        Ok(cloud.with_options(config.runner_options()))
    }

    /// Use the given execution options for new queries.
    pub fn with_options(mut self, options: RunnerOptions) -> Cloud {
        self.options = options;
        self
    }

    /// Session in use.
    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Execution options for new queries.
    #[inline]
    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Build a query over resources of the given type.
    pub fn query<R: QueryResource>(&self) -> Query<R> {
        Query::new().with_options(self.options.clone())
    }

    /// Build a query against flavor list.
    ///
    /// The returned object is a builder that should be used to construct
    /// the query.
    #[inline]
    pub fn find_flavors(&self) -> Query<Flavor> {
        self.query()
    }

    /// Build a query against hypervisor list.
    ///
    /// Requires administrative rights.
    #[inline]
    pub fn find_hypervisors(&self) -> Query<Hypervisor> {
        self.query()
    }

    /// Build a query against image list.
    #[inline]
    pub fn find_images(&self) -> Query<Image> {
        self.query()
    }

    /// Build a query against project list.
    #[inline]
    pub fn find_projects(&self) -> Query<Project> {
        self.query()
    }

    /// Build a query against server list.
    #[inline]
    pub fn find_servers(&self) -> Query<Server> {
        self.query()
    }

    /// Build a query against user list.
    #[inline]
    pub fn find_users(&self) -> Query<User> {
        self.query()
    }
}

#[async_trait]
impl<R: QueryResource> ResourceSource<R> for Cloud {
    async fn fetch_chunk(
        &self,
        filters: &ServerSideFilters,
        limit: Option<usize>,
        marker: Option<String>,
    ) -> Result<Vec<R>> {
        let query = filters.to_query(limit, marker.as_deref());
        R::list(&self.session, &query).await
    }
}
