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

//! Query configuration.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::query::RunnerOptions;
use crate::{Error, ErrorKind, Result};

const CONFIG_ENV: &str = "OS_QUERY_CONFIG";
const LOCAL_CONFIG: &str = "openstack-query.yaml";
const SYSTEM_CONFIG: &str = "/etc/openstack/query.yaml";

/// Configuration of query execution.
///
/// Loaded from YAML:
///
/// ```yaml
/// cloud: devstack-admin
/// page_size: 500
/// max_retries: 5
/// retry_delay_ms: 2000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// Name of the cloud in `clouds.yaml`, `None` to use `OS_*` variables.
    #[serde(default)]
    pub cloud: Option<String>,
    /// Page size, `None` for the default of each resource type.
    #[serde(default)]
    pub page_size: Option<usize>,
    /// How many times a failed page request is retried.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// Delay between retries in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_max_retries() -> usize {
    RunnerOptions::default().max_retries
}

fn default_retry_delay_ms() -> u64 {
    duration_millis(RunnerOptions::default().retry_delay)
}

fn duration_millis(value: Duration) -> u64 {
    u64::try_from(value.as_millis()).unwrap_or(u64::MAX)
}

impl Default for QueryConfig {
    fn default() -> QueryConfig {
        QueryConfig {
            cloud: None,
            page_size: None,
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl QueryConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(source: &str) -> Result<QueryConfig> {
        let config: QueryConfig = serde_yaml::from_str(source).map_err(|err| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot parse query configuration: {}", err),
            )
        })?;
        if config.page_size == Some(0) {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                "Page size must be positive",
            ));
        }
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<QueryConfig> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|err| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot read {}: {}", path.display(), err),
            )
        })?;
        debug!("Loading query configuration from {}", path.display());
        QueryConfig::from_yaml(&source)
    }

    /// Find and load the configuration.
    ///
    /// Looks at `$OS_QUERY_CONFIG`, then `./openstack-query.yaml`, then
    /// `/etc/openstack/query.yaml`. The defaults are used if none exists.
    /// A file named in `$OS_QUERY_CONFIG` must exist.
    pub fn find() -> Result<QueryConfig> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return QueryConfig::from_file(PathBuf::from(path));
        }

        for candidate in [Path::new(LOCAL_CONFIG), Path::new(SYSTEM_CONFIG)] {
            if candidate.is_file() {
                return QueryConfig::from_file(candidate);
            }
        }

        trace!("No query configuration found, using defaults");
        Ok(QueryConfig::default())
    }

    /// Execution options from this configuration.
    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            page_size: self.page_size,
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}
