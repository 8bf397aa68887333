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

//! Queries over OpenStack resources.
//!
//! This crate builds filtered, sorted and grouped queries over OpenStack
//! resource collections (servers, flavors, images, hypervisors, users and
//! projects). Filters are pushed to the server when the API supports them
//! and applied locally otherwise. Results of one query can be chained into
//! a query over a related resource type.
//!
//! # Usage
//!
//! Start with creating a [`Cloud`] from a `clouds.yaml` entry or from the
//! `OS_*` environment variables, then build a query:
//!
//! ```rust,no_run
//! use openstack_query::compute::ServerProperties;
//! use openstack_query::query::{QueryPreset, SortOrder};
//!
//! # async fn example() -> openstack_query::Result<()> {
//! let cloud = openstack_query::Cloud::from_env().await?;
//! let mut query = cloud
//!     .find_servers()
//!     .all_projects()
//!     .select([ServerProperties::ServerName, ServerProperties::ServerStatus])
//!     .with_where(QueryPreset::EqualTo("SHUTOFF".into()), ServerProperties::ServerStatus)?
//!     .sort_by(ServerProperties::ServerName, SortOrder::Asc);
//! query.run(&cloud).await?;
//! println!("{}", query.to_string_table(Some("Shut off servers"))?);
//! # Ok(()) }
//! ```
//!
//! # Features
//!
//! * Server-side filtering with a client-side fallback
//! * Pagination with bounded retries
//! * Sorting, grouping and table/HTML/JSON output
//! * [Chaining](query/struct.Query.html#method.then) between resource types

#![crate_name = "openstack_query"]
#![crate_type = "lib"]
// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler.
#![deny(
    non_shorthand_field_patterns,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    trivial_numeric_casts,
    unconditional_recursion,
    unsafe_code,
    unused_allocation,
    unused_comparisons,
    while_true
)]
#![warn(missing_docs, unused, unused_import_braces, unused_parens)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

#[macro_use]
mod utils;

mod cloud;
pub mod common;
pub mod compute;
mod config;
pub mod identity;
pub mod image;
pub mod query;

pub use osauth::{Error, ErrorKind};

pub use crate::cloud::Cloud;
pub use crate::common::PropValue;
pub use crate::config::QueryConfig;
pub use crate::query::Query;

/// A result of an OpenStack operation.
pub type Result<T> = std::result::Result<T, Error>;
