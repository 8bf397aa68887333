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

//! Query engine: conditions, execution, sorting, grouping and output.
//!
//! A [Query](struct.Query.html) combines:
//!
//! * conditions built from [presets](enum.QueryPreset.html), pushed to the
//!   server when the API supports them and checked locally otherwise;
//! * execution with pagination and bounded retries;
//! * sorting and grouping of the results;
//! * selection of properties and rendering as rows, tables, HTML or JSON.
//!
//! Queries over related resource types can be chained with
//! [then](struct.Query.html#method.then) and
//! [append_from](struct.Query.html#method.append_from).

mod api;
mod base;
mod builder;
mod chainer;
mod handlers;
mod output;
mod parser;
mod presets;
mod runner;
pub mod server_side;
#[cfg(test)]
pub(crate) mod testing;

pub use self::api::Query;
pub use self::base::{
    parse_property, ChainLink, ProjectScoping, PropSupport, QueryProperty, QueryResource,
    QueryType,
};
pub use self::builder::QueryBuilder;
pub use self::handlers::{
    handler_for, ClientSideFilter, DateTimeHandler, GenericHandler, IntegerHandler, Predicate,
    PresetHandler, StringHandler,
};
pub use self::output::{
    escape_html, render_html, render_table, ForwardedOutputs, PropColumns, PropRow, QueryOutput,
    NO_RESULTS,
};
pub use self::parser::{GroupBy, Grouping, QueryParser, SortOrder, UNGROUPED};
pub use self::presets::{PresetFamily, PresetKind, QueryPreset, TimeReference};
pub use self::runner::{QueryRunner, RunScope, RunnerOptions};
