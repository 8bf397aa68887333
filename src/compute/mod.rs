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

//! Compute API resources: servers, flavors and hypervisors.
//!
//! # Limitations
//!
//! Servers are listed with microversion 2.19, flavors with 2.55 and
//! hypervisors with 2.53.

mod api;
mod flavors;
mod hypervisors;
mod protocol;
mod servers;

pub use flavors::{Flavor, FlavorProperties};
pub use hypervisors::{Hypervisor, HypervisorProperties};
pub use servers::{Server, ServerProperties};
