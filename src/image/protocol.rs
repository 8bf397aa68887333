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

//! JSON structures and protocol bits for the Image API.

#![allow(missing_docs)]

use chrono::{DateTime, FixedOffset};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Image {
    pub created_at: DateTime<FixedOffset>,
    pub id: String,
    #[serde(default)]
    pub min_disk: u64,
    #[serde(default)]
    pub min_ram: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    pub status: String,
    pub updated_at: DateTime<FixedOffset>,
    pub visibility: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ImagesRoot {
    pub images: Vec<Image>,
}
