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

//! Foundation bits exposing the Image API.

use std::fmt::Debug;

use osauth::services::IMAGE;
use osauth::Session;
use serde::Serialize;

use super::protocol::*;
use crate::Result;

/// List images.
pub async fn list_images<Q: Serialize + Sync + Debug>(
    session: &Session,
    query: &Q,
) -> Result<Vec<Image>> {
    trace!("Listing images with {:?}", query);
    let root: ImagesRoot = session.get(IMAGE, &["images"]).query(query).fetch().await?;
    trace!("Received images: {:?}", root.images);
    Ok(root.images)
}
