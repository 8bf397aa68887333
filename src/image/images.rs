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

//! Image queries via Image API.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use osauth::Session;

use super::{api, protocol};
use crate::common::{ResourceId, ServerSideFilters};
use crate::query::server_side::{at_least, at_most, equal_or_any_in, time_comparison};
use crate::query::{
    ChainLink, PresetKind, ProjectScoping, PropSupport, QueryPreset, QueryResource, QueryType,
};
use crate::Result;

/// Structure representing a single image.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Image {
    inner: protocol::Image,
}

query_properties! {
    /// Queryable properties of an image.
    enum ImageProperties for Image {
        /// When the image was created.
        ImageCreationDate = "image_creation_date" ["created_at"] => |i| i.created_at(),
        /// Unique ID.
        ImageId = "image_id" ["id", "uuid"] => |i| i.id(),
        /// When the image was last updated.
        ImageLastUpdatedDate = "image_last_updated_date" ["updated_at"] => |i| i.updated_at(),
        /// Minimum RAM required to boot the image (MiB).
        ImageMinimumRam = "image_minimum_ram" ["min_ram"] => |i| i.minimum_ram(),
        /// Minimum disk required to boot the image (GiB).
        ImageMinimumDisk = "image_minimum_disk" ["min_disk"] => |i| i.minimum_disk(),
        /// Image name.
        ImageName = "image_name" ["name"] => |i| i.name(),
        /// ID of the owning project.
        ImageOwner = "image_owner" ["owner", "project_id"] => |i| i.owner(),
        /// Size of the image data (bytes).
        ImageSize = "image_size" ["size"] => |i| i.size(),
        /// Image status, e.g. `active`.
        ImageStatus = "image_status" ["status"] => |i| i.status(),
        /// Image visibility, e.g. `public`.
        ImageVisibility = "image_visibility" ["visibility"] => |i| i.visibility(),
    }
}

const STRING_PROPERTIES: &[ImageProperties] = &[
    ImageProperties::ImageName,
    ImageProperties::ImageOwner,
    ImageProperties::ImageStatus,
    ImageProperties::ImageVisibility,
];

const DATE_PROPERTIES: &[ImageProperties] = &[
    ImageProperties::ImageCreationDate,
    ImageProperties::ImageLastUpdatedDate,
];

const SIZE_PROPERTIES: &[ImageProperties] = &[
    ImageProperties::ImageMinimumDisk,
    ImageProperties::ImageMinimumRam,
    ImageProperties::ImageSize,
];

impl Image {
    transparent_property! {
        #[doc = "Image creation date and time."]
        created_at: DateTime<FixedOffset>
    }

    transparent_property! {
        #[doc = "Image unique ID."]
        id: ref String
    }

    /// Minimum disk required to boot the image in GiB.
    #[inline]
    pub fn minimum_disk(&self) -> u64 {
        self.inner.min_disk
    }

    /// Minimum RAM required to boot the image in MiB.
    #[inline]
    pub fn minimum_ram(&self) -> u64 {
        self.inner.min_ram
    }

    transparent_property! {
        #[doc = "Image name."]
        name: ref Option<String>
    }

    transparent_property! {
        #[doc = "ID of the owning project."]
        owner: ref Option<String>
    }

    transparent_property! {
        #[doc = "Image size in bytes (if uploaded)."]
        size: Option<u64>
    }

    transparent_property! {
        #[doc = "Image status."]
        status: ref String
    }

    transparent_property! {
        #[doc = "Last update date and time."]
        updated_at: DateTime<FixedOffset>
    }

    transparent_property! {
        #[doc = "Image visibility."]
        visibility: ref String
    }
}

impl ResourceId for Image {
    fn resource_id(&self) -> String {
        self.id().clone()
    }
}

#[async_trait]
impl QueryResource for Image {
    type Property = ImageProperties;

    const QUERY_TYPE: QueryType = QueryType::Image;

    const CAN_PAGINATE: bool = true;

    const SCOPING: ProjectScoping = ProjectScoping::Scoped {
        project_key: "owner",
        all_projects: None,
    };

    const SUPPORTED_PRESETS: &'static [(PresetKind, PropSupport<ImageProperties>)] = &[
        (PresetKind::EqualTo, PropSupport::All),
        (PresetKind::NotEqualTo, PropSupport::All),
        (PresetKind::AnyIn, PropSupport::All),
        (PresetKind::NotAnyIn, PropSupport::All),
        (PresetKind::MatchesRegex, PropSupport::Only(STRING_PROPERTIES)),
        (PresetKind::NotMatchesRegex, PropSupport::Only(STRING_PROPERTIES)),
        (PresetKind::OlderThan, PropSupport::Only(DATE_PROPERTIES)),
        (PresetKind::OlderThanOrEqualTo, PropSupport::Only(DATE_PROPERTIES)),
        (PresetKind::YoungerThan, PropSupport::Only(DATE_PROPERTIES)),
        (PresetKind::YoungerThanOrEqualTo, PropSupport::Only(DATE_PROPERTIES)),
        (PresetKind::GreaterThan, PropSupport::Only(SIZE_PROPERTIES)),
        (PresetKind::GreaterThanOrEqualTo, PropSupport::Only(SIZE_PROPERTIES)),
        (PresetKind::LessThan, PropSupport::Only(SIZE_PROPERTIES)),
        (PresetKind::LessThanOrEqualTo, PropSupport::Only(SIZE_PROPERTIES)),
    ];

    const CHAIN_LINKS: &'static [ChainLink<ImageProperties>] = &[ChainLink {
        from: ImageProperties::ImageId,
        to: QueryType::Server,
        to_property: "image_id",
    }];

    fn server_side_filters(
        preset: &QueryPreset,
        prop: ImageProperties,
    ) -> Option<Vec<ServerSideFilters>> {
        match prop {
            ImageProperties::ImageId => equal_or_any_in(preset, "id"),
            ImageProperties::ImageName => equal_or_any_in(preset, "name"),
            ImageProperties::ImageStatus => equal_or_any_in(preset, "status"),
            ImageProperties::ImageOwner => equal_or_any_in(preset, "owner"),
            ImageProperties::ImageVisibility => equal_or_any_in(preset, "visibility"),
            ImageProperties::ImageCreationDate => time_comparison(preset, "created_at"),
            ImageProperties::ImageLastUpdatedDate => time_comparison(preset, "updated_at"),
            ImageProperties::ImageSize => {
                at_least(preset, "size_min").or_else(|| at_most(preset, "size_max"))
            }
            _ => None,
        }
    }

    async fn list(session: &Session, query: &[(String, String)]) -> Result<Vec<Image>> {
        Ok(api::list_images(session, &query)
            .await?
            .into_iter()
            .map(|inner| Image { inner })
            .collect())
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};

    use super::{Image, ImageProperties};
    use crate::common::PropValue;
    use crate::query::{QueryPreset, QueryProperty, QueryResource, TimeReference};

    const IMAGE_RESPONSE: &str = r#"
    {
        "status": "active",
        "name": "cirros-0.3.2-x86_64-disk",
        "tags": [],
        "container_format": "bare",
        "created_at": "2014-05-05T17:15:10Z",
        "disk_format": "qcow2",
        "updated_at": "2014-05-05T17:15:11Z",
        "visibility": "public",
        "self": "/v2/images/1bea47ed-f6a9-463b-b423-14b9cca9ad27",
        "min_disk": 0,
        "protected": false,
        "id": "1bea47ed-f6a9-463b-b423-14b9cca9ad27",
        "file": "/v2/images/1bea47ed-f6a9-463b-b423-14b9cca9ad27/file",
        "checksum": "64d7c1cd2b6f60c92c14662941cb7913",
        "owner": "5ef70662f8b34079a6eddb8da9d75fe8",
        "size": 13167616,
        "min_ram": 0,
        "schema": "/v2/schemas/image",
        "virtual_size": null
    }"#;

    #[test]
    fn test_image_from_json() {
        let image: Image = serde_json::from_str(IMAGE_RESPONSE).unwrap();
        assert_eq!(image.id(), "1bea47ed-f6a9-463b-b423-14b9cca9ad27");
        assert_eq!(image.size(), Some(13167616));
        assert_eq!(
            ImageProperties::ImageName.value_of(&image),
            PropValue::from("cirros-0.3.2-x86_64-disk")
        );
        assert_eq!(
            ImageProperties::ImageMinimumRam.value_of(&image),
            PropValue::Integer(0)
        );
        assert_eq!(
            "project_id".parse::<ImageProperties>().unwrap(),
            ImageProperties::ImageOwner
        );
    }

    #[test]
    fn test_unnamed_image() {
        let image: Image = serde_json::from_str(
            r#"{"id": "x", "status": "queued", "visibility": "private",
                "created_at": "2014-05-05T17:15:10Z", "updated_at": "2014-05-05T17:15:10Z",
                "name": null, "size": null}"#,
        )
        .unwrap();
        assert!(ImageProperties::ImageName.value_of(&image).is_null());
        assert!(ImageProperties::ImageSize.value_of(&image).is_null());
    }

    #[test]
    fn test_server_side_filters() {
        let at = TimeReference::At(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        let filters = Image::server_side_filters(
            &QueryPreset::OlderThan(at),
            ImageProperties::ImageCreationDate,
        )
        .unwrap();
        assert_eq!(filters[0].get("created_at"), Some("lt:2024-03-01T12:00:00Z"));

        let filters = Image::server_side_filters(
            &QueryPreset::LessThanOrEqualTo(1024),
            ImageProperties::ImageSize,
        )
        .unwrap();
        assert_eq!(filters[0].get("size_max"), Some("1024"));
        let filters = Image::server_side_filters(
            &QueryPreset::GreaterThanOrEqualTo(1024),
            ImageProperties::ImageSize,
        )
        .unwrap();
        assert_eq!(filters[0].get("size_min"), Some("1024"));
        assert!(Image::server_side_filters(
            &QueryPreset::LessThan(1024),
            ImageProperties::ImageSize
        )
        .is_none());

        let filters = Image::server_side_filters(
            &QueryPreset::AnyIn(vec!["public".into(), "shared".into()]),
            ImageProperties::ImageVisibility,
        )
        .unwrap();
        assert_eq!(filters.len(), 2);
    }
}
