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

//! User queries via Identity API.

use async_trait::async_trait;
use osauth::Session;

use super::{api, protocol};
use crate::common::{ResourceId, ServerSideFilters};
use crate::query::server_side::{bool_equal_to, equal_to};
use crate::query::{
    ChainLink, PresetKind, ProjectScoping, PropSupport, QueryPreset, QueryResource, QueryType,
};
use crate::Result;

/// An Identity user.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct User {
    inner: protocol::User,
}

query_properties! {
    /// Queryable properties of a user.
    enum UserProperties for User {
        /// User description.
        UserDescription = "user_description" ["description"] => |u| u.description(),
        /// ID of the user's domain.
        UserDomainId = "user_domain_id" ["domain_id", "domain"] => |u| u.domain_id(),
        /// E-mail address.
        UserEmail = "user_email" ["email", "email_address"] => |u| u.email(),
        /// Whether the user is enabled.
        UserEnabled = "user_enabled" ["enabled"] => |u| u.enabled(),
        /// Unique ID.
        UserId = "user_id" ["id", "uuid"] => |u| u.id(),
        /// User name.
        UserName = "user_name" ["name", "username"] => |u| u.name(),
    }
}

const STRING_PROPERTIES: &[UserProperties] = &[
    UserProperties::UserDescription,
    UserProperties::UserEmail,
    UserProperties::UserName,
];

impl User {
    transparent_property! {
        #[doc = "User description."]
        description: ref Option<String>
    }

    transparent_property! {
        #[doc = "ID of the user's domain."]
        domain_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "E-mail address (if set)."]
        email: ref Option<String>
    }

    transparent_property! {
        #[doc = "Whether the user is enabled."]
        enabled: bool
    }

    transparent_property! {
        #[doc = "User unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "User name."]
        name: ref String
    }
}

impl ResourceId for User {
    fn resource_id(&self) -> String {
        self.id().clone()
    }
}

#[async_trait]
impl QueryResource for User {
    type Property = UserProperties;

    const QUERY_TYPE: QueryType = QueryType::User;

    const CAN_PAGINATE: bool = false;

    const SCOPING: ProjectScoping = ProjectScoping::Global;

    const SUPPORTED_PRESETS: &'static [(PresetKind, PropSupport<UserProperties>)] = &[
        (PresetKind::EqualTo, PropSupport::All),
        (PresetKind::NotEqualTo, PropSupport::All),
        (PresetKind::AnyIn, PropSupport::All),
        (PresetKind::NotAnyIn, PropSupport::All),
        (PresetKind::MatchesRegex, PropSupport::Only(STRING_PROPERTIES)),
        (PresetKind::NotMatchesRegex, PropSupport::Only(STRING_PROPERTIES)),
    ];

    const CHAIN_LINKS: &'static [ChainLink<UserProperties>] = &[ChainLink {
        from: UserProperties::UserId,
        to: QueryType::Server,
        to_property: "user_id",
    }];

    fn server_side_filters(
        preset: &QueryPreset,
        prop: UserProperties,
    ) -> Option<Vec<ServerSideFilters>> {
        match prop {
            UserProperties::UserName => equal_to(preset, "name"),
            UserProperties::UserDomainId => equal_to(preset, "domain_id"),
            UserProperties::UserEnabled => bool_equal_to(preset, "enabled"),
            _ => None,
        }
    }

    async fn list(session: &Session, query: &[(String, String)]) -> Result<Vec<User>> {
        Ok(api::list_users(session, &query)
            .await?
            .into_iter()
            .map(|inner| User { inner })
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::{User, UserProperties};
    use crate::common::PropValue;
    use crate::query::{QueryPreset, QueryProperty, QueryResource};

    #[test]
    fn test_user_from_json() {
        let user: User = serde_json::from_str(
            r#"{
                "domain_id": "default",
                "enabled": true,
                "id": "2844b2a08be147a08ef58317d6471f1f",
                "links": {"self": "http://example.com/identity/v3/users/2844b2a08be147a08ef58317d6471f1f"},
                "name": "glance",
                "password_expires_at": null,
                "email": "glance@example.com"
            }"#,
        )
        .unwrap();
        assert_eq!(user.name(), "glance");
        assert_eq!(
            UserProperties::UserEmail.value_of(&user),
            PropValue::from("glance@example.com")
        );
        assert!(UserProperties::UserDescription.value_of(&user).is_null());
        assert_eq!(
            UserProperties::UserEnabled.value_of(&user),
            PropValue::Bool(true)
        );
    }

    #[test]
    fn test_server_side_filters() {
        let filters =
            User::server_side_filters(&QueryPreset::EqualTo("glance".into()), UserProperties::UserName)
                .unwrap();
        assert_eq!(filters[0].get("name"), Some("glance"));
        assert!(User::server_side_filters(
            &QueryPreset::AnyIn(vec!["a".into(), "b".into()]),
            UserProperties::UserName
        )
        .is_none());
    }
}
