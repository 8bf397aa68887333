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

//! Various utilities.

/// Expose a field of the inner protocol structure as a getter.
macro_rules! transparent_property {
    ($(#[$attr:meta])* $name:ident: ref $type:ty) => (
        $(#[$attr])*
        #[inline]
        pub fn $name(&self) -> &$type {
            &self.inner.$name
        }
    );

    ($(#[$attr:meta])* $name:ident: $type:ty) => (
        $(#[$attr])*
        #[inline]
        pub fn $name(&self) -> $type {
            self.inner.$name
        }
    );
}

/// Define an enum of queryable properties of a resource.
///
/// Each variant gets a canonical name, optional aliases (both matched
/// case-insensitively when parsing) and an accessor expression producing
/// anything convertible into a `PropValue`.
macro_rules! query_properties {
    (
        $(#[$attr:meta])*
        enum $name:ident for $resource:ty {
            $(
                $(#[$vattr:meta])*
                $variant:ident = $canonical:literal $([$($alias:literal),*])? => |$res:ident| $getter:expr
            ),+ $(,)?
        }
    ) => (
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $(
                $(#[$vattr])*
                $variant,
            )+
        }

        impl $crate::query::QueryProperty for $name {
            type Resource = $resource;

            fn all() -> &'static [$name] {
                &[$($name::$variant),+]
            }

            fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $canonical),+
                }
            }

            fn aliases(&self) -> &'static [&'static str] {
                match self {
                    $($name::$variant => &[$($($alias),*)?]),+
                }
            }

            fn value_of(&self, resource: &$resource) -> $crate::common::PropValue {
                match self {
                    $($name::$variant => {
                        let $res = resource;
                        $crate::common::PropValue::from($getter)
                    }),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::query::QueryProperty::name(self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(s: &str) -> $crate::Result<$name> {
                $crate::query::parse_property(s)
            }
        }
    );
}

/// Default for flags that are only reported when false.
pub fn some_truth() -> bool {
    true
}
