// Copyright 2018 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Common protocol bits.

#![allow(missing_docs)]

use serde::de::{DeserializeOwned, Error as DeserError};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A reference to another resource.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Ref {
    pub id: String,
}

/// Deserialize a value that is sometimes reported as an empty string.
pub fn empty_as_default<'de, D, T>(des: D) -> ::std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(des)? {
        Value::Null => Ok(T::default()),
        Value::String(ref s) if s.is_empty() => Ok(T::default()),
        other => serde_json::from_value(other).map_err(DeserError::custom),
    }
}

/// Deserialize an ID that can be either an integer or a string.
pub fn deser_id<'de, D>(des: D) -> ::std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(des)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(DeserError::custom(format!(
            "expected a string or an integer ID, got {}",
            other
        ))),
    }
}
