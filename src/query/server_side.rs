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

//! Building blocks for server-side filter mappings.
//!
//! Each function returns `None` when the preset cannot be expressed with the
//! given query parameter.

use super::presets::{QueryPreset, TimeReference};
use crate::common::{PropValue, ServerSideFilters};

fn scalar(value: &PropValue) -> Option<String> {
    match value {
        PropValue::Null | PropValue::List(..) => None,
        other => Some(other.to_filter_string()),
    }
}

fn bool_value(value: &PropValue) -> Option<bool> {
    match value {
        PropValue::Bool(b) => Some(*b),
        PropValue::String(s) if s.trim().eq_ignore_ascii_case("true") => Some(true),
        PropValue::String(s) if s.trim().eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// `EqualTo` maps to `key=value`, `AnyIn` to one `key=value` per value.
pub fn equal_or_any_in(preset: &QueryPreset, key: &str) -> Option<Vec<ServerSideFilters>> {
    let values = match preset {
        QueryPreset::EqualTo(value) => vec![scalar(value)?],
        QueryPreset::AnyIn(values) => values.iter().map(scalar).collect::<Option<Vec<_>>>()?,
        _ => return None,
    };
    Some(
        values
            .into_iter()
            .map(|value| ServerSideFilters::single(key, value))
            .collect(),
    )
}

/// `EqualTo` maps to `key=value`.
pub fn equal_to(preset: &QueryPreset, key: &str) -> Option<Vec<ServerSideFilters>> {
    match preset {
        QueryPreset::EqualTo(value) => Some(vec![ServerSideFilters::single(key, scalar(value)?)]),
        _ => None,
    }
}

/// `EqualTo` on a boolean maps to `key=true` or `key=false`.
pub fn bool_equal_to(preset: &QueryPreset, key: &str) -> Option<Vec<ServerSideFilters>> {
    match preset {
        QueryPreset::EqualTo(value) => Some(vec![ServerSideFilters::single(
            key,
            bool_value(value)?.to_string(),
        )]),
        _ => None,
    }
}

/// `EqualTo` on a string maps to an exact regular expression `^value$`.
pub fn exact_regex(preset: &QueryPreset, key: &str) -> Option<Vec<ServerSideFilters>> {
    match preset {
        QueryPreset::EqualTo(PropValue::String(value)) => Some(vec![ServerSideFilters::single(
            key,
            format!("^{}$", regex::escape(value)),
        )]),
        _ => None,
    }
}

fn timestamp(reference: &TimeReference) -> Option<String> {
    match reference {
        TimeReference::At(value) => Some(crate::common::format_timestamp(value)),
        TimeReference::Ago(..) => None,
    }
}

/// `YoungerThanOrEqualTo` maps to `key=timestamp` (a "changed since" filter).
pub fn changed_since(preset: &QueryPreset, key: &str) -> Option<Vec<ServerSideFilters>> {
    match preset {
        QueryPreset::YoungerThanOrEqualTo(reference) => {
            Some(vec![ServerSideFilters::single(key, timestamp(reference)?)])
        }
        _ => None,
    }
}

/// Datetime presets map to `key=op:timestamp` with `lt`, `lte`, `gt`, `gte`.
pub fn time_comparison(preset: &QueryPreset, key: &str) -> Option<Vec<ServerSideFilters>> {
    let (op, reference) = match preset {
        QueryPreset::OlderThan(reference) => ("lt", reference),
        QueryPreset::OlderThanOrEqualTo(reference) => ("lte", reference),
        QueryPreset::YoungerThan(reference) => ("gt", reference),
        QueryPreset::YoungerThanOrEqualTo(reference) => ("gte", reference),
        _ => return None,
    };
    Some(vec![ServerSideFilters::single(
        key,
        format!("{}:{}", op, timestamp(reference)?),
    )])
}

/// `GreaterThanOrEqualTo` maps to `key=value`.
pub fn at_least(preset: &QueryPreset, key: &str) -> Option<Vec<ServerSideFilters>> {
    match preset {
        QueryPreset::GreaterThanOrEqualTo(value) => {
            Some(vec![ServerSideFilters::single(key, value.to_string())])
        }
        _ => None,
    }
}

/// `LessThanOrEqualTo` maps to `key=value`.
pub fn at_most(preset: &QueryPreset, key: &str) -> Option<Vec<ServerSideFilters>> {
    match preset {
        QueryPreset::LessThanOrEqualTo(value) => {
            Some(vec![ServerSideFilters::single(key, value.to_string())])
        }
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::common::PropValue;

    fn render(filters: Option<Vec<ServerSideFilters>>) -> Option<Vec<String>> {
        filters.map(|sets| sets.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_equal_or_any_in() {
        assert_eq!(
            render(equal_or_any_in(&QueryPreset::EqualTo("ACTIVE".into()), "status")),
            Some(vec!["status=ACTIVE".to_string()])
        );
        assert_eq!(
            render(equal_or_any_in(
                &QueryPreset::AnyIn(vec!["a".into(), "b".into()]),
                "uuid"
            )),
            Some(vec!["uuid=a".to_string(), "uuid=b".to_string()])
        );
        assert_eq!(
            equal_or_any_in(&QueryPreset::EqualTo(PropValue::Null), "status"),
            None
        );
        assert_eq!(
            equal_or_any_in(&QueryPreset::NotEqualTo("x".into()), "status"),
            None
        );
    }

    #[test]
    fn test_exact_regex() {
        assert_eq!(
            render(exact_regex(&QueryPreset::EqualTo("vm.1".into()), "name")),
            Some(vec![r"name=^vm\.1$".to_string()])
        );
        assert_eq!(
            exact_regex(&QueryPreset::EqualTo(PropValue::Integer(1)), "name"),
            None
        );
    }

    #[test]
    fn test_bool_equal_to() {
        assert_eq!(
            render(bool_equal_to(&QueryPreset::EqualTo(true.into()), "enabled")),
            Some(vec!["enabled=true".to_string()])
        );
        assert_eq!(
            render(bool_equal_to(&QueryPreset::EqualTo("False".into()), "enabled")),
            Some(vec!["enabled=false".to_string()])
        );
        assert_eq!(
            bool_equal_to(&QueryPreset::EqualTo("maybe".into()), "enabled"),
            None
        );
    }

    #[test]
    fn test_times() {
        let at = TimeReference::At(Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap());
        assert_eq!(
            render(time_comparison(&QueryPreset::OlderThan(at), "created_at")),
            Some(vec!["created_at=lt:2024-02-03T04:05:06Z".to_string()])
        );
        assert_eq!(
            render(changed_since(
                &QueryPreset::YoungerThanOrEqualTo(at),
                "changes-since"
            )),
            Some(vec!["changes-since=2024-02-03T04:05:06Z".to_string()])
        );
        assert_eq!(
            changed_since(&QueryPreset::YoungerThan(at), "changes-since"),
            None
        );
        assert_eq!(
            time_comparison(
                &QueryPreset::OlderThan(TimeReference::days_ago(1)),
                "created_at"
            ),
            None
        );
    }

    #[test]
    fn test_integers() {
        assert_eq!(
            render(at_least(&QueryPreset::GreaterThanOrEqualTo(512), "minRam")),
            Some(vec!["minRam=512".to_string()])
        );
        assert_eq!(at_least(&QueryPreset::GreaterThan(512), "minRam"), None);
        assert_eq!(
            render(at_most(&QueryPreset::LessThanOrEqualTo(10), "size_max")),
            Some(vec!["size_max=10".to_string()])
        );
    }
}
