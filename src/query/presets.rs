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

//! Query presets: filter operators with their arguments.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::common::PropValue;
use crate::{Error, ErrorKind, Result};

/// Family of presets sharing one client-side handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetFamily {
    /// Equality and membership.
    Generic,
    /// Regular expressions.
    String,
    /// Age comparisons.
    DateTime,
    /// Numeric comparisons.
    Integer,
}

macro_rules! preset_kinds {
    ($($variant:ident = $name:literal in $family:ident),+ $(,)?) => (
        /// Kind of a preset (without arguments).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum PresetKind {
            $(
                #[doc = $name]
                $variant,
            )+
        }

        impl PresetKind {
            /// All preset kinds.
            pub const ALL: &'static [PresetKind] = &[$(PresetKind::$variant),+];

            /// Symbolic name, e.g. `EQUAL_TO`.
            pub fn name(self) -> &'static str {
                match self {
                    $(PresetKind::$variant => $name),+
                }
            }

            /// Family of this preset.
            pub fn family(self) -> PresetFamily {
                match self {
                    $(PresetKind::$variant => PresetFamily::$family),+
                }
            }
        }
    );
}

preset_kinds! {
    EqualTo = "EQUAL_TO" in Generic,
    NotEqualTo = "NOT_EQUAL_TO" in Generic,
    AnyIn = "ANY_IN" in Generic,
    NotAnyIn = "NOT_ANY_IN" in Generic,
    MatchesRegex = "MATCHES_REGEX" in String,
    NotMatchesRegex = "NOT_MATCHES_REGEX" in String,
    OlderThan = "OLDER_THAN" in DateTime,
    OlderThanOrEqualTo = "OLDER_THAN_OR_EQUAL_TO" in DateTime,
    YoungerThan = "YOUNGER_THAN" in DateTime,
    YoungerThanOrEqualTo = "YOUNGER_THAN_OR_EQUAL_TO" in DateTime,
    GreaterThan = "GREATER_THAN" in Integer,
    GreaterThanOrEqualTo = "GREATER_THAN_OR_EQUAL_TO" in Integer,
    LessThan = "LESS_THAN" in Integer,
    LessThanOrEqualTo = "LESS_THAN_OR_EQUAL_TO" in Integer,
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PresetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<PresetKind> {
        let s = s.trim();
        PresetKind::ALL
            .iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| Error::new(ErrorKind::InvalidInput, format!("Unknown preset {}", s)))
    }
}

/// A point in time used by datetime presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeReference {
    /// Relative to the moment the condition is added to a query.
    Ago(Duration),
    /// An absolute timestamp.
    At(DateTime<Utc>),
}

fn age_out_of_range() -> Error {
    Error::new(
        ErrorKind::InvalidInput,
        "Relative age is out of the supported time range",
    )
}

impl TimeReference {
    /// A relative reference from its components.
    ///
    /// Fails if the total age does not fit into a time delta.
    pub fn ago(days: i64, hours: i64, minutes: i64, seconds: i64) -> Result<TimeReference> {
        let parts = [
            Duration::try_days(days),
            Duration::try_hours(hours),
            Duration::try_minutes(minutes),
            Duration::try_seconds(seconds),
        ];
        parts
            .into_iter()
            .try_fold(Duration::zero(), |total, part| {
                part.and_then(|part| total.checked_add(&part))
            })
            .map(TimeReference::Ago)
            .ok_or_else(age_out_of_range)
    }

    /// A relative reference in days.
    #[inline]
    pub fn days_ago(days: u32) -> TimeReference {
        TimeReference::Ago(Duration::seconds(i64::from(days) * 86400))
    }

    /// Resolve into an absolute timestamp.
    ///
    /// Fails if the reference lies outside of the representable dates.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        match self {
            TimeReference::Ago(duration) => now
                .checked_sub_signed(*duration)
                .ok_or_else(age_out_of_range),
            TimeReference::At(value) => Ok(*value),
        }
    }
}

/// A filter operator with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPreset {
    /// The value equals the argument.
    EqualTo(PropValue),
    /// The value differs from the argument.
    NotEqualTo(PropValue),
    /// The value equals one of the arguments.
    AnyIn(Vec<PropValue>),
    /// The value equals none of the arguments.
    NotAnyIn(Vec<PropValue>),
    /// The value matches the regular expression (anchored at the start).
    MatchesRegex(String),
    /// The value does not match the regular expression.
    NotMatchesRegex(String),
    /// The value is before the reference time.
    OlderThan(TimeReference),
    /// The value is before or at the reference time.
    OlderThanOrEqualTo(TimeReference),
    /// The value is after the reference time.
    YoungerThan(TimeReference),
    /// The value is after or at the reference time.
    YoungerThanOrEqualTo(TimeReference),
    /// The value is greater than the argument.
    GreaterThan(i64),
    /// The value is greater than or equal to the argument.
    GreaterThanOrEqualTo(i64),
    /// The value is less than the argument.
    LessThan(i64),
    /// The value is less than or equal to the argument.
    LessThanOrEqualTo(i64),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ValueArgs {
    value: Value,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ValuesArgs {
    values: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegexArgs {
    regex_string: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimeArgs {
    #[serde(default)]
    days: Option<f64>,
    #[serde(default)]
    hours: Option<f64>,
    #[serde(default)]
    minutes: Option<f64>,
    #[serde(default)]
    seconds: Option<f64>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IntegerArgs {
    value: i64,
}

fn parse_args<'de, T: Deserialize<'de>>(kind: PresetKind, args: &'de Value) -> Result<T> {
    T::deserialize(args).map_err(|err| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Invalid arguments for preset {}: {}", kind, err),
        )
    })
}

impl TimeArgs {
    fn into_reference(self, kind: PresetKind) -> Result<TimeReference> {
        let relative = [self.days, self.hours, self.minutes, self.seconds];
        match (self.timestamp, relative.iter().any(Option::is_some)) {
            (Some(ts), false) => Ok(TimeReference::At(ts)),
            (None, true) => {
                let total = self.days.unwrap_or(0.0) * 86400.0
                    + self.hours.unwrap_or(0.0) * 3600.0
                    + self.minutes.unwrap_or(0.0) * 60.0
                    + self.seconds.unwrap_or(0.0);
                if total < 0.0 || !total.is_finite() {
                    return Err(Error::new(
                        ErrorKind::InvalidInput,
                        format!("Preset {} requires a non-negative age", kind),
                    ));
                }
                let millis = (total * 1000.0).round();
                if millis >= i64::MAX as f64 {
                    return Err(age_out_of_range());
                }
                Duration::try_milliseconds(millis as i64)
                    .map(TimeReference::Ago)
                    .ok_or_else(age_out_of_range)
            }
            (Some(_), true) => Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "Preset {} accepts either a timestamp or a relative age, not both",
                    kind
                ),
            )),
            (None, false) => Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "Preset {} requires days, hours, minutes, seconds or timestamp",
                    kind
                ),
            )),
        }
    }
}

impl QueryPreset {
    /// Kind of this preset.
    pub fn kind(&self) -> PresetKind {
        match self {
            QueryPreset::EqualTo(..) => PresetKind::EqualTo,
            QueryPreset::NotEqualTo(..) => PresetKind::NotEqualTo,
            QueryPreset::AnyIn(..) => PresetKind::AnyIn,
            QueryPreset::NotAnyIn(..) => PresetKind::NotAnyIn,
            QueryPreset::MatchesRegex(..) => PresetKind::MatchesRegex,
            QueryPreset::NotMatchesRegex(..) => PresetKind::NotMatchesRegex,
            QueryPreset::OlderThan(..) => PresetKind::OlderThan,
            QueryPreset::OlderThanOrEqualTo(..) => PresetKind::OlderThanOrEqualTo,
            QueryPreset::YoungerThan(..) => PresetKind::YoungerThan,
            QueryPreset::YoungerThanOrEqualTo(..) => PresetKind::YoungerThanOrEqualTo,
            QueryPreset::GreaterThan(..) => PresetKind::GreaterThan,
            QueryPreset::GreaterThanOrEqualTo(..) => PresetKind::GreaterThanOrEqualTo,
            QueryPreset::LessThan(..) => PresetKind::LessThan,
            QueryPreset::LessThanOrEqualTo(..) => PresetKind::LessThanOrEqualTo,
        }
    }

    /// Time reference of a datetime preset.
    pub fn time_reference(&self) -> Option<&TimeReference> {
        match self {
            QueryPreset::OlderThan(t)
            | QueryPreset::OlderThanOrEqualTo(t)
            | QueryPreset::YoungerThan(t)
            | QueryPreset::YoungerThanOrEqualTo(t) => Some(t),
            _ => None,
        }
    }

    /// Resolve relative time references against `now`.
    pub fn resolved(self, now: DateTime<Utc>) -> Result<QueryPreset> {
        let resolve = |t: TimeReference| t.resolve(now).map(TimeReference::At);
        Ok(match self {
            QueryPreset::OlderThan(t) => QueryPreset::OlderThan(resolve(t)?),
            QueryPreset::OlderThanOrEqualTo(t) => QueryPreset::OlderThanOrEqualTo(resolve(t)?),
            QueryPreset::YoungerThan(t) => QueryPreset::YoungerThan(resolve(t)?),
            QueryPreset::YoungerThanOrEqualTo(t) => {
                QueryPreset::YoungerThanOrEqualTo(resolve(t)?)
            }
            other => other,
        })
    }

    /// Build a preset from its kind and JSON keyword arguments.
    ///
    /// Accepted arguments depend on the family:
    ///
    /// * generic: `value` (`EQUAL_TO`, `NOT_EQUAL_TO`) or `values`
    ///   (`ANY_IN`, `NOT_ANY_IN`),
    /// * string: `regex_string`,
    /// * datetime: any of `days`, `hours`, `minutes`, `seconds`, or an RFC
    ///   3339 `timestamp`,
    /// * integer: `value`.
    pub fn from_json(kind: PresetKind, args: &Value) -> Result<QueryPreset> {
        Ok(match kind {
            PresetKind::EqualTo => {
                QueryPreset::EqualTo(PropValue::from(&parse_args::<ValueArgs>(kind, args)?.value))
            }
            PresetKind::NotEqualTo => QueryPreset::NotEqualTo(PropValue::from(
                &parse_args::<ValueArgs>(kind, args)?.value,
            )),
            PresetKind::AnyIn => QueryPreset::AnyIn(
                parse_args::<ValuesArgs>(kind, args)?
                    .values
                    .iter()
                    .map(PropValue::from)
                    .collect(),
            ),
            PresetKind::NotAnyIn => QueryPreset::NotAnyIn(
                parse_args::<ValuesArgs>(kind, args)?
                    .values
                    .iter()
                    .map(PropValue::from)
                    .collect(),
            ),
            PresetKind::MatchesRegex => {
                QueryPreset::MatchesRegex(parse_args::<RegexArgs>(kind, args)?.regex_string)
            }
            PresetKind::NotMatchesRegex => {
                QueryPreset::NotMatchesRegex(parse_args::<RegexArgs>(kind, args)?.regex_string)
            }
            PresetKind::OlderThan => {
                QueryPreset::OlderThan(parse_args::<TimeArgs>(kind, args)?.into_reference(kind)?)
            }
            PresetKind::OlderThanOrEqualTo => QueryPreset::OlderThanOrEqualTo(
                parse_args::<TimeArgs>(kind, args)?.into_reference(kind)?,
            ),
            PresetKind::YoungerThan => QueryPreset::YoungerThan(
                parse_args::<TimeArgs>(kind, args)?.into_reference(kind)?,
            ),
            PresetKind::YoungerThanOrEqualTo => QueryPreset::YoungerThanOrEqualTo(
                parse_args::<TimeArgs>(kind, args)?.into_reference(kind)?,
            ),
            PresetKind::GreaterThan => {
                QueryPreset::GreaterThan(parse_args::<IntegerArgs>(kind, args)?.value)
            }
            PresetKind::GreaterThanOrEqualTo => {
                QueryPreset::GreaterThanOrEqualTo(parse_args::<IntegerArgs>(kind, args)?.value)
            }
            PresetKind::LessThan => {
                QueryPreset::LessThan(parse_args::<IntegerArgs>(kind, args)?.value)
            }
            PresetKind::LessThanOrEqualTo => {
                QueryPreset::LessThanOrEqualTo(parse_args::<IntegerArgs>(kind, args)?.value)
            }
        })
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    use super::{PresetFamily, PresetKind, QueryPreset, TimeReference};
    use crate::common::PropValue;
    use crate::ErrorKind;

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            PresetKind::from_str("EQUAL_TO").unwrap(),
            PresetKind::EqualTo
        );
        assert_eq!(
            PresetKind::from_str("older_than_or_equal_to").unwrap(),
            PresetKind::OlderThanOrEqualTo
        );
        assert_eq!(
            PresetKind::from_str("similar_to").unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(PresetKind::MatchesRegex.family(), PresetFamily::String);
        assert_eq!(PresetKind::LessThan.family(), PresetFamily::Integer);
        assert_eq!(PresetKind::ALL.len(), 14);
    }

    #[test]
    fn test_resolved() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let preset = QueryPreset::OlderThan(TimeReference::ago(1, 2, 0, 30).unwrap())
            .resolved(now)
            .unwrap();
        assert_eq!(
            preset,
            QueryPreset::OlderThan(TimeReference::At(
                Utc.with_ymd_and_hms(2024, 5, 9, 9, 59, 30).unwrap()
            ))
        );
        let preset = QueryPreset::EqualTo("x".into()).resolved(now).unwrap();
        assert_eq!(preset, QueryPreset::EqualTo("x".into()));
    }

    #[test]
    fn test_from_json_generic() {
        let preset =
            QueryPreset::from_json(PresetKind::EqualTo, &json!({"value": "ACTIVE"})).unwrap();
        assert_eq!(preset, QueryPreset::EqualTo("ACTIVE".into()));
        let preset =
            QueryPreset::from_json(PresetKind::AnyIn, &json!({"values": ["a", 1, true]}))
                .unwrap();
        assert_eq!(
            preset,
            QueryPreset::AnyIn(vec![
                "a".into(),
                PropValue::Integer(1),
                PropValue::Bool(true)
            ])
        );
        let err = QueryPreset::from_json(PresetKind::AnyIn, &json!({"value": "a"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_from_json_time() {
        let preset =
            QueryPreset::from_json(PresetKind::YoungerThan, &json!({"days": 2, "hours": 1.5}))
                .unwrap();
        assert_eq!(
            preset,
            QueryPreset::YoungerThan(TimeReference::Ago(
                Duration::days(2) + Duration::minutes(90)
            ))
        );
        let preset = QueryPreset::from_json(
            PresetKind::OlderThan,
            &json!({"timestamp": "2024-01-01T00:00:00Z"}),
        )
        .unwrap();
        assert_eq!(
            preset,
            QueryPreset::OlderThan(TimeReference::At(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            ))
        );
        for args in [
            json!({}),
            json!({"days": 1, "timestamp": "2024-01-01T00:00:00Z"}),
            json!({"days": -1}),
            json!({"weeks": 1}),
            json!({"seconds": 1e300}),
        ] {
            let err = QueryPreset::from_json(PresetKind::OlderThan, &args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{}", args);
        }
    }

    #[test]
    fn test_from_json_other() {
        let preset = QueryPreset::from_json(
            PresetKind::NotMatchesRegex,
            &json!({"regex_string": "^test-"}),
        )
        .unwrap();
        assert_eq!(preset, QueryPreset::NotMatchesRegex("^test-".into()));
        let preset =
            QueryPreset::from_json(PresetKind::GreaterThan, &json!({"value": 4})).unwrap();
        assert_eq!(preset, QueryPreset::GreaterThan(4));
        let err = QueryPreset::from_json(PresetKind::GreaterThan, &json!({"value": "four"}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_ago_out_of_range() {
        assert_eq!(
            TimeReference::ago(0, 0, 1, 5).unwrap(),
            TimeReference::Ago(Duration::seconds(65))
        );
        for (days, hours) in [(i64::MAX, 0), (0, i64::MAX), (i64::MAX / 86400, i64::MAX / 3600)] {
            let err = TimeReference::ago(days, hours, 0, 0).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
        let err = TimeReference::ago(i64::MIN, 0, 0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_resolve_out_of_range() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let preset =
            QueryPreset::from_json(PresetKind::OlderThan, &json!({"days": 1e8})).unwrap();
        let err = preset.resolved(now).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let far = TimeReference::ago(1_000_000_000, 0, 0, 0).unwrap();
        assert_eq!(far.resolve(now).unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(
            TimeReference::days_ago(u32::MAX).resolve(now).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            TimeReference::days_ago(2).resolve(now).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 8, 12, 0, 0).unwrap()
        );
    }
}
