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

//! Property values extracted from resources.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// A value of a resource property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// Property is not set.
    Null,
    /// A boolean flag.
    Bool(bool),
    /// An integer (sizes, counts).
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
    /// A point in time.
    DateTime(DateTime<FixedOffset>),
    /// A list of values.
    List(Vec<PropValue>),
}

impl PropValue {
    /// Whether the value is not set.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }

    /// String contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer representation, if the value can be interpreted as one.
    ///
    /// Floats are truncated, strings are parsed.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropValue::Integer(i) => Some(*i),
            PropValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            PropValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Point in time in UTC, if the value can be interpreted as one.
    ///
    /// Strings are parsed as RFC 3339; timestamps without a time zone are
    /// assumed to be in UTC.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            PropValue::DateTime(dt) => Some(dt.with_timezone(&Utc)),
            PropValue::String(s) => parse_datetime(s),
            _ => None,
        }
    }

    /// Compare values, converting between representations when types differ.
    ///
    /// Values of different types are equal when their display forms are.
    pub fn loosely_eq(&self, other: &PropValue) -> bool {
        match (self, other) {
            (PropValue::Null, PropValue::Null) => true,
            (PropValue::Null, _) | (_, PropValue::Null) => false,
            (PropValue::Integer(a), PropValue::Float(b))
            | (PropValue::Float(b), PropValue::Integer(a)) => (*a as f64) == *b,
            (PropValue::DateTime(_), PropValue::String(_))
            | (PropValue::String(_), PropValue::DateTime(_)) => {
                match (self.as_datetime(), other.as_datetime()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            (PropValue::Bool(b), PropValue::String(s)) | (PropValue::String(s), PropValue::Bool(b)) => {
                b.to_string().eq_ignore_ascii_case(s.trim())
            }
            _ if std::mem::discriminant(self) == std::mem::discriminant(other) => self == other,
            _ => self.to_string() == other.to_string(),
        }
    }

    /// Total order used for sorting.
    ///
    /// Unset values come first, then values are ordered by type (booleans,
    /// numbers, dates, strings, lists) and within a type by value.
    pub fn sort_cmp(&self, other: &PropValue) -> Ordering {
        match (self, other) {
            (PropValue::Bool(a), PropValue::Bool(b)) => a.cmp(b),
            (PropValue::Integer(a), PropValue::Integer(b)) => a.cmp(b),
            (PropValue::Integer(_), PropValue::Float(_))
            | (PropValue::Float(_), PropValue::Integer(_))
            | (PropValue::Float(_), PropValue::Float(_)) => self
                .as_f64()
                .partial_cmp(&other.as_f64())
                .unwrap_or(Ordering::Equal),
            (PropValue::DateTime(a), PropValue::DateTime(b)) => a.cmp(b),
            (PropValue::String(a), PropValue::String(b)) => a.cmp(b),
            (PropValue::List(a), PropValue::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let result = x.sort_cmp(y);
                    if result != Ordering::Equal {
                        return result;
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    /// Representation used in query parameters.
    pub fn to_filter_string(&self) -> String {
        match self {
            PropValue::DateTime(dt) => format_timestamp(&dt.with_timezone(&Utc)),
            other => other.to_string(),
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            PropValue::Integer(i) => *i as f64,
            PropValue::Float(f) => *f,
            _ => f64::NAN,
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            PropValue::Null => 0,
            PropValue::Bool(..) => 1,
            PropValue::Integer(..) | PropValue::Float(..) => 2,
            PropValue::DateTime(..) => 3,
            PropValue::String(..) => 4,
            PropValue::List(..) => 5,
        }
    }
}

/// Format a timestamp the way OpenStack APIs accept it.
pub(crate) fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Null => f.write_str("None"),
            PropValue::Bool(b) => write!(f, "{}", b),
            PropValue::Integer(i) => write!(f, "{}", i),
            PropValue::Float(x) => write!(f, "{}", x),
            PropValue::String(s) => f.write_str(s),
            PropValue::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
            PropValue::List(items) => {
                let mut first = true;
                for item in items {
                    if !first {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for PropValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PropValue::Null => serializer.serialize_none(),
            PropValue::Bool(b) => serializer.serialize_bool(*b),
            PropValue::Integer(i) => serializer.serialize_i64(*i),
            PropValue::Float(x) => serializer.serialize_f64(*x),
            PropValue::String(s) => serializer.serialize_str(s),
            PropValue::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            PropValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> PropValue {
        PropValue::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> PropValue {
        PropValue::Integer(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> PropValue {
        PropValue::Integer(value.into())
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> PropValue {
        PropValue::Integer(value.into())
    }
}

impl From<u64> for PropValue {
    fn from(value: u64) -> PropValue {
        PropValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> PropValue {
        PropValue::Float(value)
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> PropValue {
        PropValue::String(value)
    }
}

impl<'a> From<&'a String> for PropValue {
    fn from(value: &'a String) -> PropValue {
        PropValue::String(value.clone())
    }
}

impl<'a> From<&'a str> for PropValue {
    fn from(value: &'a str) -> PropValue {
        PropValue::String(value.to_string())
    }
}

impl From<DateTime<FixedOffset>> for PropValue {
    fn from(value: DateTime<FixedOffset>) -> PropValue {
        PropValue::DateTime(value)
    }
}

impl From<DateTime<Utc>> for PropValue {
    fn from(value: DateTime<Utc>) -> PropValue {
        PropValue::DateTime(value.into())
    }
}

impl From<Vec<String>> for PropValue {
    fn from(value: Vec<String>) -> PropValue {
        PropValue::List(value.into_iter().map(PropValue::String).collect())
    }
}

impl<'a> From<&'a Vec<String>> for PropValue {
    fn from(value: &'a Vec<String>) -> PropValue {
        PropValue::List(value.iter().map(PropValue::from).collect())
    }
}

macro_rules! optional_value {
    ($($type:ty),+) => ($(
        impl From<$type> for PropValue {
            fn from(value: $type) -> PropValue {
                value.map(PropValue::from).unwrap_or(PropValue::Null)
            }
        }
    )+);
}

optional_value!(
    Option<bool>,
    Option<i64>,
    Option<u32>,
    Option<u64>,
    Option<String>,
    Option<DateTime<FixedOffset>>
);

impl<'a> From<Option<&'a String>> for PropValue {
    fn from(value: Option<&'a String>) -> PropValue {
        value.map(PropValue::from).unwrap_or(PropValue::Null)
    }
}

impl<'a> From<&'a Option<String>> for PropValue {
    fn from(value: &'a Option<String>) -> PropValue {
        PropValue::from(value.as_ref())
    }
}

impl<'a> From<&'a serde_json::Value> for PropValue {
    fn from(value: &'a serde_json::Value) -> PropValue {
        use serde_json::Value;

        match value {
            Value::Null => PropValue::Null,
            Value::Bool(b) => PropValue::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(PropValue::Integer)
                .or_else(|| n.as_f64().map(PropValue::Float))
                .unwrap_or(PropValue::Null),
            Value::String(s) => PropValue::String(s.clone()),
            Value::Array(items) => PropValue::List(items.iter().map(PropValue::from).collect()),
            Value::Object(..) => PropValue::String(value.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use chrono::{DateTime, TimeZone, Utc};

    use super::PropValue;

    #[test]
    fn test_display() {
        assert_eq!(PropValue::Null.to_string(), "None");
        assert_eq!(PropValue::from("abc").to_string(), "abc");
        assert_eq!(PropValue::from(42u64).to_string(), "42");
        assert_eq!(PropValue::from(true).to_string(), "true");
        assert_eq!(
            PropValue::from(vec!["a".to_string(), "b".to_string()]).to_string(),
            "a, b"
        );
    }

    #[test]
    fn test_from_option() {
        let value: Option<String> = None;
        assert!(PropValue::from(&value).is_null());
        let value = Some("x".to_string());
        assert_eq!(PropValue::from(&value), PropValue::String("x".into()));
        assert_eq!(PropValue::from(Some(3u32)), PropValue::Integer(3));
        assert_eq!(PropValue::from(value.as_ref()), PropValue::String("x".into()));
        assert!(PropValue::from(None::<u64>).is_null());
        assert_eq!(PropValue::from(Some(-1i64)), PropValue::Integer(-1));
        assert_eq!(PropValue::from(Some(false)), PropValue::Bool(false));
        let values: Vec<PropValue> = [Some(1u64), None].into_iter().map(PropValue::from).collect();
        assert_eq!(values, vec![PropValue::Integer(1), PropValue::Null]);
    }

    #[test]
    fn test_loosely_eq() {
        assert!(PropValue::from(1i64).loosely_eq(&PropValue::from(1.0)));
        assert!(PropValue::from(1i64).loosely_eq(&PropValue::from("1")));
        assert!(PropValue::from(true).loosely_eq(&PropValue::from("True")));
        assert!(!PropValue::from("a").loosely_eq(&PropValue::from("b")));
        assert!(!PropValue::Null.loosely_eq(&PropValue::from("None")));
        assert!(PropValue::Null.loosely_eq(&PropValue::Null));

        let dt = DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z").unwrap();
        assert!(PropValue::from(dt).loosely_eq(&PropValue::from("2024-01-01T10:00:00+00:00")));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(PropValue::from("12").as_integer(), Some(12));
        assert_eq!(PropValue::from(12.7).as_integer(), Some(12));
        assert_eq!(PropValue::from("abc").as_integer(), None);
        assert_eq!(
            PropValue::from("2024-01-01T10:00:00").as_datetime(),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
        );
        assert_eq!(
            PropValue::from("2024-01-01T12:00:00+02:00").as_datetime(),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_sort_cmp() {
        assert_eq!(PropValue::Null.sort_cmp(&PropValue::from("a")), Ordering::Less);
        assert_eq!(PropValue::from(2i64).sort_cmp(&PropValue::from(10i64)), Ordering::Less);
        assert_eq!(PropValue::from(2.5).sort_cmp(&PropValue::from(2i64)), Ordering::Greater);
        assert_eq!(PropValue::from("b").sort_cmp(&PropValue::from("a")), Ordering::Greater);
        assert_eq!(PropValue::from(5i64).sort_cmp(&PropValue::from("a")), Ordering::Less);
    }

    #[test]
    fn test_filter_string() {
        let dt = DateTime::parse_from_rfc3339("2024-01-01T12:00:00+02:00").unwrap();
        assert_eq!(PropValue::from(dt).to_filter_string(), "2024-01-01T10:00:00Z");
        assert_eq!(PropValue::from(false).to_filter_string(), "false");
    }

    #[test]
    fn test_serialize() {
        let value = PropValue::List(vec![PropValue::Null, PropValue::from(1i64), PropValue::from("x")]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"[null,1,"x"]"#);
    }
}
