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

//! Client-side handlers for preset families.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use regex::Regex;

use super::base::QueryProperty;
use super::presets::{PresetFamily, QueryPreset};
use crate::common::PropValue;
use crate::{Error, ErrorKind, Result};

/// A predicate over property values.
pub type Predicate = Arc<dyn Fn(&PropValue) -> bool + Send + Sync>;

/// Turns presets of one family into predicates.
pub trait PresetHandler: Send + Sync {
    /// Family handled by this handler.
    fn family(&self) -> PresetFamily;

    /// Build a predicate for the preset.
    ///
    /// Fails with `InvalidInput` if the preset belongs to another family or
    /// its arguments are invalid.
    fn predicate(&self, preset: &QueryPreset) -> Result<Predicate>;
}

fn make_predicate<F>(f: F) -> Predicate
where
    F: Fn(&PropValue) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

fn wrong_family(handler: PresetFamily, preset: &QueryPreset) -> Error {
    Error::new(
        ErrorKind::InvalidInput,
        format!(
            "Preset {} cannot be handled as {:?}",
            preset.kind(),
            handler
        ),
    )
}

fn contains_loosely(value: &PropValue, expected: &PropValue) -> bool {
    match (value, expected) {
        (PropValue::List(items), expected) if !matches!(expected, PropValue::List(..)) => {
            items.iter().any(|item| item.loosely_eq(expected))
        }
        _ => value.loosely_eq(expected),
    }
}

/// Equality and membership.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericHandler;

impl PresetHandler for GenericHandler {
    fn family(&self) -> PresetFamily {
        PresetFamily::Generic
    }

    fn predicate(&self, preset: &QueryPreset) -> Result<Predicate> {
        Ok(match preset.clone() {
            QueryPreset::EqualTo(expected) => {
                make_predicate(move |value| contains_loosely(value, &expected))
            }
            QueryPreset::NotEqualTo(expected) => {
                make_predicate(move |value| !contains_loosely(value, &expected))
            }
            QueryPreset::AnyIn(expected) => make_predicate(move |value| {
                expected.iter().any(|item| contains_loosely(value, item))
            }),
            QueryPreset::NotAnyIn(expected) => make_predicate(move |value| {
                !expected.iter().any(|item| contains_loosely(value, item))
            }),
            other => return Err(wrong_family(self.family(), &other)),
        })
    }
}

/// Regular expressions over strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringHandler;

fn compile_anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})", pattern)).map_err(|err| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Invalid regular expression {}: {}", pattern, err),
        )
    })
}

fn regex_matches(regex: &Regex, value: &PropValue) -> bool {
    match value {
        PropValue::String(s) => regex.is_match(s),
        PropValue::List(items) => items.iter().any(|item| regex_matches(regex, item)),
        _ => false,
    }
}

impl PresetHandler for StringHandler {
    fn family(&self) -> PresetFamily {
        PresetFamily::String
    }

    fn predicate(&self, preset: &QueryPreset) -> Result<Predicate> {
        Ok(match preset {
            QueryPreset::MatchesRegex(pattern) => {
                let regex = compile_anchored(pattern)?;
                make_predicate(move |value| regex_matches(&regex, value))
            }
            QueryPreset::NotMatchesRegex(pattern) => {
                let regex = compile_anchored(pattern)?;
                make_predicate(move |value| !regex_matches(&regex, value))
            }
            other => return Err(wrong_family(self.family(), other)),
        })
    }
}

/// Age comparisons.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeHandler;

impl PresetHandler for DateTimeHandler {
    fn family(&self) -> PresetFamily {
        PresetFamily::DateTime
    }

    fn predicate(&self, preset: &QueryPreset) -> Result<Predicate> {
        let reference = match preset.time_reference() {
            Some(reference) => reference.resolve(Utc::now())?,
            None => return Err(wrong_family(self.family(), preset)),
        };
        let accepted: &'static [Ordering] = match preset {
            QueryPreset::OlderThan(..) => &[Ordering::Less],
            QueryPreset::OlderThanOrEqualTo(..) => &[Ordering::Less, Ordering::Equal],
            QueryPreset::YoungerThan(..) => &[Ordering::Greater],
            _ => &[Ordering::Greater, Ordering::Equal],
        };
        Ok(make_predicate(move |value| match value.as_datetime() {
            Some(dt) => accepted.contains(&dt.cmp(&reference)),
            None => false,
        }))
    }
}

/// Numeric comparisons.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerHandler;

impl PresetHandler for IntegerHandler {
    fn family(&self) -> PresetFamily {
        PresetFamily::Integer
    }

    fn predicate(&self, preset: &QueryPreset) -> Result<Predicate> {
        let reference = match *preset {
            QueryPreset::GreaterThan(r)
            | QueryPreset::GreaterThanOrEqualTo(r)
            | QueryPreset::LessThan(r)
            | QueryPreset::LessThanOrEqualTo(r) => r,
            ref other => return Err(wrong_family(self.family(), other)),
        };
        let accepted: &'static [Ordering] = match preset {
            QueryPreset::GreaterThan(..) => &[Ordering::Greater],
            QueryPreset::GreaterThanOrEqualTo(..) => &[Ordering::Greater, Ordering::Equal],
            QueryPreset::LessThan(..) => &[Ordering::Less],
            _ => &[Ordering::Less, Ordering::Equal],
        };
        Ok(make_predicate(move |value| match value.as_integer() {
            Some(v) => accepted.contains(&v.cmp(&reference)),
            None => false,
        }))
    }
}

static GENERIC: GenericHandler = GenericHandler;
static STRING: StringHandler = StringHandler;
static DATETIME: DateTimeHandler = DateTimeHandler;
static INTEGER: IntegerHandler = IntegerHandler;

/// Handler for the given preset family.
pub fn handler_for(family: PresetFamily) -> &'static dyn PresetHandler {
    match family {
        PresetFamily::Generic => &GENERIC,
        PresetFamily::String => &STRING,
        PresetFamily::DateTime => &DATETIME,
        PresetFamily::Integer => &INTEGER,
    }
}

/// A condition checked on fetched resources.
#[derive(Clone)]
pub struct ClientSideFilter<P> {
    prop: P,
    preset: QueryPreset,
    predicate: Predicate,
}

impl<P: QueryProperty> ClientSideFilter<P> {
    /// Create a filter for the property.
    pub fn new(prop: P, preset: QueryPreset) -> Result<ClientSideFilter<P>> {
        let predicate = handler_for(preset.kind().family()).predicate(&preset)?;
        Ok(ClientSideFilter {
            prop,
            preset,
            predicate,
        })
    }

    /// Property that is checked.
    #[inline]
    pub fn property(&self) -> P {
        self.prop
    }

    /// Preset that is applied.
    #[inline]
    pub fn preset(&self) -> &QueryPreset {
        &self.preset
    }

    /// Whether a property value passes the filter.
    #[inline]
    pub fn matches_value(&self, value: &PropValue) -> bool {
        (self.predicate)(value)
    }

    /// Whether a resource passes the filter.
    pub fn matches(&self, resource: &P::Resource) -> bool {
        self.matches_value(&self.prop.value_of(resource))
    }
}

impl<P: fmt::Debug> fmt::Debug for ClientSideFilter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSideFilter")
            .field("prop", &self.prop)
            .field("preset", &self.preset)
            .finish()
    }
}
