//! Typed data model for person records returned by the search API.
//!
//! # Design
//! Every field kind is a plain serde struct whose attribute keys use the API's
//! `@`-prefixed convention (`@inferred`, `@valid_since`, ...). Field kinds are
//! unified through the `Field` enum and the `FieldKind` trait so callers can
//! walk a person's fields without matching on every container vector.
//!
//! Containers never use `deny_unknown_fields`: new field kinds added on the
//! server side are silently dropped during deserialization.

pub mod containers;
pub mod fields;
pub mod geo;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub use containers::{FieldContainer, Person, Relationship, Source};
pub use fields::{
    Address, AddressType, Dob, Education, Email, EmailType, Ethnicity, Field, FieldKind, FieldMeta,
    Gender, Image, Job, Language, Name, NameType, OriginCountry, Phone, PhoneType,
    RelationshipType, ThumbnailOptions, Url, UserId, Username,
};

/// Generates a string-backed enum that keeps unrecognized wire values in an
/// `Unknown` variant instead of failing deserialization.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Unknown(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Unknown(s) => s,
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.as_str() {
                    $($wire => Self::$variant,)+
                    _ => Self::Unknown(s),
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use string_enum;

/// An inclusive date interval. Exact dates have `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(with = "date_format")]
    pub start: NaiveDate,
    #[serde(with = "date_format")]
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds if they arrive reversed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    pub fn exact(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    /// January 1st of `start_year` through December 31st of `end_year`.
    pub fn from_years_range(start_year: i32, end_year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(start_year, 1, 1)?;
        let end = NaiveDate::from_ymd_opt(end_year, 12, 31)?;
        Some(Self::new(start, end))
    }

    pub fn is_exact(&self) -> bool {
        self.start == self.end
    }

    pub fn middle(&self) -> NaiveDate {
        let half = (self.end - self.start).num_days() / 2;
        self.start + Duration::days(half)
    }

    pub fn years_range(&self) -> (i32, i32) {
        (self.start.year(), self.end.year())
    }
}

/// Serde helpers for `YYYY-MM-DD` dates. Timestamps such as
/// `2012-01-01T00:00:00` are accepted and truncated to their date.
pub(crate) mod date_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let date_part = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, FORMAT).ok()
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }

    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            match raw {
                None => Ok(None),
                Some(s) if s.is_empty() => Ok(None),
                Some(s) => super::parse(&s)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {s}"))),
            }
        }
    }
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

pub(crate) fn alpha_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_alphabetic()).count()
}

pub(crate) fn alnum_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_alphanumeric()).count()
}

/// Non-empty, trimmed view of an optional string.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Uppercase the first letter of every space- or underscore-separated word.
pub(crate) fn title_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_range_swaps_reversed_bounds() {
        let range = DateRange::new(date(2012, 1, 1), date(2000, 1, 1));
        assert_eq!(range.start, date(2000, 1, 1));
        assert_eq!(range.end, date(2012, 1, 1));
    }

    #[test]
    fn date_range_years_and_middle() {
        let range = DateRange::from_years_range(2000, 2012).unwrap();
        assert_eq!(range.years_range(), (2000, 2012));
        assert!(!range.is_exact());
        assert_eq!(range.middle().year(), 2006);
        assert!(DateRange::exact(date(1980, 5, 5)).is_exact());
    }

    #[test]
    fn date_range_accepts_timestamps() {
        let range: DateRange =
            serde_json::from_str(r#"{"start":"2000-01-01T00:00:00","end":"2012-12-31"}"#).unwrap();
        assert_eq!(range.years_range(), (2000, 2012));
        let json = serde_json::to_value(range).unwrap();
        assert_eq!(json["start"], "2000-01-01");
    }

    #[test]
    fn title_case_handles_underscores() {
        assert_eq!(title_case("american_indian"), "American Indian");
        assert_eq!(title_case("male"), "Male");
    }
}
