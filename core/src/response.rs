//! Parsed search responses.
//!
//! # Design
//! `SearchResponse` is deserialized straight from the response body. Every
//! section is optional or defaults to empty, so partial and future responses
//! still parse. Quota information travels in HTTP headers rather than the
//! body and is attached by `SearchClient::parse_search`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::data::{
    Address, Dob, Education, Email, Gender, Image, Job, Name, Person, Phone, Relationship, Source,
    Url, UserId, Username,
};
use crate::http::HttpResponse;

/// Per-key rate and quota counters reported in response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quota {
    pub qps_allotted: Option<u32>,
    pub qps_current: Option<u32>,
    pub quota_allotted: Option<u32>,
    pub quota_current: Option<u32>,
    /// Raw timestamp of the next quota reset, as sent.
    pub quota_reset: Option<String>,
}

impl Quota {
    pub fn from_headers(response: &HttpResponse) -> Self {
        let number = |name: &str| response.header(name).and_then(|v| v.trim().parse().ok());
        Self {
            qps_allotted: number("x-apikey-qps-allotted"),
            qps_current: number("x-apikey-qps-current"),
            quota_allotted: number("x-apikey-quota-allotted"),
            quota_current: number("x-apikey-quota-current"),
            quota_reset: response.header("x-quota-reset").map(str::to_string),
        }
    }

    /// Remaining calls in the current quota period, when both counters are known.
    pub fn remaining(&self) -> Option<u32> {
        Some(self.quota_allotted?.saturating_sub(self.quota_current?))
    }
}

/// Counts of data the server holds for this query, per field kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailableData {
    pub basic: BTreeMap<String, u32>,
    pub premium: BTreeMap<String, u32>,
}

impl AvailableData {
    /// Total available across basic and premium for one kind, e.g. `"emails"`.
    pub fn count(&self, kind: &str) -> u32 {
        self.basic.get(kind).copied().unwrap_or(0) + self.premium.get(kind).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    #[serde(rename = "@http_status_code")]
    pub http_status_code: u16,
    #[serde(rename = "@visible_sources", skip_serializing_if = "Option::is_none")]
    pub visible_sources: Option<u32>,
    #[serde(rename = "@available_sources", skip_serializing_if = "Option::is_none")]
    pub available_sources: Option<u32>,
    #[serde(rename = "@persons_count", skip_serializing_if = "Option::is_none")]
    pub persons_count: Option<u32>,
    #[serde(
        rename = "@search_id",
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub search_id: Option<String>,
    /// The query as the server understood it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Person>,
    /// The single confident match, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub possible_persons: Vec<Person>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_data: Option<AvailableData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_category_requirements: Option<String>,
    #[serde(skip)]
    pub quota: Quota,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

macro_rules! person_shortcut {
    ($(#[$doc:meta])* $name:ident, $field:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $name(&self) -> Option<&$ty> {
            self.person.as_ref().and_then(|p| p.$field.first())
        }
    };
}

impl SearchResponse {
    /// Sources that belong to the matched person.
    pub fn matching_sources(&self) -> Vec<&Source> {
        let Some(person_id) = self.person.as_ref().and_then(|p| p.person_id.as_deref()) else {
            return Vec::new();
        };
        self.sources
            .iter()
            .filter(|s| s.person_id.as_deref() == Some(person_id))
            .collect()
    }

    /// Sources keyed by domain. Sources without a domain are keyed by `""`.
    pub fn group_sources_by_domain(&self) -> BTreeMap<String, Vec<&Source>> {
        group_by(&self.sources, |s| s.domain.clone().unwrap_or_default())
    }

    pub fn group_sources_by_category(&self) -> BTreeMap<String, Vec<&Source>> {
        group_by(&self.sources, |s| s.category.clone().unwrap_or_default())
    }

    /// Sources grouped by match score, highest first. Sources without a
    /// score are grouped last.
    pub fn group_sources_by_match(&self) -> Vec<(Option<f64>, Vec<&Source>)> {
        let mut groups: Vec<(Option<f64>, Vec<&Source>)> = Vec::new();
        for source in &self.sources {
            match groups.iter_mut().find(|(score, _)| *score == source.match_score) {
                Some((_, members)) => members.push(source),
                None => groups.push((source.match_score, vec![source])),
            }
        }
        groups.sort_by(|(a, _), (b, _)| {
            let a = a.unwrap_or(f64::NEG_INFINITY);
            let b = b.unwrap_or(f64::NEG_INFINITY);
            b.total_cmp(&a)
        });
        groups
    }

    person_shortcut!(name, names, Name);
    person_shortcut!(address, addresses, Address);
    person_shortcut!(phone, phones, Phone);
    person_shortcut!(email, emails, Email);
    person_shortcut!(job, jobs, Job);
    person_shortcut!(education, educations, Education);
    person_shortcut!(image, images, Image);
    person_shortcut!(username, usernames, Username);
    person_shortcut!(user_id, user_ids, UserId);
    person_shortcut!(url, urls, Url);
    person_shortcut!(relationship, relationships, Relationship);

    pub fn dob(&self) -> Option<&Dob> {
        self.person.as_ref().and_then(|p| p.dob.as_ref())
    }

    pub fn gender(&self) -> Option<&Gender> {
        self.person.as_ref().and_then(|p| p.gender.as_ref())
    }
}

fn group_by<F>(sources: &[Source], key: F) -> BTreeMap<String, Vec<&Source>>
where
    F: Fn(&Source) -> String,
{
    let mut groups: BTreeMap<String, Vec<&Source>> = BTreeMap::new();
    for source in sources {
        groups.entry(key(source)).or_default().push(source);
    }
    groups
}
