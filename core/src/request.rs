//! Search request construction and client-side validation.
//!
//! # Design
//! A `SearchRequest` is one-shot: it is created from named criteria, a
//! pre-built `Person`, or a search pointer returned by an earlier response,
//! then validated and serialized into parameters by `SearchClient`. Criteria
//! are normalized into a `Person` up front so validation has a single shape to
//! inspect.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{Address, Dob, Email, FieldKind, Name, Person, Phone, Url, UserId, Username};
use crate::error::{ApiError, ValidationError};

/// Parameters sent in the form body rather than the URL query.
pub const FORM_PARAMS: &[&str] = &["person", "search_pointer"];

/// Oldest age a search can ask for; also the upper bound when only
/// `from_age` is given.
const MAX_AGE: u32 = 120;

/// Named search attributes, the convenient alternative to building a `Person`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub raw_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<u64>,
    pub country_code: Option<u16>,
    pub raw_phone: Option<String>,
    pub username: Option<String>,
    pub user_id: Option<String>,
    pub url: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub raw_address: Option<String>,
    pub zip_code: Option<String>,
    pub from_age: Option<u32>,
    pub to_age: Option<u32>,
}

impl SearchCriteria {
    pub fn into_person(self) -> Person {
        self.into_person_on(Utc::now().date_naive())
    }

    /// Like `into_person`, with ages resolved relative to `today`.
    pub fn into_person_on(self, today: NaiveDate) -> Person {
        let mut person = Person::new();

        if self.first_name.is_some()
            || self.middle_name.is_some()
            || self.last_name.is_some()
            || self.raw_name.is_some()
        {
            person.add_field(Name {
                first: self.first_name,
                middle: self.middle_name,
                last: self.last_name,
                raw: self.raw_name,
                ..Default::default()
            });
        }
        if let Some(email) = self.email {
            person.add_field(Email::from_address(&email));
        }
        if self.phone.is_some() || self.raw_phone.is_some() {
            person.add_field(Phone {
                country_code: self.country_code,
                number: self.phone,
                raw: self.raw_phone,
                ..Default::default()
            });
        }
        if let Some(content) = self.username {
            person.add_field(Username {
                content: Some(content),
                ..Default::default()
            });
        }
        if let Some(content) = self.user_id {
            person.add_field(UserId {
                content: Some(content),
                ..Default::default()
            });
        }
        if let Some(url) = self.url {
            person.add_field(Url {
                url: Some(url),
                ..Default::default()
            });
        }
        if self.country.is_some()
            || self.state.is_some()
            || self.city.is_some()
            || self.raw_address.is_some()
            || self.zip_code.is_some()
        {
            person.add_field(Address {
                country: self.country,
                state: self.state,
                city: self.city,
                raw: self.raw_address,
                zip_code: self.zip_code,
                ..Default::default()
            });
        }
        if self.from_age.is_some() || self.to_age.is_some() {
            let from = self.from_age.unwrap_or(0).min(MAX_AGE);
            let to = self.to_age.unwrap_or(MAX_AGE).min(MAX_AGE);
            if let Some(dob) = Dob::from_age_range(from, to, today) {
                person.add_field(dob);
            }
        }
        person
    }
}

/// Which sources to include in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowSources {
    /// Only sources belonging to the matched person.
    Matching,
    /// Every source consulted, including other persons'.
    All,
}

impl ShowSources {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShowSources::Matching => "matching",
            ShowSources::All => "all",
        }
    }
}

/// Pass-through options that shape what the server returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub hide_sponsored: bool,
    /// Inferred data below this probability is dropped. `1.0` hides all
    /// inferred data.
    pub minimum_probability: Option<f64>,
    /// Possible persons scoring below this are dropped.
    pub minimum_match: Option<f64>,
    pub show_sources: Option<ShowSources>,
    pub show_unknown_fields: bool,
    pub infer_persons: Option<bool>,
    pub top_match: Option<bool>,
    pub live_feeds: Option<bool>,
    pub match_requirements: Option<String>,
    pub source_category_requirements: Option<String>,
}

impl SearchOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(p) = self.minimum_probability {
            if !(0.0..=1.0).contains(&p) {
                return Err(ValidationError::ProbabilityOutOfRange(p));
            }
        }
        if let Some(m) = self.minimum_match {
            if !(0.0..=1.0).contains(&m) {
                return Err(ValidationError::MatchOutOfRange(m));
            }
        }
        Ok(())
    }

    /// Options as ordered query parameters; unset options are omitted.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if self.show_unknown_fields {
            params.push(("show_unknown_fields", "1".to_string()));
        }
        if self.hide_sponsored {
            params.push(("hide_sponsored", "true".to_string()));
        }
        if let Some(p) = self.minimum_probability {
            params.push(("minimum_probability", p.to_string()));
        }
        if let Some(m) = self.minimum_match {
            params.push(("minimum_match", m.to_string()));
        }
        if let Some(s) = self.show_sources {
            params.push(("show_sources", s.as_str().to_string()));
        }
        if let Some(v) = self.infer_persons {
            params.push(("infer_persons", v.to_string()));
        }
        if let Some(v) = self.top_match {
            params.push(("top_match", v.to_string()));
        }
        if let Some(v) = self.live_feeds {
            params.push(("live_feeds", v.to_string()));
        }
        if let Some(v) = &self.match_requirements {
            params.push(("match_requirements", v.clone()));
        }
        if let Some(v) = &self.source_category_requirements {
            params.push(("source_category_requirements", v.clone()));
        }
        params
    }
}

/// A single search: criteria (or a search pointer) plus options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    /// Overrides the client's and the process-wide default key.
    pub api_key: Option<String>,
    pub person: Person,
    pub search_pointer: Option<String>,
    pub options: SearchOptions,
}

impl SearchRequest {
    pub fn from_criteria(criteria: SearchCriteria) -> Self {
        Self::from_person(criteria.into_person())
    }

    pub fn from_person(person: Person) -> Self {
        Self {
            person,
            ..Default::default()
        }
    }

    /// Follow-up lookup of a candidate from an earlier response.
    pub fn from_search_pointer(search_pointer: &str) -> Self {
        Self {
            search_pointer: Some(search_pointer.to_string()),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    fn pointer(&self) -> Option<&str> {
        self.search_pointer.as_deref().filter(|p| !p.is_empty())
    }

    /// Reject requests that must not reach the network. `api_key` is the key
    /// that will be sent after fallbacks are applied.
    pub fn validate(&self, api_key: Option<&str>, strict: bool) -> Result<(), ValidationError> {
        if api_key.map_or(true, str::is_empty) {
            return Err(ValidationError::MissingApiKey);
        }
        self.options.validate()?;
        if self.pointer().is_some() {
            return Ok(());
        }
        if !self.person.is_searchable() {
            return Err(ValidationError::InsufficientCriteria);
        }
        if strict {
            let weak: Vec<String> = self
                .person
                .unsearchable_fields()
                .iter()
                .map(|f| f.display().unwrap_or_else(|| f.kind_name().to_string()))
                .collect();
            if !weak.is_empty() {
                return Err(ValidationError::UnsearchableFields(weak));
            }
        }
        Ok(())
    }

    /// Parameters carrying the search criteria: the search pointer when
    /// present, otherwise the person as compact JSON.
    pub fn criteria_params(&self) -> Result<Vec<(&'static str, String)>, ApiError> {
        if let Some(pointer) = self.pointer() {
            return Ok(vec![("search_pointer", pointer.to_string())]);
        }
        let person = serde_json::to_string(&self.person)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(vec![("person", person)])
    }

    /// Every parameter in wire order: `key`, then `person` or
    /// `search_pointer`, then the set options. `SearchClient` sends the
    /// `FORM_PARAMS` in the body and the rest in the URL.
    pub fn query_params(&self, api_key: &str) -> Result<Vec<(&'static str, String)>, ApiError> {
        let mut params = vec![("key", api_key.to_string())];
        params.extend(self.criteria_params()?);
        params.extend(self.options.query_params());
        Ok(params)
    }
}

/// `application/x-www-form-urlencoded` serialization of ordered pairs.
pub fn form_encode<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                urlencoding::encode(k.as_ref()),
                urlencoding::encode(v.as_ref())
            )
        })
        .collect::<Vec<String>>()
        .join("&")
}
