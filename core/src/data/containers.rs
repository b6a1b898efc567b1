//! Containers that group fields: persons, sources and relationships.
//!
//! # Design
//! `FieldContainer` keeps one ordered vector per field kind, exactly as the
//! server sent them. Nothing is de-duplicated or re-sorted. `Person`, `Source`
//! and `Relationship` flatten a container next to their own `@` attributes and
//! deref to it, so `person.names[0]` reads the same way the JSON does.

use std::ops::{Deref, DerefMut};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fields::{
    Address, Dob, Education, Email, Ethnicity, Field, FieldKind, FieldMeta, Gender, Image, Job,
    Language, Name, OriginCountry, Phone, RelationshipType, Url, UserId, Username,
};
use super::{date_format, is_false};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldContainer {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<Name>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<Phone>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<Email>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<Job>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub educations: Vec<Education>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub usernames: Vec<Username>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_ids: Vec<UserId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<Url>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<Language>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub origin_countries: Vec<OriginCountry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ethnicities: Vec<Ethnicity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<Dob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl FieldContainer {
    /// Append a field to the vector for its kind. `Dob` and `Gender` are
    /// single-valued and replace any previous value.
    pub fn add_field(&mut self, field: impl Into<Field>) {
        match field.into() {
            Field::Name(f) => self.names.push(f),
            Field::Address(f) => self.addresses.push(f),
            Field::Phone(f) => self.phones.push(f),
            Field::Email(f) => self.emails.push(f),
            Field::Job(f) => self.jobs.push(f),
            Field::Education(f) => self.educations.push(f),
            Field::Image(f) => self.images.push(f),
            Field::Username(f) => self.usernames.push(f),
            Field::UserId(f) => self.user_ids.push(f),
            Field::Url(f) => self.urls.push(f),
            Field::Relationship(f) => self.relationships.push(f),
            Field::Language(f) => self.languages.push(f),
            Field::OriginCountry(f) => self.origin_countries.push(f),
            Field::Ethnicity(f) => self.ethnicities.push(f),
            Field::Dob(f) => self.dob = Some(f),
            Field::Gender(f) => self.gender = Some(f),
        }
    }

    pub fn add_fields<I, F>(&mut self, fields: I)
    where
        I: IntoIterator<Item = F>,
        F: Into<Field>,
    {
        for field in fields {
            self.add_field(field);
        }
    }

    /// Every field, grouped by kind in container order.
    pub fn all_fields(&self) -> Vec<Field> {
        let mut out: Vec<Field> = Vec::new();
        out.extend(self.names.iter().cloned().map(Field::Name));
        out.extend(self.addresses.iter().cloned().map(Field::Address));
        out.extend(self.phones.iter().cloned().map(Field::Phone));
        out.extend(self.emails.iter().cloned().map(Field::Email));
        out.extend(self.jobs.iter().cloned().map(Field::Job));
        out.extend(self.educations.iter().cloned().map(Field::Education));
        out.extend(self.images.iter().cloned().map(Field::Image));
        out.extend(self.usernames.iter().cloned().map(Field::Username));
        out.extend(self.user_ids.iter().cloned().map(Field::UserId));
        out.extend(self.urls.iter().cloned().map(Field::Url));
        out.extend(self.relationships.iter().cloned().map(Field::Relationship));
        out.extend(self.languages.iter().cloned().map(Field::Language));
        out.extend(self.origin_countries.iter().cloned().map(Field::OriginCountry));
        out.extend(self.ethnicities.iter().cloned().map(Field::Ethnicity));
        out.extend(self.dob.iter().cloned().map(Field::Dob));
        out.extend(self.gender.iter().cloned().map(Field::Gender));
        out
    }

    pub fn is_empty(&self) -> bool {
        self.all_fields().is_empty()
    }

    /// Fields that take part in searching (names, emails, phones, usernames,
    /// user ids, urls and addresses).
    fn search_fields(&self) -> Vec<Field> {
        self.all_fields()
            .into_iter()
            .filter(|f| {
                matches!(
                    f,
                    Field::Name(_)
                        | Field::Email(_)
                        | Field::Phone(_)
                        | Field::Username(_)
                        | Field::UserId(_)
                        | Field::Url(_)
                        | Field::Address(_)
                )
            })
            .collect()
    }
}

/// A person record: the best match, a possible match, or a search query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(rename = "@match", default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    #[serde(rename = "@search_pointer", default, skip_serializing_if = "Option::is_none")]
    pub search_pointer: Option<String>,
    #[serde(rename = "@inferred", default, skip_serializing_if = "is_false")]
    pub inferred: bool,
    #[serde(flatten)]
    pub fields: FieldContainer,
}

impl Person {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields<I, F>(fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Field>,
    {
        let mut person = Self::new();
        person.fields.add_fields(fields);
        person
    }

    /// A person is searchable when it carries a search pointer, a searchable
    /// name/email/phone/username/user id/url, or an address specific enough
    /// to stand on its own.
    pub fn is_searchable(&self) -> bool {
        if self.search_pointer.as_deref().is_some_and(|p| !p.is_empty()) {
            return true;
        }
        self.fields.search_fields().iter().any(|field| match field {
            Field::Address(address) => address.is_sole_searchable(),
            other => other.is_searchable(),
        })
    }

    /// Search fields that are too weak to be used by the server.
    pub fn unsearchable_fields(&self) -> Vec<Field> {
        self.fields
            .search_fields()
            .into_iter()
            .filter(|f| !f.is_searchable())
            .collect()
    }
}

impl Deref for Person {
    type Target = FieldContainer;

    fn deref(&self) -> &FieldContainer {
        &self.fields
    }
}

impl DerefMut for Person {
    fn deref_mut(&mut self) -> &mut FieldContainer {
        &mut self.fields
    }
}

/// Another person related to the record, itself a small field container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<RelationshipType>,
    #[serde(rename = "@subtype", default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(flatten)]
    pub fields: FieldContainer,
}

impl FieldKind for Relationship {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        self.fields.names.first().and_then(|name| name.display())
    }
}

impl Deref for Relationship {
    type Target = FieldContainer;

    fn deref(&self) -> &FieldContainer {
        &self.fields
    }
}

/// A single data source the server consulted, with the fields it yielded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(rename = "@person_id", default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(rename = "@category", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "@origin_url", default, skip_serializing_if = "Option::is_none")]
    pub origin_url: Option<String>,
    #[serde(rename = "@sponsored", default, skip_serializing_if = "is_false")]
    pub sponsored: bool,
    #[serde(rename = "@premium", default, skip_serializing_if = "is_false")]
    pub premium: bool,
    #[serde(rename = "@match", default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    #[serde(
        rename = "@valid_since",
        default,
        with = "date_format::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub valid_since: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(flatten)]
    pub fields: FieldContainer,
}

impl Deref for Source {
    type Target = FieldContainer;

    fn deref(&self) -> &FieldContainer {
        &self.fields
    }
}
