//! Field kinds that make up a person record.
//!
//! Each struct mirrors one entry of a container list on the wire. The common
//! `@inferred` / `@valid_since` / `@last_seen` / `@current` attributes live in
//! `FieldMeta`, flattened into every kind.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::containers::Relationship;
use super::{alnum_count, alpha_count, date_format, geo, is_false, non_empty, string_enum, title_case, DateRange};

/// Attributes shared by every field kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMeta {
    #[serde(rename = "@inferred", skip_serializing_if = "is_false")]
    pub inferred: bool,
    #[serde(
        rename = "@valid_since",
        with = "date_format::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub valid_since: Option<NaiveDate>,
    #[serde(
        rename = "@last_seen",
        with = "date_format::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_seen: Option<NaiveDate>,
    #[serde(rename = "@current", skip_serializing_if = "Option::is_none")]
    pub current: Option<bool>,
}

/// Behavior common to all field kinds.
pub trait FieldKind {
    fn meta(&self) -> &FieldMeta;

    /// Human-readable rendering. Server-supplied display strings win over
    /// ones computed from sub-parts.
    fn display(&self) -> Option<String>;

    /// Whether this field alone is strong enough to search by.
    fn is_searchable(&self) -> bool {
        false
    }

    fn is_inferred(&self) -> bool {
        self.meta().inferred
    }
}

string_enum! {
    /// Wire value of a name's `@type`.
    NameType {
        Present => "present",
        Maiden => "maiden",
        Former => "former",
        Alias => "alias",
        Autogenerated => "autogenerated",
    }
}

string_enum! {
    /// Wire value of an address's `@type`.
    AddressType {
        Home => "home",
        Work => "work",
        Old => "old",
    }
}

string_enum! {
    /// Wire value of a phone's `@type`.
    PhoneType {
        Mobile => "mobile",
        HomePhone => "home_phone",
        HomeFax => "home_fax",
        WorkPhone => "work_phone",
        WorkFax => "work_fax",
        Pager => "pager",
    }
}

string_enum! {
    /// Wire value of an email's `@type`.
    EmailType {
        Personal => "personal",
        Work => "work",
    }
}

string_enum! {
    /// Wire value of a relationship's `@type`.
    RelationshipType {
        Friend => "friend",
        Family => "family",
        Work => "work",
        Other => "other",
    }
}

fn preferred(server: &Option<String>, computed: impl FnOnce() -> Option<String>) -> Option<String> {
    non_empty(server).map(str::to_string).or_else(computed)
}

// ---------------------------------------------------------------------------
// Name
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Name {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub name_type: Option<NameType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Name {
    pub fn computed_display(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.prefix, &self.first, &self.middle, &self.last, &self.suffix]
            .into_iter()
            .filter_map(|part| non_empty(part))
            .collect();
        if parts.is_empty() {
            non_empty(&self.raw).map(str::to_string)
        } else {
            Some(parts.join(" "))
        }
    }
}

impl FieldKind for Name {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        preferred(&self.display, || self.computed_display())
    }

    fn is_searchable(&self) -> bool {
        let first = self.first.as_deref().map(alpha_count).unwrap_or(0);
        let last = self.last.as_deref().map(alpha_count).unwrap_or(0);
        let raw = self.raw.as_deref().map(alpha_count).unwrap_or(0);
        (first >= 2 && last >= 2) || raw >= 4
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub address_type: Option<AddressType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apartment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_box: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Address {
    /// Full country name for the ISO code in `country`, when known.
    pub fn country_full(&self) -> Option<&'static str> {
        non_empty(&self.country).and_then(geo::country_name)
    }

    /// Full state/province name, when known for the address's country.
    pub fn state_full(&self) -> Option<&'static str> {
        let state = non_empty(&self.state)?;
        geo::state_name(non_empty(&self.country).unwrap_or("US"), state)
    }

    /// An address that is specific enough to be the only search criterion.
    pub fn is_sole_searchable(&self) -> bool {
        non_empty(&self.raw).is_some()
            || (non_empty(&self.house).is_some()
                && non_empty(&self.street).is_some()
                && non_empty(&self.city).is_some())
    }

    pub fn computed_display(&self) -> Option<String> {
        let street = non_empty(&self.street);
        let city = non_empty(&self.city);
        let state_code = non_empty(&self.state);
        let country_code = non_empty(&self.country);

        let state = if city.is_some() {
            state_code
        } else {
            self.state_full().or(state_code)
        };
        let country = if state_code.is_some() {
            country_code
        } else {
            self.country_full().or(country_code)
        };

        let mut display = [street, city, state, country]
            .into_iter()
            .flatten()
            .collect::<Vec<&str>>()
            .join(", ");

        if street.is_some() {
            let prefix = [non_empty(&self.house), non_empty(&self.apartment)]
                .into_iter()
                .flatten()
                .collect::<Vec<&str>>()
                .join("-");
            if !prefix.is_empty() {
                display = format!("{prefix} {display}");
            }
        } else if let Some(po_box) = non_empty(&self.po_box) {
            display = format!("P.O. Box {po_box} {display}").trim_end().to_string();
        }

        if display.is_empty() {
            non_empty(&self.raw).map(str::to_string)
        } else {
            Some(display)
        }
    }
}

impl FieldKind for Address {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        preferred(&self.display, || self.computed_display())
    }

    fn is_searchable(&self) -> bool {
        [&self.raw, &self.city, &self.state, &self.country]
            .into_iter()
            .any(|part| non_empty(part).is_some())
    }
}

// ---------------------------------------------------------------------------
// Phone
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phone {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub phone_type: Option<PhoneType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_international: Option<String>,
}

impl Phone {
    fn is_nanp(&self, digits: &str) -> bool {
        self.country_code == Some(1) && digits.len() == 10
    }

    fn with_extension(&self, base: String) -> String {
        match non_empty(&self.extension) {
            Some(ext) => format!("{base} x{ext}"),
            None => base,
        }
    }

    pub fn computed_display(&self) -> Option<String> {
        let Some(number) = self.number else {
            return non_empty(&self.raw).map(str::to_string);
        };
        let digits = number.to_string();
        let base = if self.is_nanp(&digits) {
            format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
        } else {
            digits
        };
        Some(self.with_extension(base))
    }

    /// International rendering (`+1 978-555-0145`), preferring the server's.
    pub fn international_display(&self) -> Option<String> {
        if let Some(server) = non_empty(&self.display_international) {
            return Some(server.to_string());
        }
        let number = self.number?;
        let digits = number.to_string();
        let country_code = self.country_code.unwrap_or(1);
        let base = if self.is_nanp(&digits) {
            format!("+1 {}-{}-{}", &digits[..3], &digits[3..6], &digits[6..])
        } else {
            format!("+{country_code} {digits}")
        };
        Some(self.with_extension(base))
    }
}

impl FieldKind for Phone {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        preferred(&self.display, || self.computed_display())
    }

    fn is_searchable(&self) -> bool {
        non_empty(&self.raw).is_some() || self.number.is_some()
    }
}

// ---------------------------------------------------------------------------
// Email
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Email {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub email_type: Option<EmailType>,
    #[serde(rename = "@disposable", skip_serializing_if = "Option::is_none")]
    pub disposable: Option<bool>,
    #[serde(rename = "@email_provider", skip_serializing_if = "Option::is_none")]
    pub email_provider: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_md5: Option<String>,
}

impl Email {
    pub fn from_address(address: &str) -> Self {
        Self {
            address: Some(address.to_string()),
            ..Default::default()
        }
    }

    pub fn from_md5(md5: &str) -> Self {
        Self {
            address_md5: Some(md5.to_string()),
            ..Default::default()
        }
    }

    /// The part before the `@`.
    pub fn username(&self) -> Option<&str> {
        non_empty(&self.address)?.rsplit_once('@').map(|(user, _)| user)
    }

    /// The part after the `@`.
    pub fn domain(&self) -> Option<&str> {
        non_empty(&self.address)?.rsplit_once('@').map(|(_, domain)| domain)
    }

    pub fn is_valid_email(&self) -> bool {
        non_empty(&self.address).is_some_and(is_valid_email)
    }

    fn has_valid_md5(&self) -> bool {
        non_empty(&self.address_md5)
            .is_some_and(|md5| md5.len() == 32 && md5.chars().all(|c| c.is_ascii_hexdigit()))
    }
}

fn is_valid_email(address: &str) -> bool {
    let Some((local, domain)) = address.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels
        .iter()
        .all(|l| !l.is_empty() && l.chars().all(|c| c.is_alphanumeric() || c == '-'));
    let tld_ok = labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(char::is_alphabetic));
    labels_ok && tld_ok
}

impl FieldKind for Email {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        non_empty(&self.address).map(str::to_string)
    }

    fn is_searchable(&self) -> bool {
        self.is_valid_email() || self.has_valid_md5()
    }
}

// ---------------------------------------------------------------------------
// Job / Education
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Job {
    pub fn computed_display(&self) -> Option<String> {
        let title = non_empty(&self.title);
        let organization = non_empty(&self.organization);
        let industry = non_empty(&self.industry);
        let years = self.date_range.map(|r| r.years_range());

        let base = match (title, organization) {
            (Some(t), Some(o)) => Some(format!("{t} at {o}")),
            (t, o) => t.or(o).map(str::to_string),
        };

        let display = match (base, industry) {
            (Some(base), Some(industry)) => match years {
                Some((start, end)) => format!("{base} ({industry}, {start}-{end})"),
                None => format!("{base} ({industry})"),
            },
            (base, industry) => {
                let base = base.as_deref().or(industry).unwrap_or_default().to_string();
                match years {
                    Some((start, end)) if !base.is_empty() => format!("{base} ({start}-{end})"),
                    _ => base,
                }
            }
        };
        (!display.is_empty()).then_some(display)
    }
}

impl FieldKind for Job {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        preferred(&self.display, || self.computed_display())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Education {
    pub fn computed_display(&self) -> Option<String> {
        let base = match (non_empty(&self.degree), non_empty(&self.school)) {
            (Some(d), Some(s)) => format!("{d} from {s}"),
            (d, s) => d.or(s)?.to_string(),
        };
        Some(match self.date_range.map(|r| r.years_range()) {
            Some((start, end)) => format!("{base} ({start}-{end})"),
            None => base,
        })
    }
}

impl FieldKind for Education {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        preferred(&self.display, || self.computed_display())
    }
}

// ---------------------------------------------------------------------------
// Image
// ---------------------------------------------------------------------------

pub const THUMBNAIL_BASE_URL: &str = "https://thumb.pipl.com/image";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_token: Option<String>,
}

/// Rendering options for `Image::thumbnail_url`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailOptions {
    pub width: u32,
    pub height: u32,
    pub favicon: bool,
    pub zoom_face: bool,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            favicon: true,
            zoom_face: true,
        }
    }
}

impl Image {
    /// URL of a resized thumbnail, available only when the server issued a
    /// thumbnail token for this image.
    pub fn thumbnail_url(&self, options: &ThumbnailOptions) -> Option<String> {
        let token = non_empty(&self.thumbnail_token)?;
        Some(format!(
            "{THUMBNAIL_BASE_URL}?height={}&width={}&favicon={}&zoom_face={}&tokens={}",
            options.height,
            options.width,
            options.favicon,
            options.zoom_face,
            urlencoding::encode(token)
        ))
    }
}

impl FieldKind for Image {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        non_empty(&self.url).map(str::to_string)
    }
}

// ---------------------------------------------------------------------------
// Username / UserId / Url
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Username {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl FieldKind for Username {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        non_empty(&self.content).map(str::to_string)
    }

    fn is_searchable(&self) -> bool {
        self.content.as_deref().map(alnum_count).unwrap_or(0) >= 3
    }
}

/// A service-scoped user id, formatted `id@service` (e.g. `11231@facebook`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserId {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl FieldKind for UserId {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        non_empty(&self.content).map(str::to_string)
    }

    fn is_searchable(&self) -> bool {
        non_empty(&self.content)
            .and_then(|c| c.split_once('@'))
            .is_some_and(|(id, service)| !id.is_empty() && !service.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Url {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(rename = "@category", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "@domain", skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(rename = "@name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "@sponsored", skip_serializing_if = "is_false")]
    pub sponsored: bool,
    #[serde(rename = "@source_id", skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl FieldKind for Url {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        non_empty(&self.url).map(str::to_string)
    }

    fn is_searchable(&self) -> bool {
        non_empty(&self.url).is_some_and(|url| {
            let rest = url
                .strip_prefix("https://")
                .or_else(|| url.strip_prefix("http://"));
            rest.and_then(|r| r.split('/').next())
                .is_some_and(|host| host.contains('.') || host == "localhost")
        })
    }
}

// ---------------------------------------------------------------------------
// Language / OriginCountry / Ethnicity / Gender
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl FieldKind for Language {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        preferred(&self.display, || {
            match (non_empty(&self.language), non_empty(&self.region)) {
                (Some(lang), Some(region)) => Some(format!("{lang}_{region}")),
                (lang, region) => lang.or(region).map(str::to_string),
            }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginCountry {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl FieldKind for OriginCountry {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        let code = non_empty(&self.country)?;
        Some(geo::country_name(code).unwrap_or(code).to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ethnicity {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl FieldKind for Ethnicity {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        non_empty(&self.content).map(title_case)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gender {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl FieldKind for Gender {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        non_empty(&self.content).map(title_case)
    }
}

// ---------------------------------------------------------------------------
// DOB
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dob {
    #[serde(flatten)]
    pub meta: FieldMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

fn age_at(birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

fn years_before(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    let year = date.year().checked_sub(i32::try_from(years).ok()?)?;
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
}

impl Dob {
    pub fn from_birth_date(date: NaiveDate) -> Self {
        Self {
            date_range: Some(DateRange::exact(date)),
            ..Default::default()
        }
    }

    /// A DOB covering everyone aged `start_age..=end_age` on `today`.
    pub fn from_age_range(start_age: u32, end_age: u32, today: NaiveDate) -> Option<Self> {
        let (low, high) = if start_age <= end_age {
            (start_age, end_age)
        } else {
            (end_age, start_age)
        };
        let end = years_before(today, low)?;
        let start = years_before(today, high.checked_add(1)?)?.succ_opt()?;
        Some(Self {
            date_range: Some(DateRange::new(start, end)),
            ..Default::default()
        })
    }

    /// Age on `today`, computed from the middle of the birth range.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.date_range.map(|r| age_at(r.middle(), today))
    }

    /// Youngest and oldest possible ages on `today`.
    pub fn age_range_on(&self, today: NaiveDate) -> Option<(u32, u32)> {
        self.date_range
            .map(|r| (age_at(r.end, today), age_at(r.start, today)))
    }

    pub fn computed_display_on(&self, today: NaiveDate) -> Option<String> {
        let (young, old) = self.age_range_on(today)?;
        Some(if young == old {
            format!("{young} years old")
        } else {
            format!("{young}-{old} years old")
        })
    }
}

impl FieldKind for Dob {
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn display(&self) -> Option<String> {
        preferred(&self.display, || self.computed_display_on(Utc::now().date_naive()))
    }
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// One field of any kind, as a tagged variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Name(Name),
    Address(Address),
    Phone(Phone),
    Email(Email),
    Job(Job),
    Education(Education),
    Image(Image),
    Username(Username),
    UserId(UserId),
    Url(Url),
    Relationship(Relationship),
    Language(Language),
    OriginCountry(OriginCountry),
    Ethnicity(Ethnicity),
    Dob(Dob),
    Gender(Gender),
}

macro_rules! field_dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            Field::Name($inner) => $body,
            Field::Address($inner) => $body,
            Field::Phone($inner) => $body,
            Field::Email($inner) => $body,
            Field::Job($inner) => $body,
            Field::Education($inner) => $body,
            Field::Image($inner) => $body,
            Field::Username($inner) => $body,
            Field::UserId($inner) => $body,
            Field::Url($inner) => $body,
            Field::Relationship($inner) => $body,
            Field::Language($inner) => $body,
            Field::OriginCountry($inner) => $body,
            Field::Ethnicity($inner) => $body,
            Field::Dob($inner) => $body,
            Field::Gender($inner) => $body,
        }
    };
}

impl Field {
    /// The container key this kind is stored under on the wire.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Field::Name(_) => "names",
            Field::Address(_) => "addresses",
            Field::Phone(_) => "phones",
            Field::Email(_) => "emails",
            Field::Job(_) => "jobs",
            Field::Education(_) => "educations",
            Field::Image(_) => "images",
            Field::Username(_) => "usernames",
            Field::UserId(_) => "user_ids",
            Field::Url(_) => "urls",
            Field::Relationship(_) => "relationships",
            Field::Language(_) => "languages",
            Field::OriginCountry(_) => "origin_countries",
            Field::Ethnicity(_) => "ethnicities",
            Field::Dob(_) => "dob",
            Field::Gender(_) => "gender",
        }
    }
}

impl FieldKind for Field {
    fn meta(&self) -> &FieldMeta {
        field_dispatch!(self, f => f.meta())
    }

    fn display(&self) -> Option<String> {
        field_dispatch!(self, f => f.display())
    }

    fn is_searchable(&self) -> bool {
        field_dispatch!(self, f => f.is_searchable())
    }
}

macro_rules! into_field {
    ($($kind:ident),+ $(,)?) => {
        $(
            impl From<$kind> for Field {
                fn from(value: $kind) -> Self {
                    Field::$kind(value)
                }
            }
        )+
    };
}

into_field!(
    Name,
    Address,
    Phone,
    Email,
    Job,
    Education,
    Image,
    Username,
    UserId,
    Url,
    Relationship,
    Language,
    OriginCountry,
    Ethnicity,
    Dob,
    Gender,
);
