//! In-process imitation of the person-search endpoint.
//!
//! # Design
//! `POST /search/` reads the key and options from the query string and the
//! `person` JSON or `search_pointer` from a form body, then serves one of the
//! canned records in `fixtures`. Options are applied to the JSON value after
//! the fixture is chosen, so every option works against every record. The
//! only state is a call counter reported back through the quota headers.

pub mod fixtures;

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

pub const QUOTA_ALLOTTED: u32 = 1000;
pub const QPS_ALLOTTED: u32 = 10;

/// Options read from the query string. Unrecognized parameters are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub key: Option<String>,
    pub minimum_probability: Option<f64>,
    pub minimum_match: Option<f64>,
    pub hide_sponsored: Option<String>,
    pub show_sources: Option<String>,
    pub show_unknown_fields: Option<String>,
    pub developer_class: Option<String>,
}

/// Search criteria read from the form body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchBody {
    pub person: Option<String>,
    pub search_pointer: Option<String>,
}

pub type Usage = Arc<AtomicU32>;

pub fn app() -> Router {
    let usage: Usage = Arc::new(AtomicU32::new(0));
    Router::new()
        .route("/search/", post(search))
        .route("/search", post(search))
        .with_state(usage)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn flag(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("true" | "1" | "True"))
}

fn error(status: StatusCode, message: &str) -> Response {
    tracing::info!(status = status.as_u16(), reason = message, "rejecting search");
    let body = json!({
        "@http_status_code": status.as_u16(),
        "error": message,
        "warnings": [],
    });
    (status, Json(body)).into_response()
}

async fn search(
    State(usage): State<Usage>,
    Query(params): Query<SearchParams>,
    Form(body): Form<SearchBody>,
) -> Response {
    match params.key.as_deref() {
        None | Some("") | Some("invalid") => {
            return error(StatusCode::FORBIDDEN, "API key is missing or invalid");
        }
        Some(_) => {}
    }
    if params
        .minimum_probability
        .is_some_and(|p| !(0.0..=1.0).contains(&p))
        || params.minimum_match.is_some_and(|m| !(0.0..=1.0).contains(&m))
    {
        return error(StatusCode::BAD_REQUEST, "minimum_probability and minimum_match must be between 0 and 1");
    }

    let mut response = match (body.search_pointer.as_deref(), body.person.as_deref()) {
        (Some(pointer), _) if !pointer.is_empty() => match fixtures::person_for_pointer(pointer) {
            Some(person) => matched(json!({}), person, Vec::new()),
            None => return error(StatusCode::BAD_REQUEST, "Invalid search pointer"),
        },
        (_, Some(raw)) => {
            let Ok(query) = serde_json::from_str::<Value>(raw) else {
                return error(StatusCode::BAD_REQUEST, "The person parameter is not valid JSON");
            };
            match lookup(query) {
                Ok(response) => response,
                Err(message) => return error(StatusCode::BAD_REQUEST, message),
            }
        }
        _ => return error(StatusCode::BAD_REQUEST, "Either person or search_pointer is required"),
    };

    apply_options(&mut response, &params);
    let calls = usage.fetch_add(1, Ordering::Relaxed) + 1;
    tracing::info!(
        persons_count = response["@persons_count"].as_u64(),
        calls,
        "served search"
    );

    let headers = [
        ("x-apikey-qps-allotted", QPS_ALLOTTED.to_string()),
        ("x-apikey-qps-current", "1".to_string()),
        ("x-apikey-quota-allotted", QUOTA_ALLOTTED.to_string()),
        ("x-apikey-quota-current", calls.to_string()),
        ("x-quota-reset", "Sunday, November 1, 2026 12:00:00 AM UTC".to_string()),
    ];
    (StatusCode::OK, headers, Json(response)).into_response()
}

fn matched(query: Value, person: Value, sources: Vec<Value>) -> Value {
    json!({
        "query": query,
        "@persons_count": 1,
        "person": person,
        "sources": sources,
    })
}

fn strings<'a>(query: &'a Value, list: &str, key: &str) -> Vec<&'a str> {
    query[list]
        .as_array()
        .map(|items| items.iter().filter_map(|item| item[key].as_str()).collect())
        .unwrap_or_default()
}

fn has_items(query: &Value, list: &str) -> bool {
    query[list].as_array().is_some_and(|items| !items.is_empty())
}

/// Pick the fixture for a person query.
fn lookup(query: Value) -> Result<Value, &'static str> {
    let emails: Vec<String> = strings(&query, "emails", "address")
        .iter()
        .map(|e| e.to_lowercase())
        .collect();
    let md5s = strings(&query, "emails", "address_md5");

    if emails.iter().any(|e| e == fixtures::CLARK_EMAIL) {
        return Ok(matched(query, fixtures::clark_kent(), fixtures::clark_kent_sources()));
    }
    if emails.iter().any(|e| e == fixtures::BRIAN_EMAIL) || md5s.contains(&fixtures::BRIAN_EMAIL_MD5) {
        return Ok(matched(query, fixtures::brian_perks(), fixtures::brian_perks_sources()));
    }

    let names: Vec<String> = query["names"]
        .as_array()
        .map(|names| {
            names
                .iter()
                .filter_map(|name| match (name["first"].as_str(), name["last"].as_str(), name["raw"].as_str()) {
                    (Some(first), Some(last), _) => Some(format!("{first} {last}")),
                    (_, _, Some(raw)) => Some(raw.split_whitespace().collect::<Vec<_>>().join(" ")),
                    _ => None,
                })
                .map(|n| n.to_lowercase())
                .collect()
        })
        .unwrap_or_default();
    if names.iter().any(|n| n == "brian perks") {
        let candidates = fixtures::brian_perks_candidates();
        return Ok(json!({
            "query": query,
            "@persons_count": candidates.len(),
            "possible_persons": candidates,
        }));
    }

    let searchable = !emails.is_empty()
        || !md5s.is_empty()
        || !names.is_empty()
        || ["phones", "usernames", "user_ids", "urls", "addresses"]
            .iter()
            .any(|list| has_items(&query, list));
    if !searchable {
        return Err("The query does not contain any valid name/username/user_id/phone/email/address to search by");
    }
    Ok(json!({"query": query, "@persons_count": 0}))
}

fn is_flagged(value: &Value, attribute: &str) -> bool {
    value.get(attribute).and_then(Value::as_bool).unwrap_or(false)
}

/// Drop every field carrying `attribute: true`, whether it sits in a list or
/// is single-valued.
fn strip_flagged(person: &mut Value, attribute: &str) {
    let Some(fields) = person.as_object_mut() else {
        return;
    };
    fields.retain(|_, value| !is_flagged(value, attribute));
    for value in fields.values_mut() {
        if let Value::Array(items) = value {
            items.retain(|item| !is_flagged(item, attribute));
        }
    }
}

fn persons_mut(response: &mut Value) -> Vec<&mut Value> {
    let Some(object) = response.as_object_mut() else {
        return Vec::new();
    };
    let mut persons = Vec::new();
    for (key, value) in object.iter_mut() {
        match (key.as_str(), value) {
            ("person", person) if person.is_object() => persons.push(person),
            ("possible_persons", Value::Array(items)) => persons.extend(items.iter_mut()),
            _ => {}
        }
    }
    persons
}

/// Contact and social developer classes see masked email addresses and no
/// ethnicities.
fn restrict_to_class(person: &mut Value) {
    let Some(fields) = person.as_object_mut() else {
        return;
    };
    fields.remove("ethnicities");
    if let Some(Value::Array(emails)) = fields.get_mut("emails") {
        for email in emails.iter_mut().filter_map(Value::as_object_mut) {
            email.remove("address_md5");
            email.insert("address".to_string(), json!(fixtures::MASKED_EMAIL));
        }
    }
}

fn apply_options(response: &mut Value, params: &SearchParams) {
    if params.minimum_probability.is_some_and(|p| p >= 1.0) {
        for person in persons_mut(response) {
            strip_flagged(person, "@inferred");
        }
    }

    if let Some(minimum) = params.minimum_match {
        if let Some(Value::Array(candidates)) = response.get_mut("possible_persons") {
            candidates.retain(|p| p["@match"].as_f64().unwrap_or(0.0) >= minimum);
            let count = candidates.len();
            response["@persons_count"] = json!(count);
        }
    }

    if flag(&params.hide_sponsored) {
        for person in persons_mut(response) {
            strip_flagged(person, "@sponsored");
        }
        if let Some(Value::Array(sources)) = response.get_mut("sources") {
            sources.retain(|s| !is_flagged(s, "@sponsored"));
        }
    }

    if matches!(params.developer_class.as_deref(), Some("contact" | "social")) {
        for person in persons_mut(response) {
            restrict_to_class(person);
        }
    }

    let person_id = response["person"]["@id"].as_str().map(str::to_string);
    let sources = match response.as_object_mut().and_then(|o| o.remove("sources")) {
        Some(Value::Array(sources)) => sources,
        _ => Vec::new(),
    };
    let shown: Vec<Value> = match params.show_sources.as_deref() {
        Some("all") => sources,
        Some("matching") => sources
            .into_iter()
            .filter(|s| s["@person_id"].as_str() == person_id.as_deref())
            .collect(),
        _ => Vec::new(),
    };
    let available = shown.len();
    if !shown.is_empty() {
        response["sources"] = Value::Array(shown);
    }

    if flag(&params.show_unknown_fields) {
        if let Some(person) = response.get_mut("person").and_then(Value::as_object_mut) {
            person.insert("vehicles".to_string(), fixtures::unknown_field());
        }
    }

    let mut header = Map::new();
    header.insert("@http_status_code".to_string(), json!(200));
    header.insert("@visible_sources".to_string(), json!(available));
    header.insert("@available_sources".to_string(), json!(available));
    header.insert("@search_id".to_string(), json!(Uuid::new_v4().simple().to_string()));
    if let Some(object) = response.as_object_mut() {
        object.extend(header);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_first_name_is_not_searchable() {
        let query = json!({"names": [{"first": "brian"}]});
        assert!(lookup(query).is_err());
    }

    #[test]
    fn md5_resolves_brian_perks() {
        let query = json!({"emails": [{"address_md5": fixtures::BRIAN_EMAIL_MD5}]});
        let response = lookup(query).unwrap();
        assert_eq!(response["person"]["@id"], fixtures::BRIAN_ID);
    }

    #[test]
    fn raw_name_matches_candidates() {
        let query = json!({"names": [{"raw": "Brian   Perks"}]});
        let response = lookup(query).unwrap();
        assert_eq!(response["possible_persons"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn unknown_searchable_query_returns_no_person() {
        let query = json!({"emails": [{"address": "nobody@example.com"}]});
        let response = lookup(query).unwrap();
        assert_eq!(response["@persons_count"], 0);
        assert!(response.get("person").is_none());
    }

    #[test]
    fn strip_flagged_handles_lists_and_single_fields() {
        let mut person = fixtures::brian_perks();
        strip_flagged(&mut person, "@inferred");
        assert!(person["addresses"].as_array().unwrap().is_empty());
        assert!(person.get("gender").is_none());
        assert!(person.get("dob").is_none());
        assert_eq!(person["names"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn sources_are_hidden_by_default() {
        let mut response = lookup(json!({"emails": [{"address": fixtures::BRIAN_EMAIL}]})).unwrap();
        apply_options(&mut response, &SearchParams::default());
        assert!(response.get("sources").is_none());
        assert_eq!(response["@http_status_code"], 200);
        assert_eq!(response["@search_id"].as_str().unwrap().len(), 32);
    }

    #[test]
    fn contact_class_masks_emails() {
        let mut response = lookup(json!({"emails": [{"address": fixtures::BRIAN_EMAIL}]})).unwrap();
        let params = SearchParams {
            developer_class: Some("contact".into()),
            ..Default::default()
        };
        apply_options(&mut response, &params);
        for email in response["person"]["emails"].as_array().unwrap() {
            assert_eq!(email["address"], fixtures::MASKED_EMAIL);
            assert!(email.get("address_md5").is_none());
        }
        assert!(response["person"].get("ethnicities").is_none());
    }

    #[test]
    fn business_premium_class_keeps_emails() {
        let mut response = lookup(json!({"emails": [{"address": fixtures::BRIAN_EMAIL}]})).unwrap();
        let params = SearchParams {
            developer_class: Some("business_premium".into()),
            ..Default::default()
        };
        apply_options(&mut response, &params);
        assert_eq!(response["person"]["emails"][0]["address"], fixtures::BRIAN_EMAIL);
    }

    #[test]
    fn flag_accepts_true_and_one() {
        assert!(flag(&Some("true".into())));
        assert!(flag(&Some("1".into())));
        assert!(!flag(&Some("false".into())));
        assert!(!flag(&None));
    }
}
